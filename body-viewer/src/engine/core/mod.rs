//! Core application setup, configuration and state management.
//!
//! Handles application lifecycle, window configuration, viewer settings,
//! frame ordering and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with scene, loading, selection, RPC and UI plugins.
pub mod app_setup;

/// Application state machine and loading transitions.
pub mod app_state;

/// Viewer configuration resource with page query overrides for web builds.
pub mod config;

/// Ordered system sets shared by every plugin of the viewer.
pub mod sets;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
