//! Orbit camera for inspecting the model.
//!
//! Left drag orbits around the focus point, right drag pans, the wheel and
//! two-finger pinch zoom. The camera eases toward its target every frame.

/// Orbit camera resource and controller system.
pub mod orbit_camera;
