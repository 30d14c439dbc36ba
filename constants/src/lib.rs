//! Compile-time values shared by the body viewer crates.

pub mod loading;
pub mod model_catalog;
pub mod render_settings;
pub mod selection;
