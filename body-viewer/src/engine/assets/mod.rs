//! Model catalog and spatial helpers for the loaded humanoid asset.

/// World-space bounds of the loaded model, used for recentering.
pub mod bounds;

/// Subject and variant axes and the model file each combination selects.
pub mod model_catalog;
