/// Seconds the loader bar stays on screen after reaching 100%.
pub const PROGRESS_HIDE_DELAY_SECS: f32 = 1.0;

/// Progress reported once the model file itself has arrived.
pub const PROGRESS_FILE_LOADED: f32 = 0.5;

/// Progress reported once every dependency (buffers, textures) has arrived.
pub const PROGRESS_DEPENDENCIES_LOADED: f32 = 0.75;
