use bevy::color::Color;

pub const CLEAR_COLOUR: Color = Color::WHITE;

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START_DISTANCE: f32 = 25.0;
pub const CAMERA_MIN_DISTANCE: f32 = 2.0;
pub const CAMERA_MAX_DISTANCE: f32 = 200.0;

/// Fraction of the remaining distance the orbit camera closes per 1/60 s.
pub const CAMERA_DAMPING: f32 = 0.2;

pub const AMBIENT_BRIGHTNESS: f32 = 400.0;
pub const DIRECTIONAL_ILLUMINANCE: f32 = 4000.0;

pub const LOADER_BAR_HEIGHT: f32 = 6.0;
pub const LOADER_BAR_COLOUR: Color = Color::srgb(0.2, 0.55, 0.95);
pub const LOADER_TRACK_COLOUR: Color = Color::srgb(0.88, 0.88, 0.88);

/// Idle redraw rate; input events still wake the loop immediately.
pub const TARGET_FRAMES_PER_SECOND: f64 = 30.0;
