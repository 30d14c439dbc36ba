use bevy::color::Color;

/// Colour applied to a highlighted part (pure red).
pub const HIGHLIGHT_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);

/// Host object the selection is posted to in web builds.
pub const BRIDGE_CHANNEL_NAME: &str = "FlutterChannel";

/// Cursor travel in pixels between press and release still treated as a click.
pub const CLICK_DRAG_THRESHOLD: f32 = 5.0;
