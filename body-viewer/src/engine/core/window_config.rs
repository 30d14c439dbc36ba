use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};
use constants::render_settings::TARGET_FRAMES_PER_SECOND;
use std::time::Duration;

pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Body Viewer".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

/// Redraw at most every 1/30 s while idle and slow down further in the background.
pub fn create_frame_pacing() -> WinitSettings {
    let frame = Duration::from_secs_f64(1.0 / TARGET_FRAMES_PER_SECOND);
    WinitSettings {
        focused_mode: UpdateMode::reactive(frame),
        unfocused_mode: UpdateMode::reactive_low_power(frame * 4),
    }
}
