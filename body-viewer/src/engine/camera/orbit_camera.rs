use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;
use constants::render_settings::{
    CAMERA_DAMPING, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE, CAMERA_START_DISTANCE,
};

const ROTATE_SENSITIVITY: f32 = 0.005;
const PAN_SENSITIVITY: f32 = 0.0015;
const ZOOM_PER_LINE: f32 = 0.1;
const PITCH_LIMIT: f32 = 1.55;

/// Target pose of the orbit camera. The camera transform eases toward it.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            distance: CAMERA_START_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
        }
    }
}

impl OrbitCamera {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Orbit by a screen-space drag in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ROTATE_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * ROTATE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move the focus point in the view plane, scaled by distance.
    pub fn pan(&mut self, delta: Vec2) {
        let rotation = self.rotation();
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let scale = self.distance * PAN_SENSITIVITY;
        self.focus += (-right * delta.x + up * delta.y) * scale;
    }

    /// Zoom by wheel lines. Positive values move closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * ZOOM_PER_LINE).max(0.1);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn target_transform(&self) -> Transform {
        let rotation = self.rotation();
        Transform {
            translation: self.focus + rotation * Vec3::Z * self.distance,
            rotation,
            ..default()
        }
    }
}

/// Fraction of the remaining distance to close this frame.
pub fn damping_factor(delta_secs: f32) -> f32 {
    1.0 - (1.0 - CAMERA_DAMPING).powf(delta_secs * 60.0)
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    touches: Res<Touches>,
    buttons: Query<&Interaction, With<Button>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let over_ui = buttons.iter().any(|interaction| *interaction != Interaction::None);

    if mouse_delta != Vec2::ZERO && !over_ui {
        if mouse_button.pressed(MouseButton::Left) {
            orbit.rotate(mouse_delta);
        } else if mouse_button.pressed(MouseButton::Right) {
            orbit.pan(mouse_delta);
        }
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    // One finger orbits, two fingers pinch to zoom.
    let active: Vec<&bevy::input::touch::Touch> = touches.iter().collect();
    match active.as_slice() {
        [touch] => {
            if touch.delta() != Vec2::ZERO {
                orbit.rotate(touch.delta());
            }
        }
        [first, second] => {
            let previous = first.previous_position().distance(second.previous_position());
            let current = first.position().distance(second.position());
            if previous > f32::EPSILON {
                scroll_accum += (current - previous) * 0.05;
            }
        }
        _ => {}
    }

    if scroll_accum.abs() > f32::EPSILON {
        orbit.zoom(scroll_accum);
    }

    let target = orbit.target_transform();
    let smoothing = damping_factor(time.delta_secs()).clamp(0.0, 1.0);
    camera_transform.translation = camera_transform
        .translation
        .lerp(target.translation, smoothing);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, smoothing);
}
