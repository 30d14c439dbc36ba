use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::selection::CLICK_DRAG_THRESHOLD;

use super::highlight::PartPicked;
use super::state::BodyPart;

/// A press and release closer than `threshold` pixels is a click, not a drag.
pub fn is_click(press: Vec2, release: Vec2, threshold: f32) -> bool {
    press.distance(release) < threshold
}

/// Cast a ray from the camera through `cursor` and return the nearest part mesh.
fn pick_part(
    cursor: Vec2,
    camera: &Camera,
    camera_transform: &GlobalTransform,
    ray_cast: &mut MeshRayCast,
    parts: &Query<(), With<BodyPart>>,
) -> Option<Entity> {
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    let filter = |entity: Entity| parts.contains(entity);
    let settings = MeshRayCastSettings::default().with_filter(&filter);
    ray_cast
        .cast_ray(ray, &settings)
        .first()
        .map(|(entity, _)| *entity)
}

/// Turn mouse clicks and taps into `PartPicked` events.
///
/// Drags are left to the camera and clicks over UI buttons are ignored.
pub fn pick_part_on_click(
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    buttons: Query<&Interaction, With<Button>>,
    parts: Query<(), With<BodyPart>>,
    mut ray_cast: MeshRayCast,
    mut press_position: Local<Option<Vec2>>,
    mut picked: EventWriter<PartPicked>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let mut releases: Vec<(Vec2, Vec2)> = touches
        .iter_just_released()
        .map(|touch| (touch.start_position(), touch.position()))
        .collect();

    if mouse.just_pressed(MouseButton::Left) {
        *press_position = window.cursor_position();
    }
    if mouse.just_released(MouseButton::Left) {
        if let (Some(press), Some(release)) = (press_position.take(), window.cursor_position()) {
            releases.push((press, release));
        }
    }

    if releases.is_empty() {
        return;
    }
    if buttons.iter().any(|interaction| *interaction != Interaction::None) {
        return;
    }

    for (press, release) in releases {
        if !is_click(press, release, CLICK_DRAG_THRESHOLD) {
            continue;
        }
        if let Some(entity) = pick_part(release, camera, camera_transform, &mut ray_cast, &parts) {
            picked.write(PartPicked { entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_moves_are_clicks() {
        assert!(is_click(Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0), 5.0));
        assert!(is_click(Vec2::new(100.0, 100.0), Vec2::new(103.0, 103.0), 5.0));
    }

    #[test]
    fn long_moves_are_drags() {
        assert!(!is_click(Vec2::new(100.0, 100.0), Vec2::new(105.0, 100.0), 5.0));
        assert!(!is_click(Vec2::ZERO, Vec2::new(40.0, -12.0), 5.0));
    }
}
