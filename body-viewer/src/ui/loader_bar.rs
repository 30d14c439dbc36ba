use bevy::prelude::*;
use constants::render_settings::{LOADER_BAR_COLOUR, LOADER_BAR_HEIGHT, LOADER_TRACK_COLOUR};

use crate::engine::loading::progress::LoadingProgress;

#[derive(Component)]
pub struct LoaderContainer;

#[derive(Component)]
pub struct LoaderBar;

pub fn spawn_loader_bar(mut commands: Commands) {
    commands
        .spawn((
            LoaderContainer,
            Name::new("LoaderContainer"),
            BackgroundColor(LOADER_TRACK_COLOUR),
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(LOADER_BAR_HEIGHT),
                position_type: PositionType::Absolute,
                top: Val::Px(0.0),
                left: Val::Px(0.0),
                ..default()
            },
            GlobalZIndex(10),
        ))
        .with_children(|parent| {
            parent.spawn((
                LoaderBar,
                Name::new("LoaderBar"),
                BackgroundColor(LOADER_BAR_COLOUR),
                Node {
                    width: Val::Percent(0.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
            ));
        });
}

pub fn update_loader_bar(
    progress: Res<LoadingProgress>,
    mut nodes: ParamSet<(
        Query<&mut Node, With<LoaderContainer>>,
        Query<&mut Node, With<LoaderBar>>,
    )>,
) {
    if !progress.is_changed() {
        return;
    }

    if let Ok(mut container) = nodes.p0().single_mut() {
        container.display = if progress.is_visible() {
            Display::Flex
        } else {
            Display::None
        };
    }
    if let Ok(mut bar) = nodes.p1().single_mut() {
        bar.width = Val::Percent(progress.percent() as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loader_app() -> App {
        let mut app = App::new();
        app.insert_resource(LoadingProgress::with_hide_delay(1.0))
            .add_systems(Startup, spawn_loader_bar)
            .add_systems(Update, update_loader_bar);
        app.update();
        app
    }

    fn bar_node(app: &mut App) -> Node {
        let world = app.world_mut();
        world
            .query_filtered::<&Node, With<LoaderBar>>()
            .single(world)
            .unwrap()
            .clone()
    }

    fn container_node(app: &mut App) -> Node {
        let world = app.world_mut();
        world
            .query_filtered::<&Node, With<LoaderContainer>>()
            .single(world)
            .unwrap()
            .clone()
    }

    #[test]
    fn bar_width_follows_percentage() {
        let mut app = loader_app();
        app.world_mut().resource_mut::<LoadingProgress>().report(0.5);
        app.update();

        assert_eq!(bar_node(&mut app).width, Val::Percent(50.0));
        assert_eq!(container_node(&mut app).display, Display::Flex);
    }

    #[test]
    fn container_hides_once_timer_elapses() {
        let mut app = loader_app();
        {
            let mut progress = app.world_mut().resource_mut::<LoadingProgress>();
            progress.report(1.0);
            progress.tick(Duration::from_secs(2));
        }
        app.update();

        assert_eq!(bar_node(&mut app).width, Val::Percent(100.0));
        assert_eq!(container_node(&mut app).display, Display::None);
    }
}
