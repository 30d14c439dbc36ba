use bevy::prelude::*;

use crate::engine::core::config::ViewerConfig;
use crate::rpc::bridge::{BridgeNotifier, BridgeStatus};

const CONNECTED_COLOUR: Color = Color::srgb(0.1, 0.6, 0.2);
const NOT_CONNECTED_COLOUR: Color = Color::srgb(0.75, 0.12, 0.12);
const UNKNOWN_COLOUR: Color = Color::srgb(0.35, 0.35, 0.38);

#[derive(Component)]
pub struct BridgeIndicator;

#[derive(Component)]
pub struct BridgeIndicatorLabel;

fn indicator_colour(status: BridgeStatus) -> Color {
    match status {
        BridgeStatus::Unknown => UNKNOWN_COLOUR,
        BridgeStatus::Connected => CONNECTED_COLOUR,
        BridgeStatus::NotConnected => NOT_CONNECTED_COLOUR,
    }
}

/// Development mode only.
pub fn spawn_diagnostics_panel(mut commands: Commands, config: Res<ViewerConfig>) {
    if !config.mode.is_dev() {
        return;
    }

    commands
        .spawn((
            BridgeIndicator,
            Name::new("BridgeIndicator"),
            BackgroundColor(indicator_colour(BridgeStatus::Unknown)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                bottom: Val::Px(12.0),
                padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
                ..default()
            },
        ))
        .with_children(|panel| {
            panel.spawn((
                BridgeIndicatorLabel,
                Text::new(BridgeStatus::Unknown.label()),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn update_bridge_indicator(
    notifier: Option<Res<BridgeNotifier>>,
    mut panels: Query<&mut BackgroundColor, With<BridgeIndicator>>,
    mut labels: Query<&mut Text, With<BridgeIndicatorLabel>>,
) {
    let Some(notifier) = notifier else {
        return;
    };
    if !notifier.is_changed() {
        return;
    }

    let status = notifier.status();
    for mut background in &mut panels {
        *background = BackgroundColor(indicator_colour(status));
    }
    for mut text in &mut labels {
        *text = Text::new(status.label());
    }
}
