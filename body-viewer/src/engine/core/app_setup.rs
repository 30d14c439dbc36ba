use bevy::asset::AssetMetaCheck;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use constants::render_settings::{
    AMBIENT_BRIGHTNESS, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CLEAR_COLOUR,
    DIRECTIONAL_ILLUMINANCE,
};

// Crate engine modules
use crate::engine::camera::orbit_camera::{OrbitCamera, camera_controller};
use crate::engine::core::app_state::{AppState, transition_to_running};
use crate::engine::core::config::{ConfigWarnings, ViewerConfig, report_config};
use crate::engine::core::sets::{ViewerSet, configure_viewer_sets};
use crate::engine::core::window_config::{create_frame_pacing, create_window_config};
use crate::engine::loading::ModelLoadingPlugin;
// Crate tools modules
use crate::tools::model_swap::ModelSwapPlugin;
use crate::tools::part_selection::PartSelectionPlugin;
// Host communication
use crate::rpc::bridge::HostBridgePlugin;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::ui::ViewerUiPlugin;

pub fn create_app() -> App {
    let (config, warnings) = ViewerConfig::load();
    let mut app = App::new();

    app.add_plugins(create_default_plugins(&config))
        .init_state::<AppState>()
        .insert_resource(create_frame_pacing())
        .insert_resource(ClearColor(CLEAR_COLOUR))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        })
        .insert_resource(OrbitCamera::default())
        .insert_resource(config)
        .insert_resource(ConfigWarnings(warnings));

    configure_viewer_sets(&mut app);

    // Plugins below read ViewerConfig while building.
    app.add_plugins(WebRpcPlugin)
        .add_plugins(HostBridgePlugin)
        .add_plugins(ModelLoadingPlugin)
        .add_plugins(ModelSwapPlugin)
        .add_plugins(PartSelectionPlugin)
        .add_plugins(ViewerUiPlugin);

    app.add_systems(Startup, (report_config, setup))
        .add_systems(
            Update,
            transition_to_running
                .run_if(in_state(AppState::Loading))
                .in_set(ViewerSet::Presentation),
        )
        .add_systems(Update, camera_controller.in_set(ViewerSet::Input));

    app
}

fn spawn_lighting(commands: &mut Commands) {
    // Straight down from +Y.
    commands.spawn((
        DirectionalLight {
            illuminance: DIRECTIONAL_ILLUMINANCE,
            ..default()
        },
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
}

fn spawn_camera(commands: &mut Commands, orbit: &OrbitCamera) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        orbit.target_transform(),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands, orbit: Res<OrbitCamera>) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands, &orbit);
}

fn create_default_plugins(config: &ViewerConfig) -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        file_path: config.asset_base_url.clone(),
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        level: config.log_level(),
        filter: config.log_filter(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
