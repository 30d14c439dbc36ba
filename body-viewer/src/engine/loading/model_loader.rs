use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use constants::loading::{PROGRESS_DEPENDENCIES_LOADED, PROGRESS_FILE_LOADED};
use constants::model_catalog::MODEL_ROOT_NAME;

use crate::engine::core::config::ViewerConfig;
use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;

/// Request to replace the displayed model with `file`.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ModelLoadRequest {
    pub file: String,
}

/// The tagged model root was removed from the scene.
#[derive(Event, Debug, Clone, Copy)]
pub struct ModelUnloaded;

/// A model finished processing and is now visible.
#[derive(Event, Debug, Clone)]
pub struct ModelReady {
    pub generation: u64,
    pub root: Entity,
    pub file: String,
    pub part_count: usize,
}

/// A model could not be loaded. Nothing is retried.
#[derive(Event, Debug, Clone)]
pub struct ModelLoadFailed {
    pub generation: u64,
    pub error: ModelLoadError,
}

/// Error types for model loading.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelLoadError {
    Asset { file: String, reason: String },
    MissingScene { file: String },
}

impl ModelLoadError {
    pub fn file(&self) -> &str {
        match self {
            ModelLoadError::Asset { file, .. } | ModelLoadError::MissingScene { file } => file,
        }
    }
}

impl std::fmt::Display for ModelLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelLoadError::Asset { file, reason } => {
                write!(f, "Failed to load model {}: {}", file, reason)
            }
            ModelLoadError::MissingScene { file } => {
                write!(f, "Model {} contains no scene", file)
            }
        }
    }
}

impl std::error::Error for ModelLoadError {}

/// Marks the root entity of the loaded model. Only one exists at a time.
#[derive(Component, Debug, Clone)]
pub struct ModelRoot {
    pub generation: u64,
    pub file: String,
}

/// Inserted once the root's scene instance has been spawned.
#[derive(Component)]
pub struct SceneSpawned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Waiting on the asset server for the file and its dependencies.
    Fetching,
    /// Scene root spawned, waiting for processing.
    Spawned,
}

/// The single load currently being tracked.
#[derive(Debug)]
pub struct ActiveLoad {
    pub generation: u64,
    pub file: String,
    pub gltf: Handle<Gltf>,
    pub phase: LoadPhase,
}

/// Generation-tagged tracker for the in-flight model load.
#[derive(Resource, Default, Debug)]
pub struct ModelLoader {
    last_generation: u64,
    active: Option<ActiveLoad>,
    settled: u64,
}

impl ModelLoader {
    /// Start tracking a new load, superseding any load still in flight.
    pub fn begin(&mut self, file: impl Into<String>, gltf: Handle<Gltf>) -> u64 {
        self.last_generation += 1;
        if let Some(previous) = self.active.take() {
            info!(
                "Superseding load of {} (generation {})",
                previous.file, previous.generation
            );
        }
        self.active = Some(ActiveLoad {
            generation: self.last_generation,
            file: file.into(),
            gltf,
            phase: LoadPhase::Fetching,
        });
        self.last_generation
    }

    /// Whether `generation` is the most recently requested load.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.last_generation
    }

    pub fn active(&self) -> Option<&ActiveLoad> {
        self.active.as_ref()
    }

    fn mark_spawned(&mut self, generation: u64) {
        if let Some(active) = self.active.as_mut().filter(|a| a.generation == generation) {
            active.phase = LoadPhase::Spawned;
        }
    }

    /// Stop tracking `generation` once it succeeded or failed.
    pub fn finish(&mut self, generation: u64) -> Option<ActiveLoad> {
        if self.active.as_ref().map(|a| a.generation) != Some(generation) {
            return None;
        }
        self.settled += 1;
        self.active.take()
    }

    /// True once at least one load has succeeded or failed.
    pub fn has_settled(&self) -> bool {
        self.settled > 0
    }
}

/// Outcome of polling the asset server for the active load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Pending(f32),
    Ready,
    Failed(String),
}

/// Map asset server states to a progress fraction or a terminal status.
pub fn load_status(load: &LoadState, dependencies: &RecursiveDependencyLoadState) -> LoadStatus {
    match (load, dependencies) {
        (LoadState::Failed(error), _) => LoadStatus::Failed(error.to_string()),
        (_, RecursiveDependencyLoadState::Failed(error)) => LoadStatus::Failed(error.to_string()),
        (LoadState::Loaded, RecursiveDependencyLoadState::Loaded) => LoadStatus::Ready,
        (LoadState::Loaded, _) => LoadStatus::Pending(PROGRESS_FILE_LOADED),
        _ => LoadStatus::Pending(0.0),
    }
}

/// Remove every tagged model root. No-op when none exists.
pub fn unload_model(commands: &mut Commands, roots: &Query<Entity, With<ModelRoot>>) -> usize {
    let mut removed = 0;
    for root in roots {
        commands.entity(root).despawn();
        removed += 1;
    }
    removed
}

/// Unload the current model and start loading the most recent request.
///
/// Several requests within one frame collapse to the last one.
pub fn handle_load_requests(
    mut requests: EventReader<ModelLoadRequest>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<ViewerConfig>,
    roots: Query<Entity, With<ModelRoot>>,
    mut loader: ResMut<ModelLoader>,
    mut progress: ResMut<LoadingProgress>,
    mut unloaded: EventWriter<ModelUnloaded>,
) {
    let Some(request) = requests.read().last().cloned() else {
        return;
    };

    if unload_model(&mut commands, &roots) > 0 {
        unloaded.write(ModelUnloaded);
    }

    let gltf = asset_server.load::<Gltf>(request.file.clone());
    let generation = loader.begin(request.file.clone(), gltf);
    progress.begin();

    info!(
        "Loading model {} (generation {})",
        config.model_url(&request.file),
        generation
    );
}

/// Poll the active load, report progress and spawn the scene once everything arrived.
pub fn track_model_loading(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut loader: ResMut<ModelLoader>,
    mut progress: ResMut<LoadingProgress>,
    mut failures: EventWriter<ModelLoadFailed>,
) {
    let Some(active) = loader.active() else {
        return;
    };
    if active.phase != LoadPhase::Fetching {
        return;
    }
    let generation = active.generation;
    let file = active.file.clone();
    let gltf_id = active.gltf.id();

    let Some((load, _, dependencies)) = asset_server.get_load_states(gltf_id) else {
        return;
    };

    match load_status(&load, &dependencies) {
        LoadStatus::Pending(fraction) => {
            if fraction_changed(&progress, fraction) {
                progress.report(fraction);
            }
        }
        LoadStatus::Failed(reason) => {
            loader.finish(generation);
            failures.write(ModelLoadFailed {
                generation,
                error: ModelLoadError::Asset { file, reason },
            });
        }
        LoadStatus::Ready => {
            let scene = gltfs.get(gltf_id).and_then(|gltf| {
                gltf.default_scene
                    .clone()
                    .or_else(|| gltf.scenes.first().cloned())
            });

            let Some(scene) = scene else {
                loader.finish(generation);
                failures.write(ModelLoadFailed {
                    generation,
                    error: ModelLoadError::MissingScene { file },
                });
                return;
            };

            // Hidden until processing has recentered it.
            commands
                .spawn((
                    Name::new(MODEL_ROOT_NAME),
                    ModelRoot {
                        generation,
                        file: file.clone(),
                    },
                    SceneRoot(scene),
                    Transform::default(),
                    Visibility::Hidden,
                ))
                .observe(mark_scene_spawned);

            loader.mark_spawned(generation);
            progress.report(PROGRESS_DEPENDENCIES_LOADED);
            debug!("Spawning scene for {} (generation {})", file, generation);
        }
    }
}

fn fraction_changed(progress: &LoadingProgress, fraction: f32) -> bool {
    super::progress::fraction_to_percent(fraction) != progress.percent()
}

fn mark_scene_spawned(trigger: Trigger<SceneInstanceReady>, mut commands: Commands) {
    commands.entity(trigger.target()).insert(SceneSpawned);
}

/// Log failed loads and surface them to the host as a structured notification.
pub fn report_load_failures(
    mut failures: EventReader<ModelLoadFailed>,
    config: Res<ViewerConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for failure in failures.read() {
        error!("{} (generation {})", failure.error, failure.generation);
        rpc_interface.send_notification(
            "model_load_failed",
            serde_json::json!({
                "file": failure.error.file(),
                "url": config.model_url(failure.error.file()),
                "error": failure.error.to_string(),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_load_supersedes_older() {
        let mut loader = ModelLoader::default();
        let first = loader.begin("man_normal.glb", Handle::default());
        let second = loader.begin("man_colored.glb", Handle::default());

        assert!(!loader.is_current(first));
        assert!(loader.is_current(second));
        assert_eq!(loader.active().map(|a| a.file.as_str()), Some("man_colored.glb"));

        // A completion for the superseded generation is ignored.
        assert!(loader.finish(first).is_none());
        assert!(!loader.has_settled());
        assert!(loader.finish(second).is_some());
        assert!(loader.has_settled());
        assert!(loader.active().is_none());
    }

    #[test]
    fn load_states_map_to_progress() {
        assert_eq!(
            load_status(&LoadState::Loading, &RecursiveDependencyLoadState::NotLoaded),
            LoadStatus::Pending(0.0)
        );
        assert_eq!(
            load_status(&LoadState::Loaded, &RecursiveDependencyLoadState::Loading),
            LoadStatus::Pending(PROGRESS_FILE_LOADED)
        );
        assert_eq!(
            load_status(&LoadState::Loaded, &RecursiveDependencyLoadState::Loaded),
            LoadStatus::Ready
        );
    }

    #[test]
    fn error_messages_name_the_file() {
        let error = ModelLoadError::MissingScene {
            file: "woman_normal.glb".into(),
        };
        assert_eq!(error.file(), "woman_normal.glb");
        assert_eq!(error.to_string(), "Model woman_normal.glb contains no scene");
    }

    fn loader_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .insert_resource(ViewerConfig::default())
            .init_resource::<ModelLoader>()
            .init_resource::<LoadingProgress>()
            .add_event::<ModelLoadRequest>()
            .add_event::<ModelUnloaded>()
            .add_systems(Update, handle_load_requests);
        app
    }

    #[test]
    fn request_removes_tagged_root_and_starts_new_generation() {
        let mut app = loader_app();
        let old_root = app
            .world_mut()
            .spawn((
                Name::new(MODEL_ROOT_NAME),
                ModelRoot {
                    generation: 0,
                    file: "man_normal.glb".into(),
                },
            ))
            .id();

        app.world_mut().send_event(ModelLoadRequest {
            file: "man_colored.glb".into(),
        });
        app.update();

        assert!(app.world().get_entity(old_root).is_err());
        let world = app.world_mut();
        let remaining = world
            .query_filtered::<Entity, With<ModelRoot>>()
            .iter(world)
            .count();
        assert_eq!(remaining, 0);

        let loader = app.world().resource::<ModelLoader>();
        assert_eq!(loader.active().map(|a| a.file.as_str()), Some("man_colored.glb"));
        assert_eq!(loader.active().map(|a| a.generation), Some(1));

        let unloaded = app.world().resource::<Events<ModelUnloaded>>();
        assert_eq!(unloaded.len(), 1);
    }

    #[test]
    fn requests_in_one_frame_collapse_to_last() {
        let mut app = loader_app();
        for file in ["man_colored.glb", "woman_normal.glb", "woman_colored.glb"] {
            app.world_mut().send_event(ModelLoadRequest { file: file.into() });
        }
        app.update();

        let loader = app.world().resource::<ModelLoader>();
        assert_eq!(loader.active().map(|a| a.generation), Some(1));
        assert_eq!(
            loader.active().map(|a| a.file.as_str()),
            Some("woman_colored.glb")
        );
        // Nothing was displayed, so nothing was unloaded.
        assert_eq!(app.world().resource::<Events<ModelUnloaded>>().len(), 0);
    }

    #[test]
    fn unreadable_model_fails_without_spawning() {
        let mut app = loader_app();
        app.add_event::<ModelLoadFailed>()
            .add_systems(Update, track_model_loading.after(handle_load_requests));

        app.world_mut().send_event(ModelLoadRequest {
            file: "missing.glb".into(),
        });

        // Asset IO runs on the task pools, so give it a few frames.
        for _ in 0..200 {
            app.update();
            if !app.world().resource::<Events<ModelLoadFailed>>().is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let failures = app.world().resource::<Events<ModelLoadFailed>>();
        let mut cursor = failures.get_cursor();
        let failure = cursor.read(failures).next().unwrap();
        assert_eq!(failure.generation, 1);
        assert_eq!(failure.error.file(), "missing.glb");

        let loader = app.world().resource::<ModelLoader>();
        assert!(loader.active().is_none());
        assert!(loader.has_settled());

        let world = app.world_mut();
        let roots = world
            .query_filtered::<Entity, With<ModelRoot>>()
            .iter(world)
            .count();
        assert_eq!(roots, 0);
    }
}
