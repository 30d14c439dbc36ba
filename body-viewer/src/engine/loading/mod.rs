//! Model loading pipeline from request to a processed, visible asset.
//!
//! A request unloads the tagged model root and starts fetching the new glTF.
//! Load state is polled every frame and mirrored to the progress indicator;
//! once every dependency has arrived the scene is spawned hidden, its parts
//! are named and the root is recentered before it is revealed.
//!
//! ```text
//! ModelLoadRequest
//!   └─> handle_load_requests()      unload old root, begin generation N
//!       └─> track_model_loading()   poll asset server, report progress
//!           └─> spawn SceneRoot     hidden, tagged "3dmodel"
//!               └─> SceneInstanceReady observer
//!                   └─> process_spawned_model()  name parts, recenter, reveal
//!                       └─> ModelReady
//! ```
//!
//! Only the latest request is ever tracked. Issuing a new request drops the
//! previous handle, so a stale load can never spawn over a newer one.

/// Load requests, generation tracking and asset state polling.
pub mod model_loader;

/// Part naming and recentering of a freshly spawned model.
pub mod model_processing;

/// Loader bar progress with delayed hiding.
pub mod progress;

use bevy::prelude::*;

use crate::engine::core::config::ViewerConfig;
use crate::engine::core::sets::ViewerSet;
use model_loader::{
    ModelLoadFailed, ModelLoadRequest, ModelLoader, ModelReady, ModelUnloaded,
    handle_load_requests, report_load_failures, track_model_loading,
};
use model_processing::process_spawned_model;
use progress::{LoadingProgress, tick_loading_progress, update_loading_frontend};

/// Registers the loading resources, events and per-frame pipeline.
pub struct ModelLoadingPlugin;

impl Plugin for ModelLoadingPlugin {
    fn build(&self, app: &mut App) {
        let hide_delay = app
            .world()
            .get_resource::<ViewerConfig>()
            .map(|config| config.progress_hide_delay)
            .unwrap_or(constants::loading::PROGRESS_HIDE_DELAY_SECS);

        app.insert_resource(LoadingProgress::with_hide_delay(hide_delay))
            .init_resource::<ModelLoader>()
            .add_event::<ModelLoadRequest>()
            .add_event::<ModelUnloaded>()
            .add_event::<ModelReady>()
            .add_event::<ModelLoadFailed>()
            .add_systems(
                Update,
                (
                    handle_load_requests,
                    track_model_loading,
                    process_spawned_model,
                    report_load_failures,
                )
                    .chain()
                    .in_set(ViewerSet::Loading),
            )
            .add_systems(
                Update,
                (tick_loading_progress, update_loading_frontend)
                    .chain()
                    .in_set(ViewerSet::Presentation),
            );
    }
}
