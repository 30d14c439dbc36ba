use bevy::prelude::*;

use crate::engine::loading::model_loader::ModelLoader;

/// The viewer waits in `Loading` until the first model settles.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

// A failed first load still ends the loading phase so the buttons stay usable.
pub fn transition_to_running(
    loader: Res<ModelLoader>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loader.has_settled() {
        println!("→ First model settled, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
