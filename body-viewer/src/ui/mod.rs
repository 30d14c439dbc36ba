//! Screen overlays drawn with `bevy_ui` on top of the model.
//!
//! - Loader bar across the top edge, hidden shortly after a load completes
//! - Variant and subject toggle buttons
//! - Bridge diagnostic panel, spawned in development mode only

/// Progress bar mirroring `LoadingProgress`.
pub mod loader_bar;

/// Bridge connection indicator for development builds.
pub mod diagnostics;

/// Variant and subject toggle buttons.
pub mod model_buttons;

use bevy::prelude::*;

use crate::engine::core::sets::ViewerSet;

pub struct ViewerUiPlugin;

impl Plugin for ViewerUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                loader_bar::spawn_loader_bar,
                model_buttons::spawn_model_buttons,
                diagnostics::spawn_diagnostics_panel,
            ),
        )
        .add_systems(
            Update,
            (
                model_buttons::variant_button_interaction,
                model_buttons::subject_button_interaction,
            )
                .in_set(ViewerSet::Input),
        )
        .add_systems(
            Update,
            (
                loader_bar::update_loader_bar,
                model_buttons::reflect_model_labels,
            )
                .in_set(ViewerSet::Presentation),
        )
        .add_systems(
            Update,
            diagnostics::update_bridge_indicator.after(ViewerSet::Outbound),
        );
    }
}
