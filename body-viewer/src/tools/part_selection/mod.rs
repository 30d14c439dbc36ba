//! Click-to-highlight selection of model parts.
//!
//! Clicks and taps are ray cast against the meshes tagged with `BodyPart`.
//! A hit toggles the highlight of the whole part: on first contact the part
//! receives a private copy of its material so recolouring never bleeds into
//! meshes that shared the original. Every change to the selection emits a
//! `SelectionChanged` holding the JSON array message the host bridge posts.
//!
//! ```text
//! mouse / touch release
//!   └─> pick_part_on_click()        ray cast, ignores drags and UI
//!       └─> PartPicked
//!           └─> toggle_picked_parts()   side-table + store + recolour
//!               └─> SelectionChanged
//! ```
//!
//! When the model is swapped the side-table is dropped with the old meshes.
//! The store is either emptied or carried over to the new model, depending on
//! `SelectionOnSwap`.

/// Selection store, part identifiers and the highlight side-table.
pub mod state;

/// Systems applying toggles, clears and model swap carry-over.
pub mod highlight;

/// Click detection and ray casting against part meshes.
pub mod picking;

use bevy::prelude::*;

use crate::engine::core::app_state::AppState;
use crate::engine::core::sets::ViewerSet;
use highlight::{
    ClearSelectionRequest, PartPicked, SelectionChanged, carry_selection_on_ready,
    clear_selection_on_escape, clear_selection_requests, forget_parts_on_unload,
    toggle_picked_parts,
};
use picking::pick_part_on_click;
use state::ToggleController;

pub struct PartSelectionPlugin;

impl Plugin for PartSelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToggleController>()
            .add_event::<PartPicked>()
            .add_event::<SelectionChanged>()
            .add_event::<ClearSelectionRequest>()
            .add_systems(
                Update,
                (
                    pick_part_on_click.run_if(in_state(AppState::Running)),
                    clear_selection_on_escape,
                )
                    .in_set(ViewerSet::Input),
            )
            .add_systems(
                Update,
                (
                    forget_parts_on_unload,
                    carry_selection_on_ready,
                    toggle_picked_parts,
                    clear_selection_requests,
                )
                    .chain()
                    .in_set(ViewerSet::Selection),
            );
    }
}
