use bevy::prelude::*;
use std::collections::HashSet;

use super::state::{BodyPart, PartId, PartRecolor, SelectionStore, ToggleController};
use crate::engine::core::config::{SelectionOnSwap, ViewerConfig};
use crate::engine::loading::model_loader::{ModelLoadFailed, ModelReady, ModelUnloaded};

/// A mesh entity was hit by a click.
#[derive(Event, Debug, Clone, Copy)]
pub struct PartPicked {
    pub entity: Entity,
}

/// The Selection Store changed. Carries the JSON array message for the host,
/// encoded at the moment of the change.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged(pub String);

impl SelectionChanged {
    pub fn snapshot(store: &SelectionStore) -> Result<Self, serde_json::Error> {
        store.to_message().map(Self)
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

fn report_change(controller: &ToggleController, changed: &mut EventWriter<SelectionChanged>) {
    match SelectionChanged::snapshot(controller.selection()) {
        Ok(event) => {
            changed.write(event);
        }
        Err(error) => error!("Failed to encode selection: {}", error),
    }
}

/// Restore every highlighted part and empty the selection.
#[derive(Event, Debug, Clone, Copy)]
pub struct ClearSelectionRequest;

/// Clone the material of `part` into a private asset and assign it to every
/// mesh of that part. Returns the source colour and the new handle.
fn clone_part_material(
    part: &PartId,
    source: &MeshMaterial3d<StandardMaterial>,
    parts: &Query<(Entity, &BodyPart, &MeshMaterial3d<StandardMaterial>)>,
    materials: &mut Assets<StandardMaterial>,
    commands: &mut Commands,
) -> Option<(Color, Handle<StandardMaterial>)> {
    let original = materials.get(&source.0)?.clone();
    let colour = original.base_color;
    let handle = materials.add(original);

    for (entity, body_part, _) in parts {
        if &body_part.0 == part {
            commands
                .entity(entity)
                .insert(MeshMaterial3d(handle.clone()));
        }
    }
    Some((colour, handle))
}

fn apply_recolor(recolor: &PartRecolor, materials: &mut Assets<StandardMaterial>) {
    if let Some(material) = materials.get_mut(&recolor.material) {
        material.base_color = recolor.colour;
    }
}

/// Toggle the highlight of every picked part.
pub fn toggle_picked_parts(
    mut picks: EventReader<PartPicked>,
    mut commands: Commands,
    parts: Query<(Entity, &BodyPart, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut controller: ResMut<ToggleController>,
    mut changed: EventWriter<SelectionChanged>,
) {
    for pick in picks.read() {
        // Hits without a standard material cannot be recoloured.
        let Ok((_, body_part, source)) = parts.get(pick.entity) else {
            continue;
        };
        let part = body_part.0.clone();

        if !controller.is_adopted(&part) {
            let Some((colour, handle)) =
                clone_part_material(&part, source, &parts, &mut materials, &mut commands)
            else {
                continue;
            };
            controller.adopt(part.clone(), colour, handle);
        }

        if let Some(recolor) = controller.toggle(&part) {
            apply_recolor(&recolor, &mut materials);
            debug!("{} {:?}", recolor.part, recolor.outcome);
            report_change(&controller, &mut changed);
        }
    }
}

pub fn clear_selection_requests(
    mut requests: EventReader<ClearSelectionRequest>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut controller: ResMut<ToggleController>,
    mut changed: EventWriter<SelectionChanged>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let restored = controller.clear_selection();
    for recolor in &restored {
        apply_recolor(recolor, &mut materials);
    }
    info!("Selection cleared ({} parts restored)", restored.len());
    report_change(&controller, &mut changed);
}

pub fn clear_selection_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: EventWriter<ClearSelectionRequest>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        requests.write(ClearSelectionRequest);
    }
}

/// Drop highlight state for meshes that no longer exist.
pub fn forget_parts_on_unload(
    mut unloaded: EventReader<ModelUnloaded>,
    config: Res<ViewerConfig>,
    mut controller: ResMut<ToggleController>,
    mut changed: EventWriter<SelectionChanged>,
) {
    if unloaded.read().count() == 0 {
        return;
    }
    controller.forget_parts();
    if config.selection_on_swap == SelectionOnSwap::Clear && controller.clear_store() {
        info!("Selection cleared on model swap");
        report_change(&controller, &mut changed);
    }
}

/// Re-highlight carried parts on a new model and drop the ones it lacks.
///
/// A failed load leaves no parts, so every carried identifier is dropped.
pub fn carry_selection_on_ready(
    mut ready: EventReader<ModelReady>,
    mut failed: EventReader<ModelLoadFailed>,
    mut commands: Commands,
    children: Query<&Children>,
    parts: Query<(Entity, &BodyPart, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut controller: ResMut<ToggleController>,
    mut changed: EventWriter<SelectionChanged>,
) {
    let latest = ready.read().last().cloned();
    let load_failed = failed.read().count() > 0;
    if latest.is_none() && !load_failed {
        return;
    }

    let available: HashSet<PartId> = match &latest {
        Some(model) => {
            debug!(
                "Carrying selection onto {} ({} parts, generation {})",
                model.file, model.part_count, model.generation
            );
            children
                .iter_descendants(model.root)
                .filter_map(|entity| parts.get(entity).ok())
                .map(|(_, part, _)| part.0.clone())
                .collect()
        }
        None => HashSet::new(),
    };

    let dropped = controller.retain_available(&available);
    if !dropped.is_empty() {
        info!(
            "Dropped {} selected parts missing from the new model: {:?}",
            dropped.len(),
            dropped
        );
        report_change(&controller, &mut changed);
    }

    for part in controller.pending_highlights() {
        let Some(source) = parts
            .iter()
            .find(|(_, body_part, _)| body_part.0 == part)
            .map(|(_, _, material)| material.clone())
        else {
            continue;
        };
        let Some((colour, handle)) =
            clone_part_material(&part, &source, &parts, &mut materials, &mut commands)
        else {
            continue;
        };
        let recolor = controller.adopt_highlighted(part, colour, handle);
        apply_recolor(&recolor, &mut materials);
    }
}
