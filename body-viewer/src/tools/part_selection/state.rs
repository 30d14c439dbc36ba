use bevy::prelude::*;
use constants::model_catalog::{SYNTHETIC_PART_PREFIX, SYNTHETIC_PART_SUFFIX_LEN};
use constants::selection::HIGHLIGHT_COLOUR;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Name of a selectable part of the loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identifier for a mesh that carries no usable name.
    pub fn synthesized() -> Self {
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}",
            SYNTHETIC_PART_PREFIX,
            &random[..SYNTHETIC_PART_SUFFIX_LEN]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tags every mesh entity of the model with the part it belongs to.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct BodyPart(pub PartId);

/// Ordered set of highlighted part identifiers, as reported to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    parts: Vec<PartId>,
}

impl SelectionStore {
    /// Append `part` unless already present. Returns true when it was added.
    pub fn select(&mut self, part: PartId) -> bool {
        if self.contains(&part) {
            return false;
        }
        self.parts.push(part);
        true
    }

    pub fn deselect(&mut self, part: &PartId) -> bool {
        let before = self.parts.len();
        self.parts.retain(|selected| selected != part);
        self.parts.len() != before
    }

    pub fn contains(&self, part: &PartId) -> bool {
        self.parts.contains(part)
    }

    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.parts.is_empty();
        self.parts.clear();
        changed
    }

    /// Keep only identifiers accepted by `keep`, returning the dropped ones.
    pub fn retain(&mut self, mut keep: impl FnMut(&PartId) -> bool) -> Vec<PartId> {
        let (kept, dropped): (Vec<PartId>, Vec<PartId>) = std::mem::take(&mut self.parts)
            .into_iter()
            .partition(|part| keep(part));
        self.parts = kept;
        dropped
    }

    /// JSON array of identifiers, e.g. `["Arm","Leg"]`.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.parts)
    }
}

/// Highlight side-table entry for one part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartHighlight {
    pub highlighted: bool,
    /// Colour before the first highlight, captured once.
    pub original_colour: Color,
    /// The part's private material, shared by all its meshes.
    pub material: Handle<StandardMaterial>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Highlighted,
    Restored,
}

/// Colour to write into a part's private material.
#[derive(Debug, Clone, PartialEq)]
pub struct PartRecolor {
    pub part: PartId,
    pub material: Handle<StandardMaterial>,
    pub colour: Color,
    pub outcome: ToggleOutcome,
}

/// Owns the Selection Store and the highlight side-table keyed by part.
#[derive(Resource, Debug, Clone)]
pub struct ToggleController {
    store: SelectionStore,
    table: HashMap<PartId, PartHighlight>,
    highlight_colour: Color,
}

impl Default for ToggleController {
    fn default() -> Self {
        Self::new(HIGHLIGHT_COLOUR)
    }
}

impl ToggleController {
    pub fn new(highlight_colour: Color) -> Self {
        Self {
            store: SelectionStore::default(),
            table: HashMap::new(),
            highlight_colour,
        }
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.store
    }

    /// Whether the part already owns a private material.
    pub fn is_adopted(&self, part: &PartId) -> bool {
        self.table.contains_key(part)
    }

    /// Register the private material for a part on its first interaction.
    ///
    /// The original colour of an already adopted part is never overwritten.
    pub fn adopt(
        &mut self,
        part: PartId,
        original_colour: Color,
        material: Handle<StandardMaterial>,
    ) {
        self.table.entry(part).or_insert(PartHighlight {
            highlighted: false,
            original_colour,
            material,
        });
    }

    /// Flip the highlight of an adopted part and update the store.
    ///
    /// Returns `None` when the part has no private material yet.
    pub fn toggle(&mut self, part: &PartId) -> Option<PartRecolor> {
        let entry = self.table.get_mut(part)?;
        entry.highlighted = !entry.highlighted;

        let (colour, outcome) = if entry.highlighted {
            self.store.select(part.clone());
            (self.highlight_colour, ToggleOutcome::Highlighted)
        } else {
            self.store.deselect(part);
            (entry.original_colour, ToggleOutcome::Restored)
        };

        Some(PartRecolor {
            part: part.clone(),
            material: entry.material.clone(),
            colour,
            outcome,
        })
    }

    /// Restore every highlighted part and empty the store.
    pub fn clear_selection(&mut self) -> Vec<PartRecolor> {
        let mut restored: Vec<PartRecolor> = self
            .table
            .iter_mut()
            .filter(|(_, entry)| entry.highlighted)
            .map(|(part, entry)| {
                entry.highlighted = false;
                PartRecolor {
                    part: part.clone(),
                    material: entry.material.clone(),
                    colour: entry.original_colour,
                    outcome: ToggleOutcome::Restored,
                }
            })
            .collect();
        restored.sort_by(|a, b| a.part.cmp(&b.part));
        self.store.clear();
        restored
    }

    /// Drop the side-table once the meshes it refers to are gone.
    pub fn forget_parts(&mut self) {
        self.table.clear();
    }

    /// Empty the store without touching materials. Returns true if it changed.
    pub fn clear_store(&mut self) -> bool {
        self.store.clear()
    }

    /// Keep only selected parts present in `available`, returning the dropped ones.
    pub fn retain_available(&mut self, available: &HashSet<PartId>) -> Vec<PartId> {
        self.store.retain(|part| available.contains(part))
    }

    /// Selected parts that have no entry in the side-table yet.
    pub fn pending_highlights(&self) -> Vec<PartId> {
        self.store
            .parts()
            .iter()
            .filter(|part| !self.table.contains_key(*part))
            .cloned()
            .collect()
    }

    /// Adopt a part that is already selected and mark it highlighted.
    pub fn adopt_highlighted(
        &mut self,
        part: PartId,
        original_colour: Color,
        material: Handle<StandardMaterial>,
    ) -> PartRecolor {
        self.table.insert(
            part.clone(),
            PartHighlight {
                highlighted: true,
                original_colour,
                material: material.clone(),
            },
        );
        self.store.select(part.clone());
        PartRecolor {
            part,
            material,
            colour: self.highlight_colour,
            outcome: ToggleOutcome::Highlighted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::weak_handle;

    const SKIN: Color = Color::srgb(0.9, 0.7, 0.6);

    const MATERIALS: [Handle<StandardMaterial>; 5] = [
        weak_handle!("3f0c8a52-1d6b-4e1f-9a7c-000000000001"),
        weak_handle!("3f0c8a52-1d6b-4e1f-9a7c-000000000002"),
        weak_handle!("3f0c8a52-1d6b-4e1f-9a7c-000000000003"),
        weak_handle!("3f0c8a52-1d6b-4e1f-9a7c-000000000004"),
        weak_handle!("3f0c8a52-1d6b-4e1f-9a7c-000000000005"),
    ];

    fn part(name: &str) -> PartId {
        PartId::new(name)
    }

    fn controller_with(parts: &[&str]) -> ToggleController {
        let mut controller = ToggleController::default();
        for (index, name) in parts.iter().enumerate() {
            controller.adopt(part(name), SKIN, MATERIALS[index].clone());
        }
        controller
    }

    #[test]
    fn odd_clicks_highlight_and_even_clicks_restore() {
        let mut controller = controller_with(&["Arm"]);

        for click in 1..=6 {
            let recolor = controller.toggle(&part("Arm")).unwrap();
            if click % 2 == 1 {
                assert_eq!(recolor.colour, HIGHLIGHT_COLOUR);
                assert_eq!(recolor.outcome, ToggleOutcome::Highlighted);
                assert_eq!(controller.selection().parts(), &[part("Arm")]);
            } else {
                assert_eq!(recolor.colour, SKIN);
                assert_eq!(recolor.outcome, ToggleOutcome::Restored);
                assert!(controller.selection().is_empty());
            }
        }
    }

    #[test]
    fn original_colour_is_snapshotted_once() {
        let mut controller = controller_with(&["Arm"]);
        controller.toggle(&part("Arm"));
        // A second adoption while highlighted must not capture red as original.
        controller.adopt(part("Arm"), HIGHLIGHT_COLOUR, MATERIALS[4].clone());

        let recolor = controller.toggle(&part("Arm")).unwrap();
        assert_eq!(recolor.colour, SKIN);
        assert_eq!(recolor.material, MATERIALS[0]);
    }

    #[test]
    fn unadopted_parts_are_ignored() {
        let mut controller = ToggleController::default();
        assert!(controller.toggle(&part("Arm")).is_none());
        assert!(controller.selection().is_empty());
    }

    #[test]
    fn store_never_holds_duplicates() {
        let mut store = SelectionStore::default();
        assert!(store.select(part("Arm")));
        assert!(!store.select(part("Arm")));
        assert!(store.select(part("Leg")));
        assert_eq!(store.parts(), &[part("Arm"), part("Leg")]);
        assert!(store.deselect(&part("Arm")));
        assert!(!store.deselect(&part("Arm")));
    }

    #[test]
    fn store_serializes_to_json_array() {
        let mut store = SelectionStore::default();
        assert_eq!(store.to_message().unwrap(), "[]");
        store.select(part("Arm"));
        store.select(part("Leg"));
        assert_eq!(store.to_message().unwrap(), r#"["Arm","Leg"]"#);
    }

    #[test]
    fn selection_keeps_click_order() {
        let mut controller = controller_with(&["Leg", "Arm", "Head"]);
        controller.toggle(&part("Leg"));
        controller.toggle(&part("Head"));
        controller.toggle(&part("Arm"));
        controller.toggle(&part("Head"));
        assert_eq!(controller.selection().parts(), &[part("Leg"), part("Arm")]);
    }

    #[test]
    fn clear_selection_restores_only_highlighted_parts() {
        let mut controller = controller_with(&["Arm", "Leg", "Head"]);
        controller.toggle(&part("Leg"));
        controller.toggle(&part("Arm"));

        let restored = controller.clear_selection();
        let names: Vec<&str> = restored.iter().map(|r| r.part.as_str()).collect();
        assert_eq!(names, vec!["Arm", "Leg"]);
        assert!(restored.iter().all(|r| r.colour == SKIN));
        assert!(controller.selection().is_empty());
        // Cleared parts start over from the restored state.
        let recolor = controller.toggle(&part("Arm")).unwrap();
        assert_eq!(recolor.outcome, ToggleOutcome::Highlighted);
    }

    #[test]
    fn carried_selection_drops_missing_parts() {
        let mut controller = controller_with(&["Arm", "Tail"]);
        controller.toggle(&part("Arm"));
        controller.toggle(&part("Tail"));
        controller.forget_parts();

        let available: HashSet<PartId> = [part("Arm"), part("Leg")].into_iter().collect();
        let dropped = controller.retain_available(&available);
        assert_eq!(dropped, vec![part("Tail")]);
        assert_eq!(controller.pending_highlights(), vec![part("Arm")]);

        let recolor = controller.adopt_highlighted(part("Arm"), SKIN, MATERIALS[3].clone());
        assert_eq!(recolor.colour, HIGHLIGHT_COLOUR);
        assert!(controller.pending_highlights().is_empty());
        assert_eq!(controller.selection().parts(), &[part("Arm")]);

        // The next click on the carried part restores the new model's colour.
        let restored = controller.toggle(&part("Arm")).unwrap();
        assert_eq!(restored.colour, SKIN);
        assert!(controller.selection().is_empty());
    }

    #[test]
    fn synthesized_ids_have_prefix_and_fixed_length() {
        let id = PartId::synthesized();
        assert!(id.as_str().starts_with("Mesh_"));
        assert_eq!(id.as_str().len(), 14);
        assert!(id.as_str()[5..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
