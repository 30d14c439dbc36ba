use bevy::prelude::*;

use crate::engine::assets::model_catalog::{ModelSelection, Subject, Variant};
use crate::engine::core::config::ViewerConfig;
use crate::engine::core::sets::ViewerSet;
use crate::engine::loading::model_loader::ModelLoadRequest;

/// Requested change to the displayed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSwap {
    ToggleVariant,
    ToggleSubject,
    SetVariant(Variant),
    SetSubject(Subject),
    Set {
        subject: Option<Subject>,
        variant: Option<Variant>,
    },
}

/// Where a swap came from, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCommandSource {
    Button,
    Rpc,
    Startup,
}

/// Event fired when a button or the host asks for a different model.
#[derive(Event, Debug, Clone, Copy)]
pub struct ModelCommand {
    pub swap: ModelSwap,
    pub source: ModelCommandSource,
}

impl ModelCommand {
    pub fn new(swap: ModelSwap, source: ModelCommandSource) -> Self {
        Self { swap, source }
    }
}

/// Resource holding the active subject and variant.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelSwapController {
    selection: ModelSelection,
}

impl ModelSwapController {
    pub fn new(selection: ModelSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> ModelSelection {
        self.selection
    }

    /// Flip the variant and return the file to load.
    pub fn toggle_variant(&mut self) -> Option<&'static str> {
        self.apply(ModelSwap::ToggleVariant)
    }

    /// Flip the subject and return the file to load.
    pub fn toggle_subject(&mut self) -> Option<&'static str> {
        self.apply(ModelSwap::ToggleSubject)
    }

    /// Apply a swap and return the file to load.
    ///
    /// Explicit sets always yield a file, even when nothing changed.
    pub fn apply(&mut self, swap: ModelSwap) -> Option<&'static str> {
        let selection = &mut self.selection;
        match swap {
            ModelSwap::ToggleVariant => selection.variant = selection.variant.toggled(),
            ModelSwap::ToggleSubject => selection.subject = selection.subject.toggled(),
            ModelSwap::SetVariant(variant) => selection.variant = variant,
            ModelSwap::SetSubject(subject) => selection.subject = subject,
            ModelSwap::Set { subject, variant } => {
                if let Some(subject) = subject {
                    selection.subject = subject;
                }
                if let Some(variant) = variant {
                    selection.variant = variant;
                }
            }
        }
        self.selection.file()
    }
}

/// Apply every queued command, each one resulting in an unload and reload.
pub fn handle_model_commands(
    mut commands: EventReader<ModelCommand>,
    mut controller: ResMut<ModelSwapController>,
    mut requests: EventWriter<ModelLoadRequest>,
) {
    for command in commands.read() {
        let Some(file) = controller.apply(command.swap) else {
            let selection = controller.selection();
            error!(
                "No model file for {}/{}",
                selection.subject.as_str(),
                selection.variant.as_str()
            );
            continue;
        };

        info!("Model swap {:?} via {:?} -> {}", command.swap, command.source, file);
        requests.write(ModelLoadRequest {
            file: file.to_string(),
        });
    }
}

/// Load the configured model once at startup.
pub fn request_initial_model(
    config: Res<ViewerConfig>,
    mut model_commands: EventWriter<ModelCommand>,
) {
    model_commands.write(ModelCommand::new(
        ModelSwap::Set {
            subject: Some(config.initial_subject),
            variant: Some(config.initial_variant),
        },
        ModelCommandSource::Startup,
    ));
}

pub struct ModelSwapPlugin;

impl Plugin for ModelSwapPlugin {
    fn build(&self, app: &mut App) {
        let initial = app
            .world()
            .get_resource::<ViewerConfig>()
            .map(ViewerConfig::initial_selection)
            .unwrap_or_default();

        app.insert_resource(ModelSwapController::new(initial))
            .add_event::<ModelCommand>()
            .add_systems(Startup, request_initial_model)
            .add_systems(Update, handle_model_commands.in_set(ViewerSet::Commands));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_one_axis_each() {
        let mut controller = ModelSwapController::default();
        assert_eq!(controller.toggle_variant(), Some("man_colored.glb"));
        assert_eq!(controller.toggle_subject(), Some("woman_colored.glb"));
        assert_eq!(controller.toggle_variant(), Some("woman_normal.glb"));
        assert_eq!(controller.toggle_subject(), Some("man_normal.glb"));
    }

    #[test]
    fn explicit_set_reloads_even_when_unchanged() {
        let mut controller = ModelSwapController::default();
        assert_eq!(
            controller.apply(ModelSwap::SetVariant(Variant::Normal)),
            Some("man_normal.glb")
        );
        assert_eq!(
            controller.apply(ModelSwap::Set {
                subject: Some(Subject::Female),
                variant: None
            }),
            Some("woman_normal.glb")
        );
        assert_eq!(controller.selection().variant, Variant::Normal);
    }

    fn swap_app() -> App {
        let mut app = App::new();
        app.insert_resource(ModelSwapController::default())
            .add_event::<ModelCommand>()
            .add_event::<ModelLoadRequest>()
            .add_systems(Update, handle_model_commands);
        app
    }

    fn requested_files(app: &App) -> Vec<String> {
        let events = app.world().resource::<Events<ModelLoadRequest>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).map(|request| request.file.clone()).collect()
    }

    #[test]
    fn every_command_issues_a_load_request() {
        let mut app = swap_app();
        for swap in [ModelSwap::ToggleVariant, ModelSwap::ToggleVariant, ModelSwap::ToggleSubject] {
            app.world_mut()
                .send_event(ModelCommand::new(swap, ModelCommandSource::Button));
        }
        app.update();

        assert_eq!(
            requested_files(&app),
            vec!["man_colored.glb", "man_normal.glb", "woman_normal.glb"]
        );
    }

    #[test]
    fn startup_requests_configured_model() {
        let mut app = swap_app();
        let config = ViewerConfig {
            initial_subject: Subject::Female,
            initial_variant: Variant::Colored,
            ..default()
        };
        app.insert_resource(config)
            .add_systems(Startup, request_initial_model);
        app.update();

        assert_eq!(requested_files(&app), vec!["woman_colored.glb"]);
    }
}
