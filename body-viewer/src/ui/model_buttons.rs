use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

use crate::engine::assets::model_catalog::{Subject, Variant};
use crate::tools::model_swap::{ModelCommand, ModelCommandSource, ModelSwap, ModelSwapController};

const BUTTON_COLOUR: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVER_COLOUR: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED_COLOUR: Color = Color::srgb(0.18, 0.20, 0.24);

#[derive(Component)]
pub struct VariantButton;

#[derive(Component)]
pub struct VariantLabel;

#[derive(Component)]
pub struct SubjectButton;

#[derive(Component)]
pub struct SubjectLabel;

pub fn variant_label(variant: Variant) -> &'static str {
    match variant {
        Variant::Normal => "Skin",
        Variant::Colored => "Colored",
    }
}

pub fn subject_label(subject: Subject) -> &'static str {
    match subject {
        Subject::Male => "Male",
        Subject::Female => "Female",
    }
}

fn toggle_button<B: Component, L: Component>(
    parent: &mut ChildSpawnerCommands,
    button: B,
    label: L,
    name: &'static str,
    text: &'static str,
) {
    parent
        .spawn((
            button,
            Button,
            Name::new(name),
            BackgroundColor(BUTTON_COLOUR),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            Node {
                width: Val::Px(110.0),
                height: Val::Px(36.0),
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
        ))
        .with_children(|btn| {
            btn.spawn((
                label,
                Text::new(text),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 1.0)),
            ));
        });
}

pub fn spawn_model_buttons(mut commands: Commands, controller: Res<ModelSwapController>) {
    let selection = controller.selection();

    commands
        .spawn((
            Name::new("ModelButtons"),
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                right: Val::Px(12.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            toggle_button(
                parent,
                VariantButton,
                VariantLabel,
                "VariantButton",
                variant_label(selection.variant),
            );
            toggle_button(
                parent,
                SubjectButton,
                SubjectLabel,
                "SubjectButton",
                subject_label(selection.subject),
            );
        });
}

fn press_colour(interaction: Interaction) -> Color {
    match interaction {
        Interaction::Pressed => BUTTON_PRESSED_COLOUR,
        Interaction::Hovered => BUTTON_HOVER_COLOUR,
        Interaction::None => BUTTON_COLOUR,
    }
}

// Variant button flips skin and colour-coded models
pub fn variant_button_interaction(
    mut q: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>, With<VariantButton>),
    >,
    mut model_commands: EventWriter<ModelCommand>,
) {
    for (interaction, mut bg) in &mut q {
        if *interaction == Interaction::Pressed {
            model_commands.write(ModelCommand::new(
                ModelSwap::ToggleVariant,
                ModelCommandSource::Button,
            ));
        }
        *bg = BackgroundColor(press_colour(*interaction));
    }
}

// Subject button flips male and female models
pub fn subject_button_interaction(
    mut q: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>, With<SubjectButton>),
    >,
    mut model_commands: EventWriter<ModelCommand>,
) {
    for (interaction, mut bg) in &mut q {
        if *interaction == Interaction::Pressed {
            model_commands.write(ModelCommand::new(
                ModelSwap::ToggleSubject,
                ModelCommandSource::Button,
            ));
        }
        *bg = BackgroundColor(press_colour(*interaction));
    }
}

pub fn reflect_model_labels(
    controller: Res<ModelSwapController>,
    mut labels: ParamSet<(
        Query<&mut Text, With<VariantLabel>>,
        Query<&mut Text, With<SubjectLabel>>,
    )>,
) {
    if !controller.is_changed() {
        return;
    }
    let selection = controller.selection();

    if let Ok(mut text) = labels.p0().single_mut() {
        *text = Text::new(variant_label(selection.variant));
    }
    if let Ok(mut text) = labels.p1().single_mut() {
        *text = Text::new(subject_label(selection.subject));
    }
}
