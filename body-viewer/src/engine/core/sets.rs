use bevy::prelude::*;

/// Per-frame ordering of the viewer's `Update` work.
///
/// Commands from buttons, the host and the keyboard are resolved before loads
/// are issued, loads settle before the selection reacts to them, and outbound
/// host traffic is flushed last.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerSet {
    Input,
    Commands,
    Loading,
    Selection,
    Presentation,
    Outbound,
}

pub fn configure_viewer_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            ViewerSet::Input,
            ViewerSet::Commands,
            ViewerSet::Loading,
            ViewerSet::Selection,
            ViewerSet::Presentation,
            ViewerSet::Outbound,
        )
            .chain(),
    );
}
