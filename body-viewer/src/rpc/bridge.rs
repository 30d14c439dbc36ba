use bevy::prelude::*;

use crate::engine::core::config::ViewerConfig;
use crate::engine::core::sets::ViewerSet;
use crate::tools::part_selection::highlight::SelectionChanged;

/// Error types for posting to the host channel.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    ChannelUnavailable(String),
    PostFailed(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::ChannelUnavailable(name) => write!(f, "{} is not available", name),
            BridgeError::PostFailed(reason) => write!(f, "postMessage failed: {}", reason),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Outbound string channel to the host shell.
pub trait HostChannel: Send + Sync {
    fn name(&self) -> &str;
    fn post(&self, message: &str) -> Result<(), BridgeError>;
}

/// Whether the last notify reached the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BridgeStatus {
    #[default]
    Unknown,
    Connected,
    NotConnected,
}

impl BridgeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Waiting for selection",
            Self::Connected => "Connected",
            Self::NotConnected => "Not connected",
        }
    }
}

/// Posts the selection to the host after every change. No queue, no retry.
#[derive(Resource)]
pub struct BridgeNotifier {
    channel: Box<dyn HostChannel>,
    status: BridgeStatus,
}

impl BridgeNotifier {
    pub fn new(channel: Box<dyn HostChannel>) -> Self {
        Self {
            channel,
            status: BridgeStatus::Unknown,
        }
    }

    pub fn status(&self) -> BridgeStatus {
        self.status
    }

    /// Send one JSON array string holding the full selection.
    pub fn notify(&mut self, message: &str) -> Result<(), BridgeError> {
        match self.channel.post(message) {
            Ok(()) => {
                self.status = BridgeStatus::Connected;
                Ok(())
            }
            Err(error) => {
                self.status = BridgeStatus::NotConnected;
                Err(error)
            }
        }
    }
}

/// `window[name].postMessage(message)` in the page hosting the canvas.
#[cfg(target_arch = "wasm32")]
pub struct WindowChannel {
    name: String,
}

#[cfg(target_arch = "wasm32")]
impl WindowChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl HostChannel for WindowChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn post(&self, message: &str) -> Result<(), BridgeError> {
        use wasm_bindgen::{JsCast, JsValue};

        let unavailable = || BridgeError::ChannelUnavailable(self.name.clone());
        let window = web_sys::window().ok_or_else(unavailable)?;
        let channel = js_sys::Reflect::get(&window, &JsValue::from_str(&self.name))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .ok_or_else(unavailable)?;
        let post = js_sys::Reflect::get(&channel, &JsValue::from_str("postMessage"))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(unavailable)?;

        post.call1(&channel, &JsValue::from_str(message))
            .map(|_| ())
            .map_err(|error| BridgeError::PostFailed(format!("{:?}", error)))
    }
}

/// Native builds run without a host shell.
pub struct NoHostChannel {
    name: String,
}

impl NoHostChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl HostChannel for NoHostChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn post(&self, _message: &str) -> Result<(), BridgeError> {
        Err(BridgeError::ChannelUnavailable(self.name.clone()))
    }
}

/// Host channel for the current target.
pub fn platform_channel(name: &str) -> Box<dyn HostChannel> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(WindowChannel::new(name))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(NoHostChannel::new(name))
    }
}

pub fn setup_bridge(mut commands: Commands, config: Res<ViewerConfig>) {
    let channel = platform_channel(&config.bridge_channel);
    info!("Selection bridge channel: {}", channel.name());
    commands.insert_resource(BridgeNotifier::new(channel));
}

/// Notify the host once per selection change, in order.
pub fn notify_host_on_selection_change(
    mut changes: EventReader<SelectionChanged>,
    notifier: Option<ResMut<BridgeNotifier>>,
) {
    let Some(mut notifier) = notifier else {
        changes.clear();
        return;
    };

    for change in changes.read() {
        match notifier.notify(change.message()) {
            Ok(()) => debug!("Selection sent: {}", change.message()),
            Err(error) => error!("{}", error),
        }
    }
}

/// Plugin wiring the selection bridge to the host shell.
pub struct HostBridgePlugin;

impl Plugin for HostBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_bridge).add_systems(
            Update,
            notify_host_on_selection_change.in_set(ViewerSet::Outbound),
        );
    }
}
