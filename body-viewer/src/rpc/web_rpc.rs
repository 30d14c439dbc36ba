use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::model_catalog::{Subject, Variant};
use crate::engine::core::config::ViewerConfig;
use crate::engine::core::sets::ViewerSet;
use crate::tools::model_swap::{ModelCommand, ModelCommandSource, ModelSwap, ModelSwapController};
use crate::tools::part_selection::highlight::ClearSelectionRequest;
use crate::tools::part_selection::state::{PartId, SelectionStore, ToggleController};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource queueing RPC traffic to the host page until the end of the frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the JSON-RPC layer with the embedding page.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .in_set(ViewerSet::Input),
            )
            .add_systems(Update, send_outgoing_messages.in_set(ViewerSet::Outbound));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, host commands disabled");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // JS owns the closure from here on.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Messages pushed by the page's `message` listener.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw RPC message received from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Side effects requested by the RPC methods handled this frame.
#[derive(Debug, Default)]
struct RpcEffects {
    model_commands: Vec<ModelCommand>,
    clear_selection: bool,
}

/// State the RPC methods read while handling one frame of messages.
struct RpcContext<'a> {
    /// Copy of the swap controller with this frame's commands already applied.
    preview: ModelSwapController,
    selection: &'a SelectionStore,
    config: &'a ViewerConfig,
    effects: RpcEffects,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    swap_controller: Res<ModelSwapController>,
    toggle_controller: Res<ToggleController>,
    config: Res<ViewerConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut model_commands: EventWriter<ModelCommand>,
    mut clear_requests: EventWriter<ClearSelectionRequest>,
) {
    if events.is_empty() {
        return;
    }

    let mut context = RpcContext {
        preview: *swap_controller,
        selection: toggle_controller.selection(),
        config: &config,
        effects: RpcEffects::default(),
    };

    for event in events.read() {
        if config.mode.is_dev() {
            rpc_interface.send_notification(
                "debug_message",
                serde_json::json!({
                    "message": format!("Received RPC: {}", event.content)
                }),
            );
        }

        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &mut context) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Ignoring malformed RPC message: {}", parse_error);
            }
        }
    }

    model_commands.write_batch(context.effects.model_commands);
    if context.effects.clear_selection {
        clear_requests.write(ClearSelectionRequest);
    }
}

/// Handle individual RPC request and generate response based on method.
///
/// Requests without an ID are notifications: their effects apply but no
/// response is produced.
fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "toggle_variant" => handle_model_swap(ModelSwap::ToggleVariant, context),
        "toggle_subject" => handle_model_swap(ModelSwap::ToggleSubject, context),
        "set_model" => handle_set_model(&request.params, context),
        "clear_selection" => handle_clear_selection(context),
        "get_selection" => handle_get_selection(context),
        "get_model" => handle_get_model(context),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return request.id.clone().map(|id| {
                create_error_response(
                    id,
                    -32601,
                    "Method not found",
                    Some(serde_json::json!({"method": request.method})),
                )
            });
        }
    };

    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn model_state(controller: &ModelSwapController) -> Result<serde_json::Value, RpcError> {
    let selection = controller.selection();
    let file = selection
        .file()
        .ok_or_else(|| RpcError::internal_error("No model file for selection"))?;
    Ok(serde_json::json!({
        "subject": selection.subject,
        "variant": selection.variant,
        "file": file,
    }))
}

fn handle_model_swap(
    swap: ModelSwap,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    context.preview.apply(swap);
    context
        .effects
        .model_commands
        .push(ModelCommand::new(swap, ModelCommandSource::Rpc));
    model_state(&context.preview)
}

fn handle_set_model(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct SetModelParams {
        subject: Option<String>,
        variant: Option<String>,
    }

    let params = if params.is_null() {
        SetModelParams {
            subject: None,
            variant: None,
        }
    } else {
        serde_json::from_value::<SetModelParams>(params.clone()).map_err(|_| {
            RpcError::invalid_params("Expected optional 'subject' and 'variant' parameters")
        })?
    };

    let subject = params
        .subject
        .map(|name| {
            Subject::from_string(&name)
                .ok_or_else(|| RpcError::invalid_params(&format!("Unknown subject: {}", name)))
        })
        .transpose()?;
    let variant = params
        .variant
        .map(|name| {
            Variant::from_string(&name)
                .ok_or_else(|| RpcError::invalid_params(&format!("Unknown variant: {}", name)))
        })
        .transpose()?;

    handle_model_swap(ModelSwap::Set { subject, variant }, context)
}

fn handle_clear_selection(context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    context.effects.clear_selection = true;
    Ok(serde_json::json!({
        "selected": []
    }))
}

fn handle_get_selection(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let selected: &[PartId] = if context.effects.clear_selection {
        &[]
    } else {
        context.selection.parts()
    };
    Ok(serde_json::json!({
        "selected": selected
    }))
}

fn handle_get_model(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let mut state = model_state(&context.preview)?;
    if let Some(file) = context.preview.selection().file() {
        state["url"] = serde_json::Value::String(context.config.model_url(file));
    }
    Ok(state)
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        debug!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
