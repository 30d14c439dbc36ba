//! Communication with the page and the mobile shell hosting the viewer.
//!
//! Two independent channels leave the canvas:
//!
//! - **Selection bridge**: after every selection change the ordered list of
//!   highlighted parts is posted as a bare JSON array string, e.g.
//!   `["Arm","Leg"]`, to `window.FlutterChannel.postMessage`. The shell only
//!   understands this exact shape, so it is never wrapped in an RPC envelope.
//!   When the channel is missing the message is logged and dropped.
//! - **JSON-RPC 2.0** over `postMessage` with the parent window, carrying
//!   host commands in and lifecycle notifications out.
//!
//! ## Message Flow
//!
//! ```text
//! Host page / shell            Bevy (canvas)
//!        │                           │
//!        ├─ Request (with ID) ─────> │ toggle_variant, set_model, ...
//!        │ <──────── Response (ID) ──┤
//!        │ <──── Notification ───────┤ loading_progress, model_loaded,
//!        │                           │ model_load_failed
//!        │ <──── ["Arm","Leg"] ──────┤ FlutterChannel.postMessage
//! ```
//!
//! ## Methods
//!
//! - `toggle_variant`, `toggle_subject`: flip one axis and reload
//! - `set_model { subject?, variant? }`: explicit selection, always reloads
//! - `clear_selection`: restore every highlighted part
//! - `get_selection`: `{ "selected": [...] }`
//! - `get_model`: active subject, variant, file and URL
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// Selection bridge posting the highlighted parts to the host shell.
pub mod bridge;

/// JSON-RPC 2.0 request handling and notifications to the parent window.
pub mod web_rpc;
