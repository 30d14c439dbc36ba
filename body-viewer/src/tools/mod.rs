//! Interactive tools operating on the loaded model.
//!
//! ## Part selection
//!
//! Left click or tap on a part toggles its red highlight. The ordered list of
//! highlighted parts is posted to the host after every change. `Escape` or the
//! `clear_selection` RPC restores every part at once.
//!
//! ## Model swap
//!
//! Two independent toggles choose the model file: variant (skin or colour
//! coded) and subject (male or female). Every command reloads the model, even
//! when the resulting file is the one already shown.
//!
//! ```text
//! Button / RPC
//!   └─> ModelCommand
//!       └─> handle_model_commands()
//!           └─> ModelLoadRequest
//! ```

/// Part picking, highlight toggling and the selection store.
pub mod part_selection;

/// Variant and subject toggles driving model reloads.
pub mod model_swap;
