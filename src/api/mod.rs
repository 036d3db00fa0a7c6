//! HTML Editor WASM API
//!
//! This module provides the JavaScript-facing surface of the engine. The
//! embedding page forwards raw pointer/keyboard events and host messages
//! into the exported functions; everything below this layer is pure Rust
//! over the page model.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, error handling, and logging
//! - `error`: API boundary error type
//! - `binding`: DOM scan, handle-to-node table, storage and transport bindings
//! - `events`: Exported lifecycle, input, command, and message entry points
//! - `clipboard`: Focus-gated clipboard paste flow

pub mod binding;
pub mod clipboard;
pub mod error;
pub mod events;
pub mod helpers;

// Re-export the public API surface
pub use clipboard::paste_from_clipboard;
pub use error::EditorError;
pub use events::{
    copy_selection, cut_selection, delete_selection, deselect_all, initialize, on_host_message,
    on_key_down, on_key_up, on_pointer_down, on_pointer_move, on_pointer_up, rebuild_index,
    request_refresh, selector_frame, set_edit_mode, set_link_code, set_preview_mode, set_zoom,
    subscribe_events,
};
