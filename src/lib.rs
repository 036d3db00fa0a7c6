//! Visual HTML Editor WASM Module
//!
//! This is the in-page engine for a visual HTML editor hosted inside an
//! external editor's document preview. Rendered elements carry character
//! offsets into the original source markup; the engine turns direct
//! manipulation of those elements (select, drag, nudge, delete, clipboard)
//! into batched edit operations posted back to the host.

pub mod api;
pub mod bridge;
pub mod dom;
pub mod editing;
pub mod models;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use models::{CodeRange, EditOperation, EditorFlags, OperationKind, Point, Rect};
pub use session::EditorSession;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("HTML editor WASM module initialized");
}
