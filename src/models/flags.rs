//! Persisted editor flags
//!
//! The flag record travels in three directions: restored from the session
//! cache on startup, pushed by the host as the authoritative copy, and
//! rewritten to both on every local change.

use serde::{Deserialize, Serialize};

/// Editor-wide mode and view flags.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorFlags {
    /// Current zoom factor of the rendered preview.
    pub zoom: f64,

    /// Mirror local selection changes to the host editor.
    pub link_code: bool,

    /// Direct editing enabled; when false the page is view-only.
    pub edit_mode: bool,

    /// Preview styling mode (no effect on edit semantics).
    pub preview_mode: bool,
}

impl Default for EditorFlags {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            link_code: true,
            edit_mode: true,
            preview_mode: false,
        }
    }
}
