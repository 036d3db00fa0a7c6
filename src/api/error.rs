//! API boundary errors
//!
//! Core state machines reject bad input silently; only the JS-facing
//! surface reports errors, and only for genuine failures (missing
//! session, serialization, environment gaps).

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("editor session is not initialized")]
    NotInitialized,

    #[error("host environment unavailable: {0}")]
    Capability(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("clipboard access failed: {0}")]
    Clipboard(String),
}

impl From<EditorError> for JsValue {
    fn from(error: EditorError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EditorError::NotInitialized.to_string(),
            "editor session is not initialized"
        );
        assert_eq!(
            EditorError::Clipboard("denied".to_string()).to_string(),
            "clipboard access failed: denied"
        );
    }
}
