//! Edit operations
//!
//! One operation describes one atomic change to one element's
//! presentation. Operations are appended per element as gestures
//! complete and never deduplicated; the host sees them in order.

use serde::{Deserialize, Serialize};

/// Discriminator for an edit operation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Repositioning of a movable element.
    Move,
    /// A non-positional inline style change.
    Style,
}

/// One atomic change to one element's presentation.
///
/// The payload is the element's final inline style string as of the end
/// of the gesture that produced the operation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EditOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub style: String,
}

impl EditOperation {
    pub fn new(kind: OperationKind, style: impl Into<String>) -> Self {
        Self {
            kind,
            style: style.into(),
        }
    }
}
