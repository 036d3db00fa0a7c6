//! Host message protocol
//!
//! Every message crossing the bridge is one JSON envelope `{type, data}`.
//! The host owns the source text; the engine only ever names ranges.

use serde::{Deserialize, Serialize};

use crate::models::{CodeRange, EditOperation, EditorFlags};

/// A selected element's range, as it appears in select/delete/copy/cut
/// payloads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RangeRef {
    pub code_range: CodeRange,
}

impl From<CodeRange> for RangeRef {
    fn from(code_range: CodeRange) -> Self {
        Self { code_range }
    }
}

/// One element's contribution to an `edit` flush.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditEntry {
    /// Tag name of the edited element.
    pub element: String,
    /// Human-readable path to the element within the document.
    pub dom_path: String,
    pub code_range: CodeRange,
    pub operations: Vec<EditOperation>,
}

/// Paste request payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PasteIntent {
    pub is_html: bool,
    pub code_range: CodeRange,
}

/// Explicitly empty payload, serialized as `{}`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyPayload {}

/// Engine-to-host messages.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Flush of one completed gesture's edit batch.
    Edit(Vec<EditEntry>),
    /// Selection changed (sent only while link mode is enabled).
    Select(Vec<RangeRef>),
    Delete(Vec<RangeRef>),
    Copy(Vec<RangeRef>),
    Cut(Vec<RangeRef>),
    Paste(PasteIntent),
    Refresh(EmptyPayload),
    State(EditorFlags),
}

/// Host-to-engine messages.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Authoritative flag push; overwrites local flags.
    State(EditorFlags),
    /// Positional re-binding of source ranges to mapped elements.
    CodeRanges(Vec<CodeRange>),
    /// Select the deepest mapped element containing each range.
    Select(Vec<CodeRange>),
}
