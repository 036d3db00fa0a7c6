//! Pending edit batch
//!
//! Per-element edit operations accumulate here during a gesture and leave
//! in one piece: `flush` hands back the whole batch in first-insertion
//! order and clears it in the same synchronous step, so a second flush
//! observes an empty batch.

use crate::dom::NodeHandle;
use crate::models::EditOperation;

/// One element's accumulated operations.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchEntry {
    pub handle: NodeHandle,
    pub operations: Vec<EditOperation>,
}

/// The shared batch of not-yet-transmitted edit operations.
#[derive(Clone, Debug, Default)]
pub struct PendingEditBatch {
    entries: Vec<BatchEntry>,
}

impl PendingEditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation to the element's entry, creating the entry if
    /// this is the element's first operation of the accumulation cycle.
    pub fn add_operation(&mut self, handle: NodeHandle, operation: EditOperation) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.handle == handle) {
            entry.operations.push(operation);
        } else {
            self.entries.push(BatchEntry {
                handle,
                operations: vec![operation],
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Handles that currently have a pending entry.
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.entries.iter().map(|e| e.handle)
    }

    pub fn operations_for(&self, handle: NodeHandle) -> Option<&[EditOperation]> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.operations.as_slice())
    }

    /// Take the full batch in first-insertion order and clear it.
    pub fn flush(&mut self) -> Vec<BatchEntry> {
        std::mem::take(&mut self.entries)
    }
}
