//! Selection state
//!
//! Owns the set of selected elements and enforces two invariants: no two
//! members may be in an ancestor/descendant relationship, and no member
//! may be related to an element with pending edits for a different
//! element. Every rejection is a silent no-op; selection contention is
//! normal UI behavior, not an error.

use crate::dom::{NodeHandle, PageEffects, PageModel};
use crate::models::{CodeRange, Rect};

use super::edit_state::PendingEditBatch;

/// The set of currently selected elements, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    members: Vec<NodeHandle>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[NodeHandle] {
        &self.members
    }

    pub fn is_selected(&self, handle: NodeHandle) -> bool {
        self.members.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Most recently selected member.
    pub fn last(&self) -> Option<NodeHandle> {
        self.members.last().copied()
    }

    /// Ranges of all members, in insertion order.
    pub fn ranges(&self, model: &PageModel) -> Vec<CodeRange> {
        self.members
            .iter()
            .filter_map(|&h| model.get(h).and_then(|n| n.range))
            .collect()
    }

    /// Try to add an element to the selection. Returns whether the set
    /// changed. Rejects unannotated elements, duplicates, elements related
    /// to an existing member, and elements related to another element's
    /// pending edits.
    pub fn select(
        &mut self,
        handle: NodeHandle,
        model: &PageModel,
        batch: &PendingEditBatch,
        effects: &dyn PageEffects,
    ) -> bool {
        let Some(node) = model.get(handle) else {
            return false;
        };
        if node.range.is_none() || node.is_root {
            return false;
        }
        if self.members.contains(&handle) {
            return false;
        }
        if self.members.iter().any(|&m| model.related(m, handle)) {
            return false;
        }
        if batch.handles().any(|b| b != handle && model.related(b, handle)) {
            return false;
        }
        self.members.push(handle);
        effects.set_selected(handle, true);
        true
    }

    /// Remove an element from the selection. Elements in `locked` are
    /// involved in an active gesture and cannot be deselected out from
    /// under it.
    pub fn deselect(
        &mut self,
        handle: NodeHandle,
        locked: &[NodeHandle],
        effects: &dyn PageEffects,
    ) -> bool {
        if locked.contains(&handle) {
            return false;
        }
        let Some(index) = self.members.iter().position(|&m| m == handle) else {
            return false;
        };
        self.members.remove(index);
        effects.set_selected(handle, false);
        true
    }

    /// Deselect every member individually, respecting the lock guard.
    /// Returns whether anything changed.
    pub fn deselect_all(&mut self, locked: &[NodeHandle], effects: &dyn PageEffects) -> bool {
        let mut changed = false;
        for handle in self.members.clone() {
            changed |= self.deselect(handle, locked, effects);
        }
        changed
    }

    /// Deselect if present, else select.
    pub fn toggle(
        &mut self,
        handle: NodeHandle,
        model: &PageModel,
        batch: &PendingEditBatch,
        locked: &[NodeHandle],
        effects: &dyn PageEffects,
    ) -> bool {
        if self.is_selected(handle) {
            self.deselect(handle, locked, effects)
        } else {
            self.select(handle, model, batch, effects)
        }
    }

    /// Rubber-band selection. Candidates are elements whose box the band
    /// crosses, or that enclose the band — an element swallowed whole by
    /// the band is excluded, as is the root container.
    pub fn select_by_rect(
        &mut self,
        rect: &Rect,
        additive: bool,
        model: &PageModel,
        batch: &PendingEditBatch,
        locked: &[NodeHandle],
        effects: &dyn PageEffects,
    ) -> bool {
        let candidates: Vec<NodeHandle> = model
            .mapped_handles()
            .into_iter()
            .filter(|&h| {
                model
                    .get(h)
                    .map(|n| {
                        !n.is_root && n.bbox.intersects(rect) && !rect.contains_rect(&n.bbox)
                    })
                    .unwrap_or(false)
            })
            .collect();

        let mut changed = false;
        for handle in candidates {
            changed |= if additive {
                self.toggle(handle, model, batch, locked, effects)
            } else {
                self.select(handle, model, batch, effects)
            };
        }
        changed
    }

    /// Click selection. Clicks on the root container are ignored.
    pub fn select_by_click(
        &mut self,
        target: NodeHandle,
        additive: bool,
        model: &PageModel,
        batch: &PendingEditBatch,
        locked: &[NodeHandle],
        effects: &dyn PageEffects,
    ) -> bool {
        if model.get(target).map(|n| n.is_root).unwrap_or(true) {
            return false;
        }
        if additive {
            self.toggle(target, model, batch, locked, effects)
        } else {
            self.select(target, model, batch, effects)
        }
    }

    /// Drop all members without touching the page. Used when the model is
    /// rebuilt and every handle is invalidated.
    pub fn reset(&mut self) {
        self.members.clear();
    }
}
