//! Movable elements
//!
//! The direct-manipulation engine. An eligibility scan after each page
//! build decides which mapped elements can be repositioned by simple
//! anchor arithmetic; a gesture then snapshots their inline styles,
//! applies deltas, and diffs the styles back into edit operations.

use std::collections::HashMap;

use crate::dom::{parse_px, px_string, AnchorX, AnchorY, ComputedPosition, NodeHandle, PageEffects, PageModel};
use crate::models::{EditOperation, OperationKind};

use super::edit_state::PendingEditBatch;

/// One eligible element and its resolved anchor sides.
#[derive(Clone, Copy, Debug)]
pub struct Mover {
    pub handle: NodeHandle,
    pub x_anchor: AnchorX,
    pub y_anchor: AnchorY,
}

/// Pre-gesture state for one mover.
#[derive(Clone, Debug)]
struct StyleSnapshot {
    css_text: String,
    x_base: f64,
    y_base: f64,
}

/// The movable-element registry and the active gesture's snapshots.
#[derive(Debug, Default)]
pub struct MoverRegistry {
    eligible: Vec<Mover>,
    active: Vec<NodeHandle>,
    snapshots: HashMap<NodeHandle, StyleSnapshot>,
}

impl MoverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide which mapped elements can be directly manipulated and pin
    /// their anchors as explicit inline style so gesture arithmetic has a
    /// stable numeric base. Returns the number of eligible elements.
    ///
    /// Skipped: non-positioned elements, elements anchored on both sides
    /// of an axis (ambiguous, do not guess), and anchors in non-pixel
    /// units (not safely diff-able).
    pub fn scan(&mut self, model: &mut PageModel, effects: &dyn PageEffects) -> usize {
        self.eligible.clear();
        self.active.clear();
        self.snapshots.clear();

        for handle in model.mapped_handles() {
            let Some(node) = model.get(handle) else {
                continue;
            };
            let computed = &node.computed;
            match computed.position.trim() {
                "static" | "sticky" | "" => continue,
                _ => {}
            }

            let left_auto = ComputedPosition::is_auto(&computed.left);
            let right_auto = ComputedPosition::is_auto(&computed.right);
            let top_auto = ComputedPosition::is_auto(&computed.top);
            let bottom_auto = ComputedPosition::is_auto(&computed.bottom);
            if (!left_auto && !right_auto) || (!top_auto && !bottom_auto) {
                continue;
            }

            let x_anchor = if !left_auto || right_auto {
                AnchorX::Left
            } else {
                AnchorX::Right
            };
            let y_anchor = if !top_auto || bottom_auto {
                AnchorY::Top
            } else {
                AnchorY::Bottom
            };

            let x_raw = match x_anchor {
                AnchorX::Left => computed.left.as_str(),
                AnchorX::Right => computed.right.as_str(),
            };
            let y_raw = match y_anchor {
                AnchorY::Top => computed.top.as_str(),
                AnchorY::Bottom => computed.bottom.as_str(),
            };
            let x_base = match resolve_anchor_px(x_raw) {
                Some(v) => v,
                None => continue,
            };
            let y_base = match resolve_anchor_px(y_raw) {
                Some(v) => v,
                None => continue,
            };

            if let Some(node) = model.get_mut(handle) {
                node.style.set(x_anchor.property(), &px_string(x_base));
                node.style.set(y_anchor.property(), &px_string(y_base));
                effects.write_style(handle, &node.style.css_text());
            }

            self.eligible.push(Mover {
                handle,
                x_anchor,
                y_anchor,
            });
        }

        log::debug!("mover scan: {} eligible elements", self.eligible.len());
        self.eligible.len()
    }

    pub fn is_eligible(&self, handle: NodeHandle) -> bool {
        self.eligible.iter().any(|m| m.handle == handle)
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    /// True if any of the given handles is eligible for manipulation.
    pub fn any_eligible(&self, handles: &[NodeHandle]) -> bool {
        handles.iter().any(|&h| self.is_eligible(h))
    }

    /// Handles captured by the active gesture.
    pub fn active_handles(&self) -> &[NodeHandle] {
        &self.active
    }

    pub fn gesture_active(&self) -> bool {
        !self.active.is_empty()
    }

    fn mover(&self, handle: NodeHandle) -> Option<Mover> {
        self.eligible.iter().copied().find(|m| m.handle == handle)
    }

    /// Start a gesture: capture the movers among the selected elements and
    /// snapshot their inline styles for the end-of-gesture diff.
    pub fn begin_edit(&mut self, model: &PageModel, selected: &[NodeHandle]) {
        self.active = selected
            .iter()
            .copied()
            .filter(|&h| self.is_eligible(h))
            .collect();
        self.snapshots.clear();

        for &handle in &self.active {
            let (Some(node), Some(mover)) = (model.get(handle), self.mover(handle)) else {
                continue;
            };
            let x_base = node
                .style
                .get(mover.x_anchor.property())
                .and_then(parse_px)
                .unwrap_or(0.0);
            let y_base = node
                .style
                .get(mover.y_anchor.property())
                .and_then(parse_px)
                .unwrap_or(0.0);
            self.snapshots.insert(
                handle,
                StyleSnapshot {
                    css_text: node.style.css_text(),
                    x_base,
                    y_base,
                },
            );
        }
    }

    /// Apply a free move to every active mover. Deltas are truncated to
    /// whole pixels; anchor sign is flipped for right/bottom anchors.
    pub fn move_by(&self, model: &mut PageModel, effects: &dyn PageEffects, dx: f64, dy: f64) {
        let dx = dx.trunc();
        let dy = dy.trunc();
        for &handle in &self.active {
            let Some(mover) = self.mover(handle) else {
                continue;
            };
            let Some(node) = model.get_mut(handle) else {
                continue;
            };
            let dx = if mover.x_anchor.inverted() { -dx } else { dx };
            let dy = if mover.y_anchor.inverted() { -dy } else { dy };
            shift_property(node, mover.x_anchor.property(), dx);
            shift_property(node, mover.y_anchor.property(), dy);
            effects.write_style(handle, &node.style.css_text());
        }
    }

    /// Apply an axis-locked move: the inactive axis is first reset to its
    /// pre-gesture value so constrained drags cannot accumulate drift on
    /// the locked axis.
    pub fn move_constrained(
        &self,
        model: &mut PageModel,
        effects: &dyn PageEffects,
        horizontal: bool,
        dx: f64,
        dy: f64,
    ) {
        for &handle in &self.active {
            let (Some(mover), Some(snapshot)) = (self.mover(handle), self.snapshots.get(&handle))
            else {
                continue;
            };
            let Some(node) = model.get_mut(handle) else {
                continue;
            };
            if horizontal {
                node.style
                    .set(mover.y_anchor.property(), &px_string(snapshot.y_base));
                let dx = dx.trunc();
                let dx = if mover.x_anchor.inverted() { -dx } else { dx };
                shift_property(node, mover.x_anchor.property(), dx);
            } else {
                node.style
                    .set(mover.x_anchor.property(), &px_string(snapshot.x_base));
                let dy = dy.trunc();
                let dy = if mover.y_anchor.inverted() { -dy } else { dy };
                shift_property(node, mover.y_anchor.property(), dy);
            }
            effects.write_style(handle, &node.style.css_text());
        }
    }

    /// End the gesture: for every mover whose style string changed from
    /// its snapshot, append one operation to the shared batch. Returns the
    /// number of operations appended.
    pub fn end_edit(
        &mut self,
        model: &PageModel,
        batch: &mut PendingEditBatch,
        kind: OperationKind,
    ) -> usize {
        let mut appended = 0;
        for handle in std::mem::take(&mut self.active) {
            let (Some(node), Some(snapshot)) = (model.get(handle), self.snapshots.get(&handle))
            else {
                continue;
            };
            let css_text = node.style.css_text();
            if css_text != snapshot.css_text {
                batch.add_operation(handle, EditOperation::new(kind, css_text));
                appended += 1;
            }
        }
        self.snapshots.clear();
        appended
    }
}

/// Anchor values resolve to pixels in computed style; `auto` pins at zero.
fn resolve_anchor_px(raw: &str) -> Option<f64> {
    if ComputedPosition::is_auto(raw) {
        Some(0.0)
    } else {
        parse_px(raw)
    }
}

fn shift_property(node: &mut crate::dom::MappedNode, property: &str, delta: f64) {
    let current = node.style.get(property).and_then(parse_px).unwrap_or(0.0);
    node.style.set(property, &px_string(current + delta));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeSeed;

    struct NoopEffects;

    impl PageEffects for NoopEffects {
        fn write_style(&self, _handle: NodeHandle, _css_text: &str) {}
        fn set_selected(&self, _handle: NodeHandle, _selected: bool) {}
    }

    fn positioned(position: &str, left: &str, right: &str, top: &str, bottom: &str) -> ComputedPosition {
        ComputedPosition {
            position: position.to_string(),
            left: left.to_string(),
            right: right.to_string(),
            top: top.to_string(),
            bottom: bottom.to_string(),
        }
    }

    fn model_with(computed: ComputedPosition, style: &str) -> (PageModel, NodeHandle) {
        let mut model = PageModel::new();
        let root = model.push(NodeSeed::root("body"));
        let h = model.push(
            NodeSeed::new("div", Some(root))
                .with_range(0, 10)
                .with_style(style)
                .with_computed(computed),
        );
        (model, h)
    }

    #[test]
    fn test_scan_skips_static_and_sticky() {
        for position in ["static", "sticky"] {
            let (mut model, _) = model_with(positioned(position, "10px", "auto", "10px", "auto"), "");
            let mut movers = MoverRegistry::new();
            assert_eq!(movers.scan(&mut model, &NoopEffects), 0);
        }
    }

    #[test]
    fn test_scan_skips_ambiguous_anchor_pair() {
        let (mut model, _) = model_with(positioned("absolute", "10px", "20px", "10px", "auto"), "");
        let mut movers = MoverRegistry::new();
        assert_eq!(movers.scan(&mut model, &NoopEffects), 0);
    }

    #[test]
    fn test_scan_skips_non_pixel_anchor() {
        let (mut model, _) = model_with(positioned("absolute", "10%", "auto", "10px", "auto"), "");
        let mut movers = MoverRegistry::new();
        assert_eq!(movers.scan(&mut model, &NoopEffects), 0);
    }

    #[test]
    fn test_scan_pins_anchors_inline() {
        let (mut model, h) = model_with(positioned("absolute", "10px", "auto", "20px", "auto"), "");
        let mut movers = MoverRegistry::new();
        assert_eq!(movers.scan(&mut model, &NoopEffects), 1);
        assert!(movers.is_eligible(h));
        let node = model.get(h).unwrap();
        assert_eq!(node.style.get("left"), Some("10px"));
        assert_eq!(node.style.get("top"), Some("20px"));
    }

    #[test]
    fn test_scan_prefers_left_defaults_left() {
        let (mut model, h) = model_with(positioned("relative", "auto", "auto", "auto", "auto"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        let mover = movers.mover(h).unwrap();
        assert_eq!(mover.x_anchor, AnchorX::Left);
        assert_eq!(mover.y_anchor, AnchorY::Top);
        // auto anchors pin at zero
        assert_eq!(model.get(h).unwrap().style.get("left"), Some("0px"));
    }

    #[test]
    fn test_scan_resolves_right_bottom_anchors() {
        let (mut model, h) = model_with(positioned("absolute", "auto", "30px", "auto", "40px"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        let mover = movers.mover(h).unwrap();
        assert_eq!(mover.x_anchor, AnchorX::Right);
        assert_eq!(mover.y_anchor, AnchorY::Bottom);
    }

    #[test]
    fn test_move_by_applies_truncated_deltas() {
        let (mut model, h) = model_with(positioned("absolute", "10px", "auto", "10px", "auto"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        movers.begin_edit(&model, &[h]);
        movers.move_by(&mut model, &NoopEffects, 5.9, -3.2);
        let node = model.get(h).unwrap();
        assert_eq!(node.style.get("left"), Some("15px"));
        assert_eq!(node.style.get("top"), Some("7px"));
    }

    #[test]
    fn test_move_by_negates_for_right_bottom() {
        let (mut model, h) = model_with(positioned("absolute", "auto", "30px", "auto", "40px"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        movers.begin_edit(&model, &[h]);
        // Moving right/down shrinks right/bottom offsets.
        movers.move_by(&mut model, &NoopEffects, 10.0, 5.0);
        let node = model.get(h).unwrap();
        assert_eq!(node.style.get("right"), Some("20px"));
        assert_eq!(node.style.get("bottom"), Some("35px"));
    }

    #[test]
    fn test_constrained_horizontal_locks_vertical() {
        let (mut model, h) = model_with(positioned("absolute", "10px", "auto", "10px", "auto"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        movers.begin_edit(&model, &[h]);
        // Drift the element first, then drag constrained: the locked axis
        // must return to its pre-gesture value for any delta sequence.
        movers.move_by(&mut model, &NoopEffects, 4.0, 9.0);
        for (dx, dy) in [(3.0, -2.0), (7.0, 11.0), (-1.0, 5.0)] {
            movers.move_constrained(&mut model, &NoopEffects, true, dx, dy);
            assert_eq!(model.get(h).unwrap().style.get("top"), Some("10px"));
        }
        assert_eq!(model.get(h).unwrap().style.get("left"), Some("23px"));
    }

    #[test]
    fn test_end_edit_appends_single_operation() {
        let (mut model, h) = model_with(positioned("absolute", "10px", "auto", "10px", "auto"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        movers.begin_edit(&model, &[h]);
        movers.move_by(&mut model, &NoopEffects, 5.0, -3.0);
        let mut batch = PendingEditBatch::new();
        assert_eq!(movers.end_edit(&model, &mut batch, OperationKind::Move), 1);
        let ops = batch.operations_for(h).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OperationKind::Move);
        assert!(ops[0].style.contains("left: 15px;"));
        assert!(ops[0].style.contains("top: 7px;"));
    }

    #[test]
    fn test_end_edit_skips_unchanged() {
        let (mut model, h) = model_with(positioned("absolute", "10px", "auto", "10px", "auto"), "");
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        movers.begin_edit(&model, &[h]);
        // Net-zero motion leaves the style string equal to the snapshot.
        movers.move_by(&mut model, &NoopEffects, 5.0, 0.0);
        movers.move_by(&mut model, &NoopEffects, -5.0, 0.0);
        let mut batch = PendingEditBatch::new();
        assert_eq!(movers.end_edit(&model, &mut batch, OperationKind::Move), 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_begin_edit_captures_only_selected_movers() {
        let mut model = PageModel::new();
        let root = model.push(NodeSeed::root("body"));
        let mover = model.push(
            NodeSeed::new("div", Some(root))
                .with_range(0, 10)
                .with_computed(positioned("absolute", "10px", "auto", "10px", "auto")),
        );
        let fixed = model.push(
            NodeSeed::new("div", Some(root))
                .with_range(20, 30)
                .with_computed(positioned("static", "auto", "auto", "auto", "auto")),
        );
        let mut movers = MoverRegistry::new();
        movers.scan(&mut model, &NoopEffects);
        movers.begin_edit(&model, &[mover, fixed]);
        assert_eq!(movers.active_handles(), &[mover]);
    }
}
