//! Arena-indexed model of the source-mapped page
//!
//! Rebuilt on demand after host-driven DOM patches. Handles are plain
//! arena indices; a rebuild invalidates all previous handles, which is
//! why selection is re-resolved by the host afterwards.

use crate::models::{CodeRange, Rect};

use super::style::InlineStyle;

/// Stable handle for one source-mapped element within one page build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

/// Resolved computed-style facts captured at scan time, used by the
/// mover eligibility pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedPosition {
    pub position: String,
    pub left: String,
    pub right: String,
    pub top: String,
    pub bottom: String,
}

impl Default for ComputedPosition {
    fn default() -> Self {
        Self {
            position: "static".to_string(),
            left: "auto".to_string(),
            right: "auto".to_string(),
            top: "auto".to_string(),
            bottom: "auto".to_string(),
        }
    }
}

impl ComputedPosition {
    pub fn is_auto(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || trimmed == "auto"
    }
}

/// One record in the page model.
#[derive(Clone, Debug)]
pub struct MappedNode {
    pub tag: String,
    pub dom_path: String,
    pub parent: Option<NodeHandle>,
    pub range: Option<CodeRange>,
    pub bbox: Rect,
    pub style: InlineStyle,
    pub computed: ComputedPosition,
    pub is_root: bool,
}

/// Construction input for one node, filled in by the scanning layer.
#[derive(Clone, Debug)]
pub struct NodeSeed {
    tag: String,
    dom_path: String,
    parent: Option<NodeHandle>,
    code_start: Option<usize>,
    code_end: Option<usize>,
    bbox: Rect,
    style_text: String,
    computed: ComputedPosition,
    is_root: bool,
}

impl NodeSeed {
    pub fn new(tag: impl Into<String>, parent: Option<NodeHandle>) -> Self {
        Self {
            tag: tag.into(),
            dom_path: String::new(),
            parent,
            code_start: None,
            code_end: None,
            bbox: Rect::default(),
            style_text: String::new(),
            computed: ComputedPosition::default(),
            is_root: false,
        }
    }

    /// The root container (normally `body`); excluded from selection.
    pub fn root(tag: impl Into<String>) -> Self {
        let mut seed = Self::new(tag, None);
        seed.is_root = true;
        seed
    }

    pub fn with_offsets(mut self, start: Option<usize>, end: Option<usize>) -> Self {
        self.code_start = start;
        self.code_end = end;
        self
    }

    pub fn with_range(self, start: usize, end: usize) -> Self {
        self.with_offsets(Some(start), Some(end))
    }

    pub fn with_path(mut self, dom_path: impl Into<String>) -> Self {
        self.dom_path = dom_path.into();
        self
    }

    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn with_style(mut self, style_text: impl Into<String>) -> Self {
        self.style_text = style_text.into();
        self
    }

    pub fn with_computed(mut self, computed: ComputedPosition) -> Self {
        self.computed = computed;
        self
    }
}

/// Side-effect seam to the live page.
///
/// The engine mutates its own model and pushes the result through this
/// trait; the JS-facing layer owns the handle-to-node table and performs
/// the actual DOM writes. Tests substitute a recording fake.
pub trait PageEffects {
    fn write_style(&self, handle: NodeHandle, css_text: &str);
    fn set_selected(&self, handle: NodeHandle, selected: bool);
}

/// The live list of source-mapped elements, in document order.
#[derive(Clone, Debug, Default)]
pub struct PageModel {
    nodes: Vec<MappedNode>,
}

impl PageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its handle. An element annotated with only
    /// one of the two source offsets is recorded but treated as unmapped.
    pub fn push(&mut self, seed: NodeSeed) -> NodeHandle {
        let range = match (seed.code_start, seed.code_end) {
            (Some(start), Some(end)) => Some(CodeRange::new(start, end)),
            (None, None) => None,
            _ => {
                log::debug!(
                    "element <{}> carries a partial source annotation; excluded from mapping",
                    seed.tag
                );
                None
            }
        };
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(MappedNode {
            tag: seed.tag,
            dom_path: seed.dom_path,
            parent: seed.parent,
            range,
            bbox: seed.bbox,
            style: InlineStyle::parse(&seed.style_text),
            computed: seed.computed,
            is_root: seed.is_root,
        });
        handle
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&MappedNode> {
        self.nodes.get(handle.0 as usize)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut MappedNode> {
        self.nodes.get_mut(handle.0 as usize)
    }

    pub fn root(&self) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|n| n.is_root)
            .map(|i| NodeHandle(i as u32))
    }

    /// Handles of all source-mapped nodes, in document order.
    pub fn mapped_handles(&self) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.range.is_some())
            .map(|(i, _)| NodeHandle(i as u32))
            .collect()
    }

    /// True if `ancestor` is a proper ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.get(node).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).and_then(|n| n.parent);
        }
        false
    }

    /// True if the two nodes are distinct and in an ancestor/descendant
    /// relationship (either direction).
    pub fn related(&self, a: NodeHandle, b: NodeHandle) -> bool {
        a != b && (self.is_ancestor(a, b) || self.is_ancestor(b, a))
    }

    /// Re-bind source ranges positionally: the Nth inbound range pairs
    /// with the Nth mapped node in document order. A count mismatch pairs
    /// the overlapping prefix and logs a warning; the host may be
    /// mid-update.
    pub fn assign_ranges(&mut self, ranges: &[CodeRange]) -> usize {
        let mapped = self.mapped_handles();
        if mapped.len() != ranges.len() {
            log::warn!(
                "code range count mismatch: {} inbound vs {} mapped elements; pairing prefix",
                ranges.len(),
                mapped.len()
            );
        }
        let paired = mapped.len().min(ranges.len());
        for (handle, range) in mapped.into_iter().zip(ranges.iter()) {
            if let Some(node) = self.get_mut(handle) {
                node.range = Some(*range);
            }
        }
        paired
    }

    /// Find the most specific mapped node whose range fully contains
    /// `target`, scanning document order from the end so the deepest
    /// match wins.
    pub fn resolve_containing(&self, target: &CodeRange) -> Option<NodeHandle> {
        self.mapped_handles()
            .into_iter()
            .rev()
            .find(|&h| {
                self.get(h)
                    .and_then(|n| n.range)
                    .map(|r| r.contains_range(target))
                    .unwrap_or(false)
            })
    }

    pub fn update_bbox(&mut self, handle: NodeHandle, bbox: Rect) {
        if let Some(node) = self.get_mut(handle) {
            node.bbox = bbox;
        }
    }
}
