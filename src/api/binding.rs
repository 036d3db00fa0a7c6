//! DOM binding
//!
//! The only layer that touches live DOM nodes. The page scan assigns
//! arena handles to source-mapped elements and keeps the handle-to-node
//! back-reference table here; the engine below works purely on the model
//! and pushes side effects back through `PageEffects`.

use std::cell::RefCell;
use std::rc::Rc;

use once_cell::sync::OnceCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::bridge::{FlagsCache, HostSink, OutboundMessage};
use crate::dom::{ComputedPosition, NodeHandle, NodeSeed, PageEffects, PageModel};
use crate::models::{EditorFlags, Rect};
use crate::session::EditorSession;
use crate::{wasm_error, wasm_warn};

use super::error::EditorError;

/// Class marking visibly selected elements; the injected stylesheet is
/// the embedder's concern.
const SELECTED_CLASS: &str = "editor-selected";

/// Elements annotated with both source offsets.
const MAPPED_SELECTOR: &str = "[data-code-start][data-code-end]";

const CODE_START_ATTR: &str = "data-code-start";
const CODE_END_ATTR: &str = "data-code-end";
const SESSION_ID_ATTR: &str = "data-editor-session";

#[wasm_bindgen]
extern "C" {
    /// Host-injected global receiving one serialized `{type, data}`
    /// envelope per call.
    #[wasm_bindgen(js_name = editorHostPost)]
    fn editor_host_post(payload: &str);
}

thread_local! {
    static SESSION: RefCell<Option<EditorSession>> = RefCell::new(None);
    static PAGE: Rc<DomPage> = Rc::new(DomPage::default());
}

/// Handle-to-node back-reference table for the current page build.
///
/// Holds plain JS references, never engine state; replacing the table on
/// rebuild is what lets removed nodes be collected.
#[derive(Default)]
pub(crate) struct DomPage {
    elements: RefCell<Vec<HtmlElement>>,
}

impl DomPage {
    pub fn set_elements(&self, elements: Vec<HtmlElement>) {
        *self.elements.borrow_mut() = elements;
    }

    pub fn element(&self, handle: NodeHandle) -> Option<HtmlElement> {
        self.elements.borrow().get(handle.0 as usize).cloned()
    }

    pub fn handle_of(&self, element: &Element) -> Option<NodeHandle> {
        self.elements
            .borrow()
            .iter()
            .position(|e| e.is_same_node(Some(element.as_ref())))
            .map(|i| NodeHandle(i as u32))
    }

    /// Current bounding boxes of all tracked elements, zoom-normalized.
    pub fn bounding_boxes(&self, zoom: f64) -> Vec<(NodeHandle, Rect)> {
        self.elements
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, el)| (NodeHandle(i as u32), client_rect(el, zoom)))
            .collect()
    }
}

impl PageEffects for Rc<DomPage> {
    fn write_style(&self, handle: NodeHandle, css_text: &str) {
        if let Some(element) = self.element(handle) {
            element.style().set_css_text(css_text);
        }
    }

    fn set_selected(&self, handle: NodeHandle, selected: bool) {
        if let Some(element) = self.element(handle) {
            let classes = element.class_list();
            let result = if selected {
                classes.add_1(SELECTED_CLASS)
            } else {
                classes.remove_1(SELECTED_CLASS)
            };
            if result.is_err() {
                wasm_warn!("failed to update selection marker");
            }
        }
    }
}

// ============================================================================
// Session slot
// ============================================================================

pub(crate) fn install_session(session: EditorSession) {
    SESSION.with(|slot| *slot.borrow_mut() = Some(session));
}

pub(crate) fn with_session<R>(
    f: impl FnOnce(&mut EditorSession) -> R,
) -> Result<R, EditorError> {
    SESSION.with(|slot| {
        let mut slot = slot.borrow_mut();
        slot.as_mut().map(f).ok_or(EditorError::NotInitialized)
    })
}

pub(crate) fn page() -> Rc<DomPage> {
    PAGE.with(|p| p.clone())
}

// ============================================================================
// Host transport and flag persistence
// ============================================================================

/// Posts outbound envelopes through the host-injected global.
pub(crate) struct HostMessageSink;

impl HostSink for HostMessageSink {
    fn post(&self, message: &OutboundMessage) {
        match serde_json::to_string(message) {
            Ok(payload) => editor_host_post(&payload),
            Err(e) => wasm_error!("failed to serialize outbound message: {}", e),
        }
    }
}

/// Flag record persisted in `sessionStorage`, keyed by the session id the
/// host stamps on `<body>`.
pub(crate) struct SessionStorageCache {
    key: String,
}

impl SessionStorageCache {
    pub fn from_document(document: &Document) -> Self {
        let id = document
            .body()
            .and_then(|b| b.get_attribute(SESSION_ID_ATTR))
            .unwrap_or_else(|| "default".to_string());
        Self {
            key: format!("html-editor-state:{}", id),
        }
    }
}

impl FlagsCache for SessionStorageCache {
    fn load(&self) -> Option<EditorFlags> {
        let storage = web_sys::window()?.session_storage().ok()??;
        let raw = storage.get_item(&self.key).ok()??;
        match serde_json::from_str(&raw) {
            Ok(flags) => Some(flags),
            Err(e) => {
                wasm_warn!("discarding unreadable cached state: {}", e);
                None
            }
        }
    }

    fn store(&self, flags: &EditorFlags) {
        let Some(storage) = web_sys::window().and_then(|w| w.session_storage().ok().flatten())
        else {
            return;
        };
        if let Ok(raw) = serde_json::to_string(flags) {
            let _ = storage.set_item(&self.key, &raw);
        }
    }
}

// ============================================================================
// Capability probe
// ============================================================================

static STYLE_API_PROBE: OnceCell<bool> = OnceCell::new();

/// One-time probe of the inline styling API. On failure the entire
/// direct-manipulation subsystem stays disabled for the session instead
/// of degrading per gesture.
pub(crate) fn style_api_available(document: &Document) -> bool {
    *STYLE_API_PROBE.get_or_init(|| {
        let Ok(element) = document.create_element("div") else {
            return false;
        };
        let Some(html) = element.dyn_ref::<HtmlElement>() else {
            return false;
        };
        html.style().set_css_text("left: 1px;");
        html.style().css_text().contains("left")
    })
}

// ============================================================================
// Page scan
// ============================================================================

/// Walk the rendered document and build the page model plus the parallel
/// element table. Document order is the contract the host pairs against.
pub(crate) fn scan_document(
    document: &Document,
    zoom: f64,
) -> Result<(PageModel, Vec<HtmlElement>), EditorError> {
    let body = document
        .body()
        .ok_or_else(|| EditorError::Capability("document has no body".to_string()))?;

    let mut model = PageModel::new();
    let mut elements = Vec::new();

    let root_seed = seed_for(&body, None, true, zoom);
    let root = model.push(root_seed);
    elements.push(body.clone());

    walk_children(&body, root, &mut model, &mut elements, zoom);
    Ok((model, elements))
}

fn walk_children(
    parent_element: &Element,
    parent: NodeHandle,
    model: &mut PageModel,
    elements: &mut Vec<HtmlElement>,
    zoom: f64,
) {
    let mut child = parent_element.first_element_child();
    while let Some(element) = child {
        let next = element.next_element_sibling();
        let mapped_parent = match element.dyn_ref::<HtmlElement>() {
            Some(html) if is_fully_annotated(html) => {
                let handle = model.push(seed_for(html, Some(parent), false, zoom));
                elements.push(html.clone());
                handle
            }
            _ => parent,
        };
        walk_children(&element, mapped_parent, model, elements, zoom);
        child = next;
    }
}

fn is_fully_annotated(element: &HtmlElement) -> bool {
    let start = element.has_attribute(CODE_START_ATTR);
    let end = element.has_attribute(CODE_END_ATTR);
    if start != end {
        wasm_warn!(
            "<{}> carries only one source offset; skipping",
            element.tag_name().to_lowercase()
        );
    }
    start && end
}

fn seed_for(element: &HtmlElement, parent: Option<NodeHandle>, is_root: bool, zoom: f64) -> NodeSeed {
    let tag = element.tag_name().to_lowercase();
    let mut seed = if is_root {
        NodeSeed::root(tag)
    } else {
        NodeSeed::new(tag, parent)
    };
    seed = seed
        .with_offsets(
            offset_attribute(element, CODE_START_ATTR),
            offset_attribute(element, CODE_END_ATTR),
        )
        .with_path(dom_path_for(element))
        .with_bbox(client_rect(element, zoom))
        .with_style(&element.style().css_text())
        .with_computed(computed_position(element));
    seed
}

fn offset_attribute(element: &Element, name: &str) -> Option<usize> {
    let raw = element.get_attribute(name)?;
    match raw.parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            wasm_warn!("ignoring non-numeric {}=\"{}\"", name, raw);
            None
        }
    }
}

fn client_rect(element: &Element, zoom: f64) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(
        rect.left() / zoom,
        rect.top() / zoom,
        rect.right() / zoom,
        rect.bottom() / zoom,
    )
}

fn computed_position(element: &Element) -> ComputedPosition {
    let Some(style) = web_sys::window()
        .and_then(|w| w.get_computed_style(element).ok())
        .flatten()
    else {
        return ComputedPosition::default();
    };
    let read = |property: &str| style.get_property_value(property).unwrap_or_default();
    ComputedPosition {
        position: read("position"),
        left: read("left"),
        right: read("right"),
        top: read("top"),
        bottom: read("bottom"),
    }
}

/// Human-readable element path, e.g. `html > body > div:nth-of-type(2)`.
fn dom_path_for(element: &Element) -> String {
    let mut segments = Vec::new();
    let mut current = Some(element.clone());
    while let Some(el) = current {
        let tag = el.tag_name().to_lowercase();
        let segment = if tag == "html" || tag == "body" {
            tag
        } else {
            format!("{}:nth-of-type({})", tag, nth_of_type(&el))
        };
        segments.push(segment);
        current = el.parent_element();
    }
    segments.reverse();
    segments.join(" > ")
}

fn nth_of_type(element: &Element) -> usize {
    let tag = element.tag_name();
    let mut index = 1;
    let mut sibling = element.previous_element_sibling();
    while let Some(el) = sibling {
        if el.tag_name() == tag {
            index += 1;
        }
        sibling = el.previous_element_sibling();
    }
    index
}

/// Resolve a pointer event's target to the nearest mapped element.
pub(crate) fn resolve_target(target: Option<web_sys::EventTarget>) -> Option<NodeHandle> {
    let element: Element = target?.dyn_into().ok()?;
    let mapped = element.closest(MAPPED_SELECTOR).ok()??;
    page().handle_of(&mapped)
}
