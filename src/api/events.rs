//! JavaScript-facing entry points
//!
//! The embedding page forwards raw DOM events and host messages here.
//! Pointer coordinates are divided by the current zoom factor before the
//! engine sees them, except for events originating inside the editor's
//! own injected UI surfaces, which render at zoom 1.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, Window};

use crate::bridge::{EditorEvent, EditorObserver, InboundMessage};
use crate::models::Point;
use crate::{wasm_info, wasm_warn};

use super::binding::{
    install_session, page, resolve_target, scan_document, style_api_available, with_session,
    HostMessageSink, SessionStorageCache,
};
use super::clipboard;
use super::helpers::{deserialize, serialize};
use crate::session::EditorSession;

/// Attribute marking the editor's own injected UI surfaces.
const OVERLAY_ATTR: &str = "data-editor-ui";

// ============================================================================
// Lifecycle
// ============================================================================

/// Build the session: probe capabilities, restore cached flags, scan the
/// document, and install the session slot.
#[wasm_bindgen]
pub fn initialize() -> Result<(), JsValue> {
    let window = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window in this environment"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document in this environment"))?;

    let started = now_ms(&window);
    let movers_enabled = style_api_available(&document);
    if !movers_enabled {
        wasm_warn!("inline styling API unavailable; direct manipulation disabled for this session");
    }

    let cache = SessionStorageCache::from_document(&document);
    let mut session = EditorSession::new(
        Box::new(page()),
        Box::new(HostMessageSink),
        Box::new(cache),
        movers_enabled,
    );

    let zoom = session.flags().zoom;
    let (model, elements) = scan_document(&document, zoom)?;
    page().set_elements(elements);
    session.rebuild(model);
    if let (Some(start), Some(end)) = (started, now_ms(&window)) {
        session.record_timing("scan", end - start);
    }

    install_session(session);
    wasm_info!("editor engine ready");
    Ok(())
}

/// Rescan the document after a host-driven DOM patch.
#[wasm_bindgen(js_name = rebuildIndex)]
pub fn rebuild_index() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document in this environment"))?;
    let zoom = with_session(|s| s.flags().zoom)?;
    let (model, elements) = scan_document(&document, zoom)?;
    page().set_elements(elements);
    with_session(move |s| s.rebuild(model))?;
    Ok(())
}

// ============================================================================
// Pointer events
// ============================================================================

#[wasm_bindgen(js_name = onPointerDown)]
pub fn on_pointer_down(event: MouseEvent) {
    if event_in_overlay(event.as_ref()) {
        // The editor's own UI owns its pointer interactions.
        return;
    }
    let control = event.ctrl_key() || event.meta_key();
    let target = resolve_target(event.target());
    let (x, y) = (event.client_x() as f64, event.client_y() as f64);

    // Boxes go stale as soon as anything moves; refresh them at gesture
    // start so rubber-band hit testing sees current geometry.
    refresh_geometry();

    let _ = with_session(|s| {
        let at = Point::new(x, y).unscaled(s.flags().zoom);
        s.pointer_down(at, target, control);
    });
}

#[wasm_bindgen(js_name = onPointerMove)]
pub fn on_pointer_move(event: MouseEvent) {
    let overlay = event_in_overlay(event.as_ref());
    let shift = event.shift_key();
    let (x, y) = (event.client_x() as f64, event.client_y() as f64);
    let _ = with_session(|s| {
        let zoom = if overlay { 1.0 } else { s.flags().zoom };
        s.pointer_move(Point::new(x, y).unscaled(zoom), shift);
    });
}

#[wasm_bindgen(js_name = onPointerUp)]
pub fn on_pointer_up(event: MouseEvent) {
    let overlay = event_in_overlay(event.as_ref());
    let (x, y) = (event.client_x() as f64, event.client_y() as f64);
    let _ = with_session(|s| {
        let zoom = if overlay { 1.0 } else { s.flags().zoom };
        s.pointer_up(Point::new(x, y).unscaled(zoom));
    });
}

/// One tick of the rubber-band redraw loop. Returns the band rectangle,
/// or `null` once the selection gesture has ended — the caller must stop
/// rescheduling at that point.
#[wasm_bindgen(js_name = selectorFrame)]
pub fn selector_frame() -> JsValue {
    match with_session(|s| s.selector_rect()) {
        Ok(Some(rect)) => serialize(&rect, "selector rect").unwrap_or(JsValue::NULL),
        _ => JsValue::NULL,
    }
}

// ============================================================================
// Keyboard events
// ============================================================================

#[wasm_bindgen(js_name = onKeyDown)]
pub fn on_key_down(event: KeyboardEvent) {
    let key = event.key();
    let control = event.ctrl_key() || event.meta_key();
    let shift = event.shift_key();
    if control && key.eq_ignore_ascii_case("v") {
        clipboard::paste_from_clipboard();
        return;
    }
    let _ = with_session(|s| s.key_down(&key, control, shift));
}

#[wasm_bindgen(js_name = onKeyUp)]
pub fn on_key_up(event: KeyboardEvent) {
    let key = event.key();
    let _ = with_session(|s| s.key_up(&key));
}

// ============================================================================
// Commands
// ============================================================================

#[wasm_bindgen(js_name = deleteSelection)]
pub fn delete_selection() {
    let _ = with_session(|s| s.delete_selection());
}

#[wasm_bindgen(js_name = copySelection)]
pub fn copy_selection() {
    let _ = with_session(|s| s.copy_selection());
}

#[wasm_bindgen(js_name = cutSelection)]
pub fn cut_selection() {
    let _ = with_session(|s| s.cut_selection());
}

#[wasm_bindgen(js_name = deselectAll)]
pub fn deselect_all() {
    let _ = with_session(|s| s.deselect_all());
}

#[wasm_bindgen(js_name = requestRefresh)]
pub fn request_refresh() {
    let _ = with_session(|s| s.request_refresh());
}

#[wasm_bindgen(js_name = setZoom)]
pub fn set_zoom(zoom: f64) {
    let _ = with_session(|s| s.set_zoom(zoom));
}

#[wasm_bindgen(js_name = setLinkCode)]
pub fn set_link_code(enabled: bool) {
    let _ = with_session(|s| s.set_link_code(enabled));
}

#[wasm_bindgen(js_name = setEditMode)]
pub fn set_edit_mode(enabled: bool) {
    let _ = with_session(|s| s.set_edit_mode(enabled));
}

#[wasm_bindgen(js_name = setPreviewMode)]
pub fn set_preview_mode(enabled: bool) {
    let _ = with_session(|s| s.set_preview_mode(enabled));
}

// ============================================================================
// Host messages and in-page subscriptions
// ============================================================================

/// Dispatch one inbound `{type, data}` envelope from the host.
#[wasm_bindgen(js_name = onHostMessage)]
pub fn on_host_message(message: JsValue) -> Result<(), JsValue> {
    let message: InboundMessage = deserialize(message, "inbound host message")?;
    with_session(|s| s.handle_inbound(message))?;
    Ok(())
}

/// Subscribe an in-page listener to engine events. The callback receives
/// one `{event, ...}` object per notification.
#[wasm_bindgen(js_name = subscribeEvents)]
pub fn subscribe_events(callback: Function) -> Result<(), JsValue> {
    with_session(|s| s.subscribe(Box::new(JsObserver { callback })))?;
    Ok(())
}

struct JsObserver {
    callback: Function,
}

impl EditorObserver for JsObserver {
    fn on_event(&self, event: &EditorEvent) {
        if let Ok(payload) = serialize(event, "editor event") {
            let _ = self.callback.call1(&JsValue::NULL, &payload);
        }
    }
}

// ============================================================================
// Internals
// ============================================================================

fn event_in_overlay(event: &Event) -> bool {
    let path = event.composed_path();
    for entry in path.iter() {
        if let Some(element) = entry.dyn_ref::<Element>() {
            if element.has_attribute(OVERLAY_ATTR) {
                return true;
            }
        }
    }
    false
}

fn refresh_geometry() {
    let Ok(zoom) = with_session(|s| s.flags().zoom) else {
        return;
    };
    let boxes = page().bounding_boxes(zoom);
    let _ = with_session(|s| {
        for (handle, bbox) in boxes {
            s.update_bbox(handle, bbox);
        }
    });
}

fn now_ms(window: &Window) -> Option<f64> {
    window.performance().map(|p| p.now())
}
