//! Clipboard paste flow
//!
//! Reading the clipboard requires document focus. When the page is not
//! focused, the paste is parked behind a focus hook and resumes when
//! focus returns; there is no timeout, so an abandoned paste simply
//! never fires. A failed or denied read abandons the paste with a log —
//! no partial message reaches the host.

use std::cell::{Cell, RefCell};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::{wasm_log, wasm_warn};

use super::binding::with_session;
use super::error::EditorError;

thread_local! {
    /// Persistent focus listener; armed once per parked paste.
    static FOCUS_HOOK: RefCell<Option<Closure<dyn FnMut()>>> = RefCell::new(None);
    static FOCUS_ARMED: Cell<bool> = Cell::new(false);
}

/// Request a paste at the current selection. The outbound message is
/// sent only after the clipboard has actually been read.
#[wasm_bindgen(js_name = pasteFromClipboard)]
pub fn paste_from_clipboard() {
    let edit_mode = with_session(|s| s.flags().edit_mode).unwrap_or(false);
    if !edit_mode {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let focused = window
        .document()
        .and_then(|d| d.has_focus().ok())
        .unwrap_or(false);
    if focused {
        read_clipboard(&window);
    } else if ensure_focus_hook(&window) {
        FOCUS_ARMED.with(|armed| armed.set(true));
        wasm_log!("paste parked until the document regains focus");
    }
}

/// Install the focus listener once. Subsequent parked pastes reuse it;
/// an unarmed firing is a no-op.
fn ensure_focus_hook(window: &Window) -> bool {
    FOCUS_HOOK.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            let closure = Closure::wrap(Box::new(|| {
                if FOCUS_ARMED.with(|armed| armed.replace(false)) {
                    if let Some(window) = web_sys::window() {
                        read_clipboard(&window);
                    }
                }
            }) as Box<dyn FnMut()>);
            let attached = window
                .add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            if attached.is_err() {
                wasm_warn!("could not attach focus listener; paste unavailable until focused");
                return false;
            }
            *slot = Some(closure);
        }
        true
    })
}

fn read_clipboard(window: &Window) {
    let promise = window.navigator().clipboard().read_text();

    let on_text = Closure::once(|value: JsValue| {
        let text = value.as_string().unwrap_or_default();
        // Markup-looking content is pasted as HTML, everything else as text.
        let is_html = text.trim_start().starts_with('<');
        let _ = with_session(|s| s.post_paste(is_html));
    });
    let on_error = Closure::once(|error: JsValue| {
        let reason = error
            .as_string()
            .unwrap_or_else(|| "permission denied or unavailable".to_string());
        wasm_warn!("{}", EditorError::Clipboard(reason));
    });

    let _ = promise.then2(&on_text, &on_error);
    on_text.forget();
    on_error.forget();
}
