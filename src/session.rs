//! Editor session
//!
//! The composition root. The session owns every subsystem — page model,
//! selection, pending edit batch, mover registry, input coordinator,
//! transport, observers — and passes collaborators between them
//! explicitly. All state transitions run on the UI event loop; exactly
//! one gesture may hold the operation token at a time.

use crate::bridge::{
    EditorEvent, EditorObserver, EmptyPayload, FlagsCache, HostSink, ObserverRegistry,
    OutboundMessage, PasteIntent, RangeRef, TransportBridge,
};
use crate::bridge::messages::EditEntry;
use crate::dom::{NodeHandle, PageEffects, PageModel};
use crate::editing::gesture::ArrowTransition;
use crate::editing::{
    GestureEnd, InputCoordinator, MoverRegistry, OperationToken, PendingEditBatch, SelectionState,
};
use crate::models::{ArrowKey, CodeRange, EditorFlags, OperationKind, Point, Rect};
use crate::utils::GestureTimer;

/// Keyboard nudge step in pixels, and the larger step with Shift held.
const NUDGE_STEP: f64 = 1.0;
const NUDGE_STEP_FAST: f64 = 10.0;

/// One editing session over one rendered document.
pub struct EditorSession {
    model: PageModel,
    selection: SelectionState,
    batch: PendingEditBatch,
    movers: MoverRegistry,
    input: InputCoordinator,
    transport: TransportBridge,
    observers: ObserverRegistry,
    effects: Box<dyn PageEffects>,
    flags: EditorFlags,
    /// Direct manipulation is disabled for the whole session when the
    /// styling API probe fails at startup.
    movers_enabled: bool,
    timer: GestureTimer,
}

impl EditorSession {
    pub fn new(
        effects: Box<dyn PageEffects>,
        sink: Box<dyn HostSink>,
        cache: Box<dyn FlagsCache>,
        movers_enabled: bool,
    ) -> Self {
        let transport = TransportBridge::new(sink, cache);
        let flags = transport.restore_flags().unwrap_or_default();
        log::info!(
            "session start: zoom {}, link {}, edit {}, movers {}",
            flags.zoom,
            flags.link_code,
            flags.edit_mode,
            movers_enabled
        );
        Self {
            model: PageModel::new(),
            selection: SelectionState::new(),
            batch: PendingEditBatch::new(),
            movers: MoverRegistry::new(),
            input: InputCoordinator::new(),
            transport,
            observers: ObserverRegistry::new(),
            effects,
            flags,
            movers_enabled,
            timer: GestureTimer::new(),
        }
    }

    pub fn flags(&self) -> EditorFlags {
        self.flags
    }

    pub fn model(&self) -> &PageModel {
        &self.model
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn movers_enabled(&self) -> bool {
        self.movers_enabled
    }

    pub fn operation_token(&self) -> OperationToken {
        self.input.token()
    }

    pub fn pending_edit_count(&self) -> usize {
        self.batch.entry_count()
    }

    pub fn subscribe(&mut self, observer: Box<dyn EditorObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn record_timing(&mut self, phase: &str, duration_ms: f64) {
        self.timer.record(phase, duration_ms);
        if let Some(average) = self.timer.average_ms(phase) {
            log::debug!("{}: {:.1}ms (avg {:.1}ms)", phase, duration_ms, average);
        }
    }

    // ========================================================================
    // Page lifecycle
    // ========================================================================

    /// Install a freshly scanned page model. Any active gesture is
    /// finalized and flushed against the old model first; the selection is
    /// dropped because every handle is invalidated. The host re-resolves
    /// selection afterwards via an inbound `select`.
    pub fn rebuild(&mut self, model: PageModel) {
        self.finalize_active_gesture();
        self.selection.reset();
        self.model = model;
        self.movers = MoverRegistry::new();
        if self.movers_enabled {
            let count = self.movers.scan(&mut self.model, self.effects.as_ref());
            self.observers
                .emit(&EditorEvent::MoversRescanned { count });
        }
        log::info!(
            "page model rebuilt: {} mapped elements",
            self.model.mapped_handles().len()
        );
    }

    /// Refresh one element's cached bounding box (boxes go stale as soon
    /// as anything moves; the embedder refreshes them at gesture start).
    pub fn update_bbox(&mut self, handle: NodeHandle, bbox: Rect) {
        self.model.update_bbox(handle, bbox);
    }

    // ========================================================================
    // Selection surface
    // ========================================================================

    pub fn select(&mut self, handle: NodeHandle, broadcast: bool) -> bool {
        let changed = self
            .selection
            .select(handle, &self.model, &self.batch, self.effects.as_ref());
        if changed {
            self.after_selection_change(broadcast);
        }
        changed
    }

    pub fn deselect(&mut self, handle: NodeHandle) -> bool {
        let locked = self.locked_handles();
        let changed = self.selection.deselect(handle, &locked, self.effects.as_ref());
        if changed {
            self.after_selection_change(true);
        }
        changed
    }

    pub fn deselect_all(&mut self) -> bool {
        let locked = self.locked_handles();
        let changed = self.selection.deselect_all(&locked, self.effects.as_ref());
        if changed {
            self.after_selection_change(true);
        }
        changed
    }

    pub fn toggle(&mut self, handle: NodeHandle) -> bool {
        let locked = self.locked_handles();
        let changed = self.selection.toggle(
            handle,
            &self.model,
            &self.batch,
            &locked,
            self.effects.as_ref(),
        );
        if changed {
            self.after_selection_change(true);
        }
        changed
    }

    /// Elements that cannot be deselected because the active gesture is
    /// editing them.
    fn locked_handles(&self) -> Vec<NodeHandle> {
        if self.input.token() == OperationToken::Moving {
            self.movers.active_handles().to_vec()
        } else {
            Vec::new()
        }
    }

    fn after_selection_change(&mut self, broadcast: bool) {
        let ranges = self.selection.ranges(&self.model);
        self.observers.emit(&EditorEvent::SelectionChanged {
            ranges: ranges.clone(),
        });
        if broadcast && self.flags.link_code {
            self.transport.send(&OutboundMessage::Select(
                ranges.into_iter().map(RangeRef::from).collect(),
            ));
        }
    }

    // ========================================================================
    // Pointer gestures
    // ========================================================================

    /// Pointer down over the page. Decides between a move gesture (the
    /// pointer is over a selected, mover-eligible element and Control is
    /// not held) and a selection gesture.
    pub fn pointer_down(&mut self, at: Point, target: Option<NodeHandle>, control: bool) {
        if !self.flags.edit_mode || !self.input.is_idle() {
            return;
        }
        let over_selected_mover = target
            .map(|h| {
                self.movers_enabled && self.movers.is_eligible(h) && self.selection.is_selected(h)
            })
            .unwrap_or(false);

        if over_selected_mover && !control {
            self.input.begin_moving(at);
            self.movers.begin_edit(&self.model, self.selection.members());
            log::debug!("move gesture: {} movers", self.movers.active_handles().len());
        } else {
            self.input.begin_selecting(at, target, control);
        }
    }

    /// Pointer move. The coordinator updates the current position before
    /// the delta is computed; a held Shift locks the drag to its dominant
    /// axis.
    pub fn pointer_move(&mut self, to: Point, shift: bool) {
        let Some((dx, dy)) = self.input.pointer_move(to) else {
            return;
        };
        if self.input.token() != OperationToken::Moving {
            return;
        }
        if shift {
            let horizontal = self.input.dominant_axis_horizontal();
            self.movers
                .move_constrained(&mut self.model, self.effects.as_ref(), horizontal, dx, dy);
        } else {
            self.movers
                .move_by(&mut self.model, self.effects.as_ref(), dx, dy);
        }
    }

    /// Pointer up: finalize the gesture, release the token, and flush any
    /// pending edits.
    pub fn pointer_up(&mut self, at: Point) {
        self.input.pointer_move(at);
        match self.input.finish_pointer() {
            GestureEnd::Click { target, additive } => {
                if let Some(target) = target {
                    let locked = self.locked_handles();
                    let changed = self.selection.select_by_click(
                        target,
                        additive,
                        &self.model,
                        &self.batch,
                        &locked,
                        self.effects.as_ref(),
                    );
                    if changed {
                        self.after_selection_change(true);
                    }
                }
            }
            GestureEnd::Band { rect, additive } => {
                let locked = self.locked_handles();
                let changed = self.selection.select_by_rect(
                    &rect,
                    additive,
                    &self.model,
                    &self.batch,
                    &locked,
                    self.effects.as_ref(),
                );
                if changed {
                    self.after_selection_change(true);
                }
            }
            GestureEnd::Move => {
                self.movers
                    .end_edit(&self.model, &mut self.batch, OperationKind::Move);
            }
            GestureEnd::None => {}
        }
        if !self.batch.is_empty() {
            self.flush_edits();
        }
    }

    /// The rubber-band rectangle for the selector's frame loop, `None` as
    /// soon as the selecting token is released.
    pub fn selector_rect(&self) -> Option<Rect> {
        self.input.selector_rect()
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Key down. Arrow keys start, drive, and (via `key_up`) end keyboard
    /// nudge gestures; the remaining commands act immediately.
    pub fn key_down(&mut self, key: &str, control: bool, shift: bool) {
        self.input.set_modifiers(shift, control);

        if let Some(arrow) = ArrowKey::from_key(key) {
            let transition = self.input.set_arrow(arrow, true);
            if transition == ArrowTransition::Started && self.can_start_keyboard_gesture() {
                self.input.begin_keyboard_move();
                self.movers.begin_edit(&self.model, self.selection.members());
                log::debug!("nudge gesture: {} movers", self.movers.active_handles().len());
            }
            if self.input.is_keyboard_gesture() {
                let step = if shift { NUDGE_STEP_FAST } else { NUDGE_STEP };
                let (dx, dy) = arrow.delta(step);
                self.movers
                    .move_by(&mut self.model, self.effects.as_ref(), dx, dy);
            }
            return;
        }

        match key {
            "Escape" => self.cancel(),
            "Delete" | "Backspace" => self.delete_selection(),
            _ if control && key.eq_ignore_ascii_case("c") => self.copy_selection(),
            _ if control && key.eq_ignore_ascii_case("x") => self.cut_selection(),
            _ => {}
        }
    }

    /// Key up. Releasing the last arrow (intent goes inactive) ends the
    /// nudge gesture and flushes its edits.
    pub fn key_up(&mut self, key: &str) {
        let Some(arrow) = ArrowKey::from_key(key) else {
            return;
        };
        let transition = self.input.set_arrow(arrow, false);
        if transition == ArrowTransition::Stopped && self.input.finish_keyboard() {
            self.movers
                .end_edit(&self.model, &mut self.batch, OperationKind::Move);
            if !self.batch.is_empty() {
                self.flush_edits();
            }
        }
    }

    fn can_start_keyboard_gesture(&self) -> bool {
        self.flags.edit_mode
            && self.movers_enabled
            && self.input.is_idle()
            && self.movers.any_eligible(self.selection.members())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Escape: finalize whatever gesture is active, clear the selection,
    /// and flush pending edits. Style changes already written to the page
    /// are not rolled back; accumulation just stops.
    pub fn cancel(&mut self) {
        self.finalize_active_gesture();
        self.deselect_all();
        if !self.batch.is_empty() {
            self.flush_edits();
        }
    }

    /// Finalize and flush an in-flight gesture without touching the
    /// selection. Used when the edit gate closes mid-gesture.
    fn finalize_active_gesture(&mut self) {
        if self.input.token() == OperationToken::Moving {
            self.movers
                .end_edit(&self.model, &mut self.batch, OperationKind::Move);
        }
        self.input.reset();
        if !self.batch.is_empty() {
            self.flush_edits();
        }
    }

    pub fn delete_selection(&mut self) {
        let refs = self.selection_refs();
        if refs.is_empty() {
            return;
        }
        self.transport.send(&OutboundMessage::Delete(refs));
    }

    pub fn copy_selection(&mut self) {
        let refs = self.selection_refs();
        if refs.is_empty() {
            return;
        }
        self.transport.send(&OutboundMessage::Copy(refs));
    }

    pub fn cut_selection(&mut self) {
        let refs = self.selection_refs();
        if refs.is_empty() {
            return;
        }
        self.transport.send(&OutboundMessage::Cut(refs));
    }

    /// Announce a paste intent. The target is the last selected element,
    /// falling back to the document root.
    pub fn post_paste(&mut self, is_html: bool) {
        if !self.flags.edit_mode {
            return;
        }
        let code_range = self
            .selection
            .last()
            .and_then(|h| self.model.get(h))
            .and_then(|n| n.range)
            .or_else(|| {
                self.model
                    .root()
                    .and_then(|h| self.model.get(h))
                    .and_then(|n| n.range)
            })
            .unwrap_or(CodeRange::new(0, 0));
        self.transport
            .send(&OutboundMessage::Paste(PasteIntent { is_html, code_range }));
    }

    pub fn request_refresh(&mut self) {
        self.transport.send(&OutboundMessage::Refresh(EmptyPayload {}));
    }

    fn selection_refs(&self) -> Vec<RangeRef> {
        self.selection
            .ranges(&self.model)
            .into_iter()
            .map(RangeRef::from)
            .collect()
    }

    // ========================================================================
    // Flags
    // ========================================================================

    pub fn set_zoom(&mut self, zoom: f64) {
        if !(zoom.is_finite() && zoom > 0.0) {
            return;
        }
        self.flags.zoom = zoom;
        self.flags_changed_locally();
    }

    pub fn set_link_code(&mut self, enabled: bool) {
        self.flags.link_code = enabled;
        self.flags_changed_locally();
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        let closing = self.flags.edit_mode && !enabled;
        self.flags.edit_mode = enabled;
        if closing {
            self.finalize_active_gesture();
        }
        self.flags_changed_locally();
    }

    pub fn set_preview_mode(&mut self, enabled: bool) {
        self.flags.preview_mode = enabled;
        self.flags_changed_locally();
    }

    fn flags_changed_locally(&mut self) {
        self.transport.persist_flags(&self.flags);
        self.observers
            .emit(&EditorEvent::FlagsChanged { flags: self.flags });
    }

    // ========================================================================
    // Inbound messages
    // ========================================================================

    pub fn handle_inbound(&mut self, message: crate::bridge::InboundMessage) {
        use crate::bridge::InboundMessage;
        match message {
            InboundMessage::State(flags) => {
                let closing = self.flags.edit_mode && !flags.edit_mode;
                self.flags = flags;
                if closing {
                    self.finalize_active_gesture();
                }
                // The host copy is authoritative; cache it without echoing.
                self.transport.store_flags(&self.flags);
                self.observers
                    .emit(&EditorEvent::FlagsChanged { flags: self.flags });
            }
            InboundMessage::CodeRanges(ranges) => {
                self.model.assign_ranges(&ranges);
            }
            InboundMessage::Select(ranges) => {
                self.apply_host_selection(&ranges);
            }
        }
    }

    /// Replace the selection with the host's, atomically: one internal
    /// notification for the whole replacement and no echo back to the
    /// host.
    fn apply_host_selection(&mut self, ranges: &[CodeRange]) {
        let locked = self.locked_handles();
        self.selection.deselect_all(&locked, self.effects.as_ref());
        for range in ranges {
            if let Some(handle) = self.model.resolve_containing(range) {
                self.selection
                    .select(handle, &self.model, &self.batch, self.effects.as_ref());
            }
        }
        self.after_selection_change(false);
    }

    // ========================================================================
    // Edit batch
    // ========================================================================

    /// Transmit and clear the pending batch in one synchronous step.
    pub fn flush_edits(&mut self) {
        let drained = self.batch.flush();
        let mut entries = Vec::new();
        for entry in drained {
            let mapped = self
                .model
                .get(entry.handle)
                .and_then(|node| node.range.map(|code_range| (node, code_range)));
            match mapped {
                Some((node, code_range)) => entries.push(EditEntry {
                    element: node.tag.clone(),
                    dom_path: node.dom_path.clone(),
                    code_range,
                    operations: entry.operations,
                }),
                None => log::warn!("dropping edit entry for unmapped element"),
            }
        }
        if entries.is_empty() {
            return;
        }
        let count = entries.len();
        self.transport.send(&OutboundMessage::Edit(entries));
        self.observers.emit(&EditorEvent::EditsFlushed { count });
    }
}
