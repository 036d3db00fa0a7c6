// Selection and protocol scenarios against a full editor session

use std::cell::RefCell;
use std::rc::Rc;

use html_editor_wasm::bridge::{FlagsCache, HostSink, InboundMessage, OutboundMessage};
use html_editor_wasm::dom::{NodeHandle, NodeSeed, PageEffects, PageModel};
use html_editor_wasm::models::{CodeRange, EditorFlags, Rect};
use html_editor_wasm::session::EditorSession;

/// Page side effects are irrelevant to these scenarios.
struct NoopEffects;

impl PageEffects for NoopEffects {
    fn write_style(&self, _handle: NodeHandle, _css_text: &str) {}
    fn set_selected(&self, _handle: NodeHandle, _selected: bool) {}
}

/// Records every outbound envelope for assertions.
#[derive(Default)]
struct RecordingSink {
    sent: Rc<RefCell<Vec<OutboundMessage>>>,
}

impl HostSink for RecordingSink {
    fn post(&self, message: &OutboundMessage) {
        self.sent.borrow_mut().push(message.clone());
    }
}

/// In-memory flag cache.
#[derive(Default)]
struct MemoryCache {
    stored: Rc<RefCell<Option<EditorFlags>>>,
}

impl FlagsCache for MemoryCache {
    fn load(&self) -> Option<EditorFlags> {
        *self.stored.borrow()
    }
    fn store(&self, flags: &EditorFlags) {
        *self.stored.borrow_mut() = Some(*flags);
    }
}

/// Build a session over three mapped elements: A (0,100) containing
/// B (40,60), and a disjoint sibling C (120,200).
fn make_session() -> (
    EditorSession,
    Rc<RefCell<Vec<OutboundMessage>>>,
    NodeHandle,
    NodeHandle,
    NodeHandle,
) {
    make_session_with_flags(None)
}

fn make_session_with_flags(
    flags: Option<EditorFlags>,
) -> (
    EditorSession,
    Rc<RefCell<Vec<OutboundMessage>>>,
    NodeHandle,
    NodeHandle,
    NodeHandle,
) {
    let sent = Rc::new(RefCell::new(Vec::new()));
    let cache = MemoryCache {
        stored: Rc::new(RefCell::new(flags)),
    };
    let mut session = EditorSession::new(
        Box::new(NoopEffects),
        Box::new(RecordingSink { sent: sent.clone() }),
        Box::new(cache),
        true,
    );
    let (model, a, b, c) = make_model();
    session.rebuild(model);
    (session, sent, a, b, c)
}

fn make_model() -> (PageModel, NodeHandle, NodeHandle, NodeHandle) {
    let mut model = PageModel::new();
    let root = model.push(NodeSeed::root("body"));
    let a = model.push(
        NodeSeed::new("div", Some(root))
            .with_range(0, 100)
            .with_path("html > body > div:nth-of-type(1)")
            .with_bbox(Rect::new(0.0, 0.0, 200.0, 100.0)),
    );
    let b = model.push(
        NodeSeed::new("span", Some(a))
            .with_range(40, 60)
            .with_path("html > body > div:nth-of-type(1) > span:nth-of-type(1)")
            .with_bbox(Rect::new(20.0, 20.0, 80.0, 40.0)),
    );
    let c = model.push(
        NodeSeed::new("div", Some(root))
            .with_range(120, 200)
            .with_path("html > body > div:nth-of-type(2)")
            .with_bbox(Rect::new(0.0, 150.0, 200.0, 250.0)),
    );
    (model, a, b, c)
}

fn selected_ranges(session: &EditorSession) -> Vec<CodeRange> {
    session.selection().ranges(session.model())
}

#[test]
fn test_nested_selection_scenario() {
    let (mut session, _sent, a, b, c) = make_session();

    assert!(session.select(a, true));
    assert!(!session.select(b, true));
    assert_eq!(session.selection().members(), &[a]);

    assert!(session.select(c, true));
    assert_eq!(session.selection().members(), &[a, c]);
}

#[test]
fn test_select_deselect_round_trip_is_idempotent() {
    let (mut session, _sent, a, _b, c) = make_session();
    session.select(a, true);
    let before = session.selection().members().to_vec();

    session.select(c, true);
    session.deselect(c);
    assert_eq!(session.selection().members(), before.as_slice());
}

#[test]
fn test_selection_broadcast_respects_link_mode() {
    let mut flags = EditorFlags::default();
    flags.link_code = false;
    let (mut session, sent, a, _b, c) = make_session_with_flags(Some(flags));

    session.select(a, true);
    let selects = |sent: &Rc<RefCell<Vec<OutboundMessage>>>| {
        sent.borrow()
            .iter()
            .filter(|m| matches!(m, OutboundMessage::Select(_)))
            .count()
    };
    assert_eq!(selects(&sent), 0);

    session.set_link_code(true);
    session.select(c, true);
    assert_eq!(selects(&sent), 1);
}

#[test]
fn test_suppressed_broadcast_still_changes_selection() {
    let (mut session, sent, a, _b, _c) = make_session();
    session.select(a, false);
    assert!(session.selection().is_selected(a));
    assert!(sent
        .borrow()
        .iter()
        .all(|m| !matches!(m, OutboundMessage::Select(_))));
}

#[test]
fn test_inbound_select_resolves_deepest_match() {
    // Elements (0,100) and nested (40,60): a host range of (40,60) must
    // land on the nested element, not the enclosing container.
    let (mut session, _sent, _a, b, _c) = make_session();
    session.handle_inbound(InboundMessage::Select(vec![CodeRange::new(40, 60)]));
    assert_eq!(session.selection().members(), &[b]);
}

#[test]
fn test_inbound_select_replaces_prior_selection() {
    let (mut session, _sent, a, _b, c) = make_session();
    session.select(a, true);
    session.handle_inbound(InboundMessage::Select(vec![CodeRange::new(130, 140)]));
    assert_eq!(session.selection().members(), &[c]);
}

#[test]
fn test_inbound_select_ignores_unmatched_ranges() {
    let (mut session, _sent, _a, _b, c) = make_session();
    session.handle_inbound(InboundMessage::Select(vec![
        CodeRange::new(500, 600),
        CodeRange::new(120, 200),
    ]));
    assert_eq!(session.selection().members(), &[c]);
}

#[test]
fn test_inbound_code_ranges_rebind_positionally() {
    let (mut session, _sent, a, b, c) = make_session();
    session.handle_inbound(InboundMessage::CodeRanges(vec![
        CodeRange::new(0, 90),
        CodeRange::new(30, 50),
        CodeRange::new(110, 190),
    ]));
    let model = session.model();
    assert_eq!(model.get(a).unwrap().range, Some(CodeRange::new(0, 90)));
    assert_eq!(model.get(b).unwrap().range, Some(CodeRange::new(30, 50)));
    assert_eq!(model.get(c).unwrap().range, Some(CodeRange::new(110, 190)));
}

#[test]
fn test_inbound_code_ranges_mismatch_pairs_prefix() {
    let (mut session, _sent, a, b, c) = make_session();
    session.handle_inbound(InboundMessage::CodeRanges(vec![CodeRange::new(5, 95)]));
    let model = session.model();
    assert_eq!(model.get(a).unwrap().range, Some(CodeRange::new(5, 95)));
    assert_eq!(model.get(b).unwrap().range, Some(CodeRange::new(40, 60)));
    assert_eq!(model.get(c).unwrap().range, Some(CodeRange::new(120, 200)));
}

#[test]
fn test_inbound_state_overwrites_flags() {
    let (mut session, _sent, _a, _b, _c) = make_session();
    let pushed = EditorFlags {
        zoom: 2.0,
        link_code: false,
        edit_mode: false,
        preview_mode: true,
    };
    session.handle_inbound(InboundMessage::State(pushed));
    assert_eq!(session.flags(), pushed);
}

#[test]
fn test_delete_copy_cut_carry_selection_ranges() {
    let (mut session, sent, a, _b, c) = make_session();
    session.select(a, false);
    session.select(c, false);

    session.delete_selection();
    session.copy_selection();
    session.cut_selection();

    let messages = sent.borrow();
    let expect_ranges = |message: &OutboundMessage| {
        let refs = match message {
            OutboundMessage::Delete(r) | OutboundMessage::Copy(r) | OutboundMessage::Cut(r) => r,
            other => panic!("unexpected message {:?}", other),
        };
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].code_range, CodeRange::new(0, 100));
        assert_eq!(refs[1].code_range, CodeRange::new(120, 200));
    };
    assert_eq!(messages.len(), 3);
    for message in messages.iter() {
        expect_ranges(message);
    }
}

#[test]
fn test_commands_with_empty_selection_send_nothing() {
    let (mut session, sent, _a, _b, _c) = make_session();
    session.delete_selection();
    session.copy_selection();
    session.cut_selection();
    assert!(sent.borrow().is_empty());
}

#[test]
fn test_paste_targets_last_selected() {
    let (mut session, sent, a, _b, c) = make_session();
    session.select(a, false);
    session.select(c, false);
    session.post_paste(true);

    let messages = sent.borrow();
    match messages.last().unwrap() {
        OutboundMessage::Paste(intent) => {
            assert!(intent.is_html);
            assert_eq!(intent.code_range, CodeRange::new(120, 200));
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_paste_with_no_selection_falls_back_to_zero_range() {
    // The root carries no source annotation in this fixture.
    let (mut session, sent, _a, _b, _c) = make_session();
    session.post_paste(false);
    let received = sent.borrow();
    match received.last().unwrap() {
        OutboundMessage::Paste(intent) => {
            assert!(!intent.is_html);
            assert_eq!(intent.code_range, CodeRange::new(0, 0));
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_refresh_request() {
    let (mut session, sent, _a, _b, _c) = make_session();
    session.request_refresh();
    assert!(matches!(
        sent.borrow().last().unwrap(),
        OutboundMessage::Refresh(_)
    ));
}

#[test]
fn test_local_flag_change_posts_state() {
    let (mut session, sent, _a, _b, _c) = make_session();
    session.set_zoom(1.5);
    match sent.borrow().last().unwrap() {
        OutboundMessage::State(flags) => assert_eq!(flags.zoom, 1.5),
        other => panic!("unexpected message {:?}", other),
    }
    assert_eq!(session.flags().zoom, 1.5);
}

#[test]
fn test_invalid_zoom_is_rejected() {
    let (mut session, _sent, _a, _b, _c) = make_session();
    session.set_zoom(0.0);
    session.set_zoom(-2.0);
    session.set_zoom(f64::NAN);
    assert_eq!(session.flags().zoom, 1.0);
}

#[test]
fn test_flags_restored_from_cache() {
    let cached = EditorFlags {
        zoom: 1.25,
        link_code: false,
        edit_mode: true,
        preview_mode: false,
    };
    let (session, _sent, _a, _b, _c) = make_session_with_flags(Some(cached));
    assert_eq!(session.flags(), cached);
}

#[test]
fn test_rebuild_drops_selection() {
    let (mut session, _sent, a, _b, _c) = make_session();
    session.select(a, true);
    let (model, _, _, _) = make_model();
    session.rebuild(model);
    assert!(session.selection().is_empty());
    assert_eq!(selected_ranges(&session).len(), 0);
}
