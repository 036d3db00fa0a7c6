//! Input coordination
//!
//! One exclusive operation token gates all gestures: a selection drag, a
//! move drag, and a keyboard nudge interval can never overlap. Pointer
//! positions are updated before deltas are computed, and the rectangle
//! selector's frame loop reads through `selector_rect`, which goes dark
//! the instant the token is released.

use crate::dom::NodeHandle;
use crate::models::{ArrowKey, ModifierState, Point, Rect};

/// Pointer travel below this resolves a selection gesture as a click.
const CLICK_TRAVEL_PX: f64 = 3.0;

/// The exclusive current-operation token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationToken {
    #[default]
    Idle,
    Selecting,
    Moving,
}

/// How a finished pointer gesture resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEnd {
    Click {
        target: Option<NodeHandle>,
        additive: bool,
    },
    Band {
        rect: Rect,
        additive: bool,
    },
    Move,
    None,
}

/// Edge transitions of the derived arrow-intent flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowTransition {
    Started,
    Stopped,
    Unchanged,
}

/// Pointer/keyboard gesture state machine.
#[derive(Clone, Debug, Default)]
pub struct InputCoordinator {
    token: OperationToken,
    keyboard_gesture: bool,
    origin: Point,
    current: Point,
    last: Point,
    travel: f64,
    down_target: Option<NodeHandle>,
    additive: bool,
    keys: ModifierState,
}

impl InputCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> OperationToken {
        self.token
    }

    pub fn is_idle(&self) -> bool {
        self.token == OperationToken::Idle
    }

    pub fn is_keyboard_gesture(&self) -> bool {
        self.token == OperationToken::Moving && self.keyboard_gesture
    }

    pub fn keys(&self) -> &ModifierState {
        &self.keys
    }

    pub fn set_modifiers(&mut self, shift: bool, control: bool) {
        self.keys.shift = shift;
        self.keys.control = control;
    }

    pub fn begin_selecting(&mut self, at: Point, target: Option<NodeHandle>, additive: bool) {
        self.token = OperationToken::Selecting;
        self.keyboard_gesture = false;
        self.origin = at;
        self.current = at;
        self.last = at;
        self.travel = 0.0;
        self.down_target = target;
        self.additive = additive;
    }

    pub fn begin_moving(&mut self, at: Point) {
        self.token = OperationToken::Moving;
        self.keyboard_gesture = false;
        self.origin = at;
        self.current = at;
        self.last = at;
        self.travel = 0.0;
        self.down_target = None;
        self.additive = false;
    }

    pub fn begin_keyboard_move(&mut self) {
        self.token = OperationToken::Moving;
        self.keyboard_gesture = true;
    }

    /// Track a pointer move. The current position is updated first; the
    /// delta is computed against the previous position afterwards, within
    /// the same call. Returns `None` while no pointer gesture is held.
    pub fn pointer_move(&mut self, to: Point) -> Option<(f64, f64)> {
        if self.is_idle() || self.keyboard_gesture {
            self.current = to;
            self.last = to;
            return None;
        }
        self.current = to;
        let dx = self.current.x - self.last.x;
        let dy = self.current.y - self.last.y;
        self.last = self.current;
        self.travel = self.travel.max(self.origin.distance_to(&to));
        Some((dx, dy))
    }

    /// True when the drag has travelled mostly horizontally.
    pub fn dominant_axis_horizontal(&self) -> bool {
        (self.current.x - self.origin.x).abs() >= (self.current.y - self.origin.y).abs()
    }

    /// The rubber-band rectangle while a selection gesture is held.
    /// Returns `None` the instant the token is released, which is what
    /// stops the selector's self-rescheduling frame loop.
    pub fn selector_rect(&self) -> Option<Rect> {
        if self.token == OperationToken::Selecting {
            Some(Rect::from_corners(self.origin, self.current))
        } else {
            None
        }
    }

    /// Finalize the pointer gesture and release the token. A keyboard
    /// nudge interval is unaffected; it ends on its own arrow edge.
    pub fn finish_pointer(&mut self) -> GestureEnd {
        match self.token {
            OperationToken::Idle => GestureEnd::None,
            OperationToken::Moving if self.keyboard_gesture => GestureEnd::None,
            OperationToken::Moving => {
                self.token = OperationToken::Idle;
                GestureEnd::Move
            }
            OperationToken::Selecting => {
                self.token = OperationToken::Idle;
                if self.travel < CLICK_TRAVEL_PX {
                    GestureEnd::Click {
                        target: self.down_target.take(),
                        additive: self.additive,
                    }
                } else {
                    GestureEnd::Band {
                        rect: Rect::from_corners(self.origin, self.current),
                        additive: self.additive,
                    }
                }
            }
        }
    }

    /// End a keyboard nudge interval. Returns whether one was active.
    pub fn finish_keyboard(&mut self) -> bool {
        if self.is_keyboard_gesture() {
            self.token = OperationToken::Idle;
            self.keyboard_gesture = false;
            true
        } else {
            false
        }
    }

    /// Record an arrow key edge and report how the derived intent flag
    /// transitioned.
    pub fn set_arrow(&mut self, key: ArrowKey, held: bool) -> ArrowTransition {
        let before = self.keys.arrow_active();
        self.keys.set_arrow(key, held);
        let after = self.keys.arrow_active();
        match (before, after) {
            (false, true) => ArrowTransition::Started,
            (true, false) => ArrowTransition::Stopped,
            _ => ArrowTransition::Unchanged,
        }
    }

    /// Drop any gesture without finalizing it.
    pub fn reset(&mut self) {
        self.token = OperationToken::Idle;
        self.keyboard_gesture = false;
        self.down_target = None;
    }
}
