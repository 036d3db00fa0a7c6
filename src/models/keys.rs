//! Keyboard modifier and arrow-key state
//!
//! Arrow keys drive keyboard nudge gestures. The derived `arrow_active`
//! flag captures directional intent: holding both keys of an opposing
//! pair cancels out, holding one of either pair counts.

/// One of the four arrow keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
    Up,
    Down,
}

impl ArrowKey {
    /// Map a DOM `KeyboardEvent.key` value to an arrow key.
    pub fn from_key(key: &str) -> Option<ArrowKey> {
        match key {
            "ArrowLeft" => Some(ArrowKey::Left),
            "ArrowRight" => Some(ArrowKey::Right),
            "ArrowUp" => Some(ArrowKey::Up),
            "ArrowDown" => Some(ArrowKey::Down),
            _ => None,
        }
    }

    /// Pixel delta produced by one press of this key at the given step.
    pub fn delta(&self, step: f64) -> (f64, f64) {
        match self {
            ArrowKey::Left => (-step, 0.0),
            ArrowKey::Right => (step, 0.0),
            ArrowKey::Up => (0.0, -step),
            ArrowKey::Down => (0.0, step),
        }
    }
}

/// Held modifier and arrow keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub shift: bool,
    pub control: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl ModifierState {
    /// Directional intent: XOR per opposing pair, OR across pairs.
    pub fn arrow_active(&self) -> bool {
        (self.left != self.right) || (self.up != self.down)
    }

    pub fn set_arrow(&mut self, key: ArrowKey, held: bool) {
        match key {
            ArrowKey::Left => self.left = held,
            ArrowKey::Right => self.right = held,
            ArrowKey::Up => self.up = held,
            ArrowKey::Down => self.down = held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_arrow_is_active() {
        let mut keys = ModifierState::default();
        keys.set_arrow(ArrowKey::Left, true);
        assert!(keys.arrow_active());
    }

    #[test]
    fn test_opposing_arrows_cancel() {
        let mut keys = ModifierState::default();
        keys.set_arrow(ArrowKey::Left, true);
        keys.set_arrow(ArrowKey::Right, true);
        assert!(!keys.arrow_active());

        // A vertical key on top of the cancelled pair re-activates intent.
        keys.set_arrow(ArrowKey::Up, true);
        assert!(keys.arrow_active());
    }

    #[test]
    fn test_release_clears_intent() {
        let mut keys = ModifierState::default();
        keys.set_arrow(ArrowKey::Down, true);
        keys.set_arrow(ArrowKey::Down, false);
        assert!(!keys.arrow_active());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(ArrowKey::from_key("ArrowLeft"), Some(ArrowKey::Left));
        assert_eq!(ArrowKey::from_key("Enter"), None);
    }

    #[test]
    fn test_delta_directions() {
        assert_eq!(ArrowKey::Left.delta(1.0), (-1.0, 0.0));
        assert_eq!(ArrowKey::Down.delta(10.0), (0.0, 10.0));
    }
}
