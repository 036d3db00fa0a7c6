//! In-page event broadcasts
//!
//! Other in-page listeners (panels, overlays) subscribe here with typed
//! payloads. These broadcasts always fire, including for selection
//! changes whose host notification was suppressed.

use serde::Serialize;

use crate::models::{CodeRange, EditorFlags};

/// Typed notification of an engine state change.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EditorEvent {
    SelectionChanged { ranges: Vec<CodeRange> },
    FlagsChanged { flags: EditorFlags },
    EditsFlushed { count: usize },
    MoversRescanned { count: usize },
}

/// A subscriber to engine events.
pub trait EditorObserver {
    fn on_event(&self, event: &EditorEvent);
}

/// The subscriber list. Emission order is subscription order.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn EditorObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn EditorObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&self, event: &EditorEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
