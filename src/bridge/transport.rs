//! Outbound transport and flag persistence
//!
//! The bridge owns two injected seams: the host message sink (the actual
//! channel is the embedder's concern) and the session-scoped flag cache.

use crate::models::EditorFlags;

use super::messages::OutboundMessage;

/// Outbound half of the host message channel.
pub trait HostSink {
    fn post(&self, message: &OutboundMessage);
}

/// Session-scoped persistence for the editor flag record.
pub trait FlagsCache {
    fn load(&self) -> Option<EditorFlags>;
    fn store(&self, flags: &EditorFlags);
}

/// Translates local state changes into outbound messages.
pub struct TransportBridge {
    sink: Box<dyn HostSink>,
    cache: Box<dyn FlagsCache>,
}

impl TransportBridge {
    pub fn new(sink: Box<dyn HostSink>, cache: Box<dyn FlagsCache>) -> Self {
        Self { sink, cache }
    }

    pub fn send(&self, message: &OutboundMessage) {
        self.sink.post(message);
    }

    pub fn restore_flags(&self) -> Option<EditorFlags> {
        self.cache.load()
    }

    /// Write the flag record to the session cache without notifying the
    /// host (used when the host itself is the source of the change).
    pub fn store_flags(&self, flags: &EditorFlags) {
        self.cache.store(flags);
    }

    /// Persist a local flag change to the cache and announce it to the
    /// host.
    pub fn persist_flags(&self, flags: &EditorFlags) {
        self.cache.store(flags);
        self.send(&OutboundMessage::State(*flags));
    }
}
