//! Host bridge
//!
//! The typed message protocol to the hosting editor, the outbound
//! transport, and the in-page observer registry that replaces
//! stringly-typed DOM event broadcasts.

pub mod events;
pub mod messages;
pub mod transport;

pub use events::{EditorEvent, EditorObserver, ObserverRegistry};
pub use messages::{
    EditEntry, EmptyPayload, InboundMessage, OutboundMessage, PasteIntent, RangeRef,
};
pub use transport::{FlagsCache, HostSink, TransportBridge};
