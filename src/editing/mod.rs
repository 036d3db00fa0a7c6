//! Editing subsystems
//!
//! Selection, the pending edit batch, the movable-element engine, and the
//! input coordinator. These own no references to each other; the session
//! passes collaborators in explicitly.

pub mod edit_state;
pub mod gesture;
pub mod movers;
pub mod selection;

pub use edit_state::PendingEditBatch;
pub use gesture::{GestureEnd, InputCoordinator, OperationToken};
pub use movers::MoverRegistry;
pub use selection::SelectionState;
