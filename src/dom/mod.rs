//! Page model for the rendered preview
//!
//! The engine never keys state by live DOM nodes. At scan time every
//! source-mapped element is assigned a stable arena handle; all selection,
//! edit, and gesture state is keyed by handle, and the JS-facing layer
//! keeps the only table of handle-to-node back-references.

pub mod model;
pub mod style;

pub use model::{ComputedPosition, MappedNode, NodeHandle, NodeSeed, PageEffects, PageModel};
pub use style::{parse_px, px_string, AnchorX, AnchorY, InlineStyle};
