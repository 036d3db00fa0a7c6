//! Utility modules for the HTML editor engine

pub mod timing;

pub use timing::GestureTimer;
