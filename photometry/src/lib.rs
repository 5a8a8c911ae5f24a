//! Photometry

#[macro_use]
extern crate log;

mod calibrate;
mod lm63;

// Re-export.
pub use calibrate::*;
pub use lm63::*;
