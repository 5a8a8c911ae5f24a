//! Lights

#[macro_use]
extern crate log;

mod aggregate;
mod descriptor;
mod emission;

// Re-export.
pub use aggregate::*;
pub use descriptor::*;
pub use emission::*;
