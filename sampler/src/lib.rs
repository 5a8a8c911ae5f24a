//! Sampler

#[macro_use]
extern crate log;

mod analytic;
mod oracle;
mod planner;
mod sweep;

// Re-export.
pub use analytic::*;
pub use oracle::*;
pub use planner::*;
pub use sweep::*;
