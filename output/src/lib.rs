//! Output

#[macro_use]
extern crate log;

mod metadata;
mod writer;

// Re-export.
pub use metadata::*;
pub use writer::*;
