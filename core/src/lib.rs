//! Core

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod app;
pub mod common;
pub mod config;
pub mod error;
pub mod fileutil;
pub mod geometry;
pub mod light;
pub mod paramset;
pub mod photometric;
pub mod sampling;
pub mod stats;
pub mod validation;

pub use error::{ErrorKind, GonioError, Result};
