//! Errors

use crate::common::Float;
use crate::geometry::Point3f;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type used throughout the workspace.
pub type Result<T> = std::result::Result<T, GonioError>;

/// The error tag callers branch on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Scene or configuration precondition violated.
    Validation,

    /// A single grid point could not be measured.
    Sampling,

    /// Degenerate flux or zero signal.
    Calibration,

    /// Writing or verifying an output file failed.
    Output,
}

/// Errors raised while generating photometric data.
#[derive(Error, Debug)]
pub enum GonioError {
    /// Scene or configuration precondition violated. Unrecoverable for the
    /// current run.
    #[error("[{module}] {message}{}", itemize(.errors))]
    Validation {
        /// Module that detected the problem.
        module: &'static str,

        /// Summary message.
        message: String,

        /// Individual defects.
        errors: Vec<String>,
    },

    /// A single measurement failed. The sweep records it and continues.
    #[error("[sampler] {message} at θ={theta}°, Ø={phi}°, position {position}")]
    Sampling {
        /// Reason reported by the radiance oracle.
        message: String,

        /// Sensor position.
        position: Point3f,

        /// Vertical angle in degrees.
        theta: Float,

        /// Horizontal angle in degrees.
        phi: Float,
    },

    /// Calibration is impossible with the given inputs.
    #[error("[calibration] {message} (lumens = {lumens}{})", factor(.calibration_factor))]
    Calibration {
        /// Summary message.
        message: String,

        /// Declared total luminous flux.
        lumens: Float,

        /// Calibration factor if one was computed.
        calibration_factor: Option<Float>,
    },

    /// Output file could not be written or verified.
    #[error("[output] {message}: '{}'", .path.display())]
    Output {
        /// Summary message.
        message: String,

        /// The offending path.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: Option<io::Error>,
    },
}

impl GonioError {
    /// Returns a new validation error.
    ///
    /// * `module`  - Module that detected the problem.
    /// * `message` - Summary message.
    /// * `errors`  - Individual defects.
    pub fn validation(module: &'static str, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Validation {
            module,
            message: message.into(),
            errors,
        }
    }

    /// Returns a new sampling error.
    ///
    /// * `message`  - Reason for the failure.
    /// * `position` - Sensor position.
    /// * `theta`    - Vertical angle in degrees.
    /// * `phi`      - Horizontal angle in degrees.
    pub fn sampling(message: impl Into<String>, position: Point3f, theta: Float, phi: Float) -> Self {
        Self::Sampling {
            message: message.into(),
            position,
            theta,
            phi,
        }
    }

    /// Returns a new calibration error.
    ///
    /// * `message`            - Summary message.
    /// * `lumens`             - Declared total luminous flux.
    /// * `calibration_factor` - Calibration factor if one was computed.
    pub fn calibration(message: impl Into<String>, lumens: Float, calibration_factor: Option<Float>) -> Self {
        Self::Calibration {
            message: message.into(),
            lumens,
            calibration_factor,
        }
    }

    /// Returns a new output error.
    ///
    /// * `message` - Summary message.
    /// * `path`    - The offending path.
    /// * `source`  - Underlying I/O error.
    pub fn output(message: impl Into<String>, path: &Path, source: Option<io::Error>) -> Self {
        Self::Output {
            message: message.into(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the error tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Sampling { .. } => ErrorKind::Sampling,
            Self::Calibration { .. } => ErrorKind::Calibration,
            Self::Output { .. } => ErrorKind::Output,
        }
    }

    /// Returns true if a sweep may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Sampling
    }
}

fn itemize(errors: &[String]) -> String {
    errors.iter().map(|e| format!("\n  - {e}")).collect()
}

fn factor(calibration_factor: &Option<Float>) -> String {
    calibration_factor
        .map(|k| format!(", factor = {k}"))
        .unwrap_or_default()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
