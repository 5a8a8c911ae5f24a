//! Photometric Data

use crate::common::*;
use crate::error::*;
use crate::stats::*;

/// Calibrated luminous intensity distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotometricData {
    /// Vertical angles θ in degrees.
    pub vertical_angles: Vec<Float>,

    /// Horizontal angles Ø in degrees.
    pub horizontal_angles: Vec<Float>,

    /// Luminous intensity in candela indexed `[theta][phi]`.
    pub candela: Vec<Vec<Float>>,

    /// Total luminous flux in lumens.
    pub total_lumens: Float,

    /// Measurement distance in meters.
    pub distance_meters: Float,

    /// Fixture name.
    pub fixture_name: String,
}

impl PhotometricData {
    /// Returns every defect in the data; empty when it can be serialized.
    pub fn data_errors(&self) -> Vec<String> {
        let mut errors = vec![];
        let rows = self.vertical_angles.len();
        let cols = self.horizontal_angles.len();

        if rows == 0 || cols == 0 {
            errors.push(String::from("angle lists must not be empty"));
        }
        if self.candela.len() != rows || self.candela.iter().any(|r| r.len() != cols) {
            errors.push(format!("candela matrix does not match {rows} x {cols} angles"));
        }

        let negatives = self.candela.iter().flatten().filter(|v| **v < 0.0).count();
        if negatives > 0 {
            errors.push(format!("candela contains {negatives} negative values"));
        }
        let non_finite = self.candela.iter().flatten().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            errors.push(format!("candela contains {non_finite} non-finite values"));
        }

        if !(self.total_lumens.is_finite() && self.total_lumens > 0.0) {
            errors.push(format!("total lumens {} must be positive", self.total_lumens));
        }
        if !(self.distance_meters.is_finite() && self.distance_meters > 0.0) {
            errors.push(format!("distance {} must be positive", self.distance_meters));
        }

        if self.vertical_angles.iter().any(|a| !(0.0..=180.0).contains(a)) {
            errors.push(String::from("vertical angles outside [0, 180]"));
        }
        if self.horizontal_angles.iter().any(|a| !(0.0..360.0).contains(a)) {
            errors.push(String::from("horizontal angles outside [0, 360)"));
        }
        errors
    }

    /// Returns true if the data has no defects.
    pub fn validate_data(&self) -> bool {
        self.data_errors().is_empty()
    }

    /// Returns a validation error listing every defect.
    pub fn check(&self) -> Result<()> {
        let errors = self.data_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GonioError::validation(
                "photometry",
                "invalid photometric data",
                errors,
            ))
        }
    }

    /// Returns statistics over the candela values.
    pub fn statistics(&self) -> Option<Statistics> {
        Statistics::from_values(self.candela.iter().flatten().copied())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
