//! Sampling Results

use crate::common::*;
use crate::error::*;
use crate::geometry::*;
use crate::stats::*;
use serde::Serialize;

/// Raw measurements over the spherical grid. Rows are vertical angles and
/// columns are horizontal angles. Cells that were not measured hold NaN.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SamplingResult {
    /// Vertical angles θ in degrees.
    pub vertical_angles: Vec<Float>,

    /// Horizontal angles Ø in degrees.
    pub horizontal_angles: Vec<Float>,

    /// Raw luminance indexed `[theta][phi]`.
    pub luminance: Vec<Vec<Float>>,

    /// Center of the sampling sphere.
    pub reference_point: Point3f,

    /// Number of measurements attempted.
    pub total_samples: usize,

    /// Wall clock time spent sampling.
    pub elapsed_seconds: Float,
}

impl SamplingResult {
    /// Returns a result with every cell unsampled.
    ///
    /// * `vertical_angles`   - Vertical angles θ in degrees.
    /// * `horizontal_angles` - Horizontal angles Ø in degrees.
    /// * `reference_point`   - Center of the sampling sphere.
    pub fn new_unsampled(
        vertical_angles: Vec<Float>,
        horizontal_angles: Vec<Float>,
        reference_point: Point3f,
    ) -> Self {
        let luminance = vec![vec![Float::NAN; horizontal_angles.len()]; vertical_angles.len()];
        Self {
            vertical_angles,
            horizontal_angles,
            luminance,
            reference_point,
            total_samples: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Returns the expected `(rows, columns)` of the luminance matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.vertical_angles.len(), self.horizontal_angles.len())
    }

    /// Returns every integrity defect; empty when the data is usable.
    pub fn integrity_errors(&self) -> Vec<String> {
        let mut errors = vec![];
        let (rows, cols) = self.shape();

        if self.luminance.len() != rows {
            errors.push(format!(
                "luminance has {} rows, expected {rows}",
                self.luminance.len()
            ));
        }
        for (i, row) in self.luminance.iter().enumerate() {
            if row.len() != cols {
                errors.push(format!(
                    "luminance row {i} has {} columns, expected {cols}",
                    row.len()
                ));
            }
        }

        let nans = self.luminance.iter().flatten().filter(|v| v.is_nan()).count();
        if nans > 0 {
            errors.push(format!("luminance contains {nans} NaN values"));
        }
        let infs = self
            .luminance
            .iter()
            .flatten()
            .filter(|v| v.is_infinite())
            .count();
        if infs > 0 {
            errors.push(format!("luminance contains {infs} infinite values"));
        }

        if self
            .vertical_angles
            .iter()
            .any(|a| !(0.0..=180.0).contains(a))
        {
            errors.push(String::from("vertical angles outside [0, 180]"));
        }
        if self
            .horizontal_angles
            .iter()
            .any(|a| !(0.0..360.0).contains(a))
        {
            errors.push(String::from("horizontal angles outside [0, 360)"));
        }

        errors
    }

    /// Returns true if there are no integrity defects.
    pub fn validate_data_integrity(&self) -> bool {
        self.integrity_errors().is_empty()
    }

    /// Returns a validation error listing every integrity defect.
    pub fn check_integrity(&self) -> Result<()> {
        let errors = self.integrity_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GonioError::validation(
                "sampling",
                "sampling result failed integrity check",
                errors,
            ))
        }
    }

    /// Returns statistics over the finite cells.
    pub fn statistics(&self) -> Option<Statistics> {
        Statistics::from_values(self.luminance.iter().flatten().copied())
    }

    /// Returns the elapsed sampling time in human readable form.
    pub fn elapsed_time_formatted(&self) -> String {
        format_duration(self.elapsed_seconds)
    }

    /// Returns the number of NaN cells.
    pub fn missing_cells(&self) -> usize {
        self.luminance.iter().flatten().filter(|v| v.is_nan()).count()
    }

    /// Replaces every NaN cell with an estimate from its neighbours and
    /// returns the number of cells filled.
    ///
    /// A cell takes the mean of the nearest finite cells on its own ring
    /// (wrapping around in Ø). If the ring has none, it takes the mean of the
    /// finite cells directly above and below. Otherwise it becomes 0.
    /// Estimates are always computed from the measured values, never from
    /// cells filled earlier.
    pub fn fill_gaps(&mut self) -> usize {
        let measured = self.luminance.clone();
        let mut filled = 0;

        for (i, row) in self.luminance.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                if !cell.is_nan() {
                    continue;
                }
                *cell = ring_estimate(&measured[i], j)
                    .or_else(|| column_estimate(&measured, i, j))
                    .unwrap_or(0.0);
                filled += 1;
            }
        }

        if filled > 0 {
            debug!("Filled {filled} missing cells");
        }
        filled
    }
}

/// Mean of the nearest finite cells around `j` on a circular ring.
fn ring_estimate(ring: &[Float], j: usize) -> Option<Float> {
    let n = ring.len();
    for k in 1..=n / 2 {
        let left = ring[(j + n - k) % n];
        let right = ring[(j + k) % n];
        match (left.is_finite(), right.is_finite()) {
            (true, true) if (j + n - k) % n == (j + k) % n => return Some(left),
            (true, true) => return Some(0.5 * (left + right)),
            (true, false) => return Some(left),
            (false, true) => return Some(right),
            (false, false) => {}
        }
    }
    None
}

/// Mean of the finite cells in column `j` of the rows adjacent to `i`.
fn column_estimate(matrix: &[Vec<Float>], i: usize, j: usize) -> Option<Float> {
    let neighbours: Vec<Float> = [i.checked_sub(1), Some(i + 1)]
        .into_iter()
        .flatten()
        .filter_map(|r| matrix.get(r).and_then(|row| row.get(j)).copied())
        .filter(|v| v.is_finite())
        .collect();
    if neighbours.is_empty() {
        None
    } else {
        Some(neighbours.iter().sum::<Float>() / neighbours.len() as Float)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
