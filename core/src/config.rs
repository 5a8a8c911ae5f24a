//! Sampling Configuration

use crate::common::*;
use crate::error::*;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Smallest allowed angular interval (degrees).
pub const MIN_ANGULAR_INTERVAL: Float = 1.0;

/// Largest allowed angular interval (degrees).
pub const MAX_ANGULAR_INTERVAL: Float = 45.0;

/// Smallest allowed measurement distance (meters).
pub const MIN_DISTANCE: Float = 0.1;

/// Largest allowed measurement distance (meters).
pub const MAX_DISTANCE: Float = 100.0;

/// Smallest allowed oracle quality (samples per measurement).
pub const MIN_SAMPLES: u32 = 1;

/// Largest allowed oracle quality (samples per measurement).
pub const MAX_SAMPLES: u32 = 4096;

/// Quality the per-sample time estimate is expressed for.
pub const REFERENCE_SAMPLES: u32 = 64;

/// Default estimated time for one measurement at reference quality (seconds).
pub const DEFAULT_TIME_PER_SAMPLE: Float = 2.0;

/// Sampling presets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Quick look at the distribution: 10°, 5 m, 64 samples.
    Preview,

    /// Final output: 5°, 5 m, 256 samples.
    Production,
}

/// Spherical sampling parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SamplingConfig {
    /// Angular step between grid points in degrees.
    pub angular_interval: Float,

    /// Sensor distance from the photometric center in meters.
    pub distance: Float,

    /// Oracle quality setting (samples per measurement).
    pub samples: u32,
}

impl SamplingConfig {
    /// Returns a new `SamplingConfig`. The values are not checked; use
    /// `validated()` before sampling.
    ///
    /// * `angular_interval` - Angular step in degrees.
    /// * `distance`         - Sensor distance in meters.
    /// * `samples`          - Oracle quality setting.
    pub fn new(angular_interval: Float, distance: Float, samples: u32) -> Self {
        Self {
            angular_interval,
            distance,
            samples,
        }
    }

    /// Returns the preview preset.
    pub fn preview() -> Self {
        Self::new(10.0, 5.0, 64)
    }

    /// Returns the production preset.
    pub fn production() -> Self {
        Self::new(5.0, 5.0, 256)
    }

    /// Returns the configuration for a preset.
    ///
    /// * `preset` - The preset.
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Preview => Self::preview(),
            Preset::Production => Self::production(),
        }
    }

    /// Returns the list of range violations; empty when valid.
    pub fn range_errors(&self) -> Vec<String> {
        let mut errors = vec![];
        if !(MIN_ANGULAR_INTERVAL..=MAX_ANGULAR_INTERVAL).contains(&self.angular_interval) {
            errors.push(format!(
                "angular interval {}° outside [{MIN_ANGULAR_INTERVAL}, {MAX_ANGULAR_INTERVAL}]",
                self.angular_interval
            ));
        }
        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&self.distance) {
            errors.push(format!(
                "distance {} m outside [{MIN_DISTANCE}, {MAX_DISTANCE}]",
                self.distance
            ));
        }
        if !(MIN_SAMPLES..=MAX_SAMPLES).contains(&self.samples) {
            errors.push(format!(
                "samples {} outside [{MIN_SAMPLES}, {MAX_SAMPLES}]",
                self.samples
            ));
        }
        errors
    }

    /// Returns true if all parameters are within their ranges.
    pub fn validate(&self) -> bool {
        self.range_errors().is_empty()
    }

    /// Returns the configuration if valid, otherwise a validation error that
    /// lists every violated range.
    pub fn validated(self) -> Result<Self> {
        let errors = self.range_errors();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(GonioError::validation(
                "config",
                "invalid sampling configuration",
                errors,
            ))
        }
    }

    /// Number of vertical angles in the closed range [0, 180].
    pub fn num_theta(&self) -> usize {
        num_theta(self.angular_interval)
    }

    /// Number of horizontal angles in the half-open range [0, 360).
    pub fn num_phi(&self) -> usize {
        num_phi(self.angular_interval)
    }

    /// Total number of grid points.
    pub fn total_sampling_points(&self) -> usize {
        self.num_theta() * self.num_phi()
    }

    /// Estimated sweep duration in seconds.
    ///
    /// * `time_per_sample` - Time for one measurement at reference quality.
    pub fn estimate_seconds(&self, time_per_sample: Float) -> Float {
        let adjusted = time_per_sample * (self.samples as Float / REFERENCE_SAMPLES as Float);
        self.total_sampling_points() as Float * adjusted
    }

    /// Human readable sweep duration estimate ("N min" or "H.h h").
    ///
    /// * `time_per_sample` - Time for one measurement at reference quality.
    pub fn estimate_time(&self, time_per_sample: Float) -> String {
        let minutes = self.estimate_seconds(time_per_sample) / 60.0;
        if minutes < 60.0 {
            format!("{} min", minutes as u64)
        } else {
            format!("{:.1} h", minutes / 60.0)
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::preview()
    }
}

impl fmt::Display for SamplingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interval {}°, distance {} m, samples {}, {} points (~{})",
            self.angular_interval,
            self.distance,
            self.samples,
            self.total_sampling_points(),
            self.estimate_time(DEFAULT_TIME_PER_SAMPLE)
        )
    }
}

/// Returns true if all parameters of `config` are within their ranges.
///
/// * `config` - The sampling configuration.
pub fn validate_config(config: &SamplingConfig) -> bool {
    config.validate()
}

/// Number of vertical angles `i * interval` in the closed range [0, 180].
///
/// * `interval` - Angular step in degrees.
pub fn num_theta(interval: Float) -> usize {
    (180.0 / interval + ANGLE_EPSILON).floor() as usize + 1
}

/// Number of horizontal angles `j * interval` in the half-open range [0, 360).
///
/// * `interval` - Angular step in degrees.
pub fn num_phi(interval: Float) -> usize {
    (360.0 / interval - ANGLE_EPSILON).ceil() as usize
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn presets() {
        assert_eq!(SamplingConfig::preview(), SamplingConfig::new(10.0, 5.0, 64));
        assert_eq!(SamplingConfig::production(), SamplingConfig::new(5.0, 5.0, 256));
        assert_eq!(
            SamplingConfig::from_preset(Preset::Production),
            SamplingConfig::production()
        );
        assert!(SamplingConfig::preview().validate());
        assert!(SamplingConfig::production().validate());
    }

    #[test]
    fn range_boundaries() {
        assert!(SamplingConfig::new(1.0, 0.1, 1).validate());
        assert!(SamplingConfig::new(45.0, 100.0, 4096).validate());
        assert!(!SamplingConfig::new(0.5, 5.0, 64).validate());
        assert!(!SamplingConfig::new(46.0, 5.0, 64).validate());
        assert!(!SamplingConfig::new(10.0, 0.05, 64).validate());
        assert!(!SamplingConfig::new(10.0, 101.0, 64).validate());
        assert!(!SamplingConfig::new(10.0, 5.0, 0).validate());
        assert!(!SamplingConfig::new(10.0, 5.0, 5000).validate());
        assert!(!SamplingConfig::new(Float::NAN, 5.0, 64).validate());
        assert!(validate_config(&SamplingConfig::preview()));
    }

    #[test]
    fn validated_lists_every_violation() {
        match SamplingConfig::new(0.0, 0.0, 0).validated() {
            Err(GonioError::Validation { errors, .. }) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn grid_size_for_common_intervals() {
        assert_eq!(SamplingConfig::new(10.0, 5.0, 64).total_sampling_points(), 19 * 36);
        assert_eq!(SamplingConfig::new(10.0, 5.0, 64).total_sampling_points(), 684);
        assert_eq!(SamplingConfig::new(5.0, 5.0, 64).total_sampling_points(), 37 * 72);
        assert_eq!(SamplingConfig::new(7.0, 5.0, 64).total_sampling_points(), 26 * 52);
        assert_eq!(SamplingConfig::new(45.0, 5.0, 64).total_sampling_points(), 5 * 8);
        assert_eq!(SamplingConfig::new(1.0, 5.0, 64).total_sampling_points(), 181 * 360);
        assert_eq!(num_theta(7.2), 26);
        assert_eq!(num_phi(7.2), 50);
    }

    #[test]
    fn estimate() {
        // 684 points * 2 s * (64 / 64) = 1368 s.
        let c = SamplingConfig::preview();
        assert_eq!(c.estimate_seconds(2.0), 1368.0);
        assert_eq!(c.estimate_time(2.0), "22 min");

        // 2664 points * 2 s * 4 = 21312 s.
        let c = SamplingConfig::production();
        assert_eq!(c.estimate_seconds(2.0), 21312.0);
        assert_eq!(c.estimate_time(2.0), "5.9 h");
    }

    proptest! {
        #[test]
        fn grid_counts_match_conventions(interval in 1.0..=45.0f64) {
            let n_theta = num_theta(interval);
            let n_phi = num_phi(interval);

            // Closed vertical range.
            prop_assert!((n_theta - 1) as Float * interval <= 180.0 + 1e-6);
            prop_assert!(n_theta as Float * interval > 180.0);

            // Half-open horizontal range.
            prop_assert!((n_phi - 1) as Float * interval < 360.0);
            prop_assert!(n_phi as Float * interval >= 360.0 - 1e-6);

            prop_assert_eq!(
                SamplingConfig::new(interval, 5.0, 64).total_sampling_points(),
                n_theta * n_phi
            );
        }

        #[test]
        fn integer_intervals_follow_floor_formulas(interval in 1u32..=45) {
            let i = interval as Float;
            let expected_theta = (180 / interval) as usize + 1;
            let expected_phi = if 360 % interval == 0 {
                (360 / interval) as usize
            } else {
                (360 / interval) as usize + 1
            };
            prop_assert_eq!(num_theta(i), expected_theta);
            prop_assert_eq!(num_phi(i), expected_phi);
        }
    }
}
