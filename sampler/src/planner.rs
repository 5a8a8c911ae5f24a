//! Grid Planning

use gonio::common::*;
use gonio::config::*;
use gonio::geometry::*;
use itertools::iproduct;

/// A single sensor placement on the sampling sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridPoint {
    /// Vertical angle θ in degrees.
    pub theta: Float,

    /// Horizontal angle Ø in degrees.
    pub phi: Float,

    /// Sensor position in world coordinates.
    pub position: Point3f,

    /// Row index into the vertical angles.
    pub row: usize,

    /// Column index into the horizontal angles.
    pub col: usize,
}

/// Ordered sensor placements, θ outer and Ø inner.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingGrid {
    /// Vertical angles θ in degrees.
    pub vertical_angles: Vec<Float>,

    /// Horizontal angles Ø in degrees.
    pub horizontal_angles: Vec<Float>,

    /// Center of the sphere; every sensor aims here.
    pub center: Point3f,

    /// Sphere radius in meters.
    pub distance: Float,

    /// The placements.
    pub points: Vec<GridPoint>,
}

impl SamplingGrid {
    /// Returns the number of placements.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no placements.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Returns the vertical angles `i * interval` covering [0, 180]. The last
/// angle is clamped to 180 so rounding never leaves the range.
///
/// * `interval` - Angular step in degrees.
pub fn vertical_angles(interval: Float) -> Vec<Float> {
    (0..num_theta(interval))
        .map(|i| (i as Float * interval).min(180.0))
        .collect()
}

/// Returns the horizontal angles `j * interval` covering [0, 360).
///
/// * `interval` - Angular step in degrees.
pub fn horizontal_angles(interval: Float) -> Vec<Float> {
    (0..num_phi(interval)).map(|j| j as Float * interval).collect()
}

/// Returns the total number of grid points for an interval.
///
/// * `interval` - Angular step in degrees.
pub fn get_total_sampling_points(interval: Float) -> usize {
    num_theta(interval) * num_phi(interval)
}

/// Plans the sensor placements around a center.
///
/// * `config` - Sampling configuration.
/// * `center` - Photometric center.
pub fn plan_grid(config: &SamplingConfig, center: &Point3f) -> SamplingGrid {
    let vertical = vertical_angles(config.angular_interval);
    let horizontal = horizontal_angles(config.angular_interval);

    let points: Vec<GridPoint> = iproduct!(vertical.iter().enumerate(), horizontal.iter().enumerate())
        .map(|((row, &theta), (col, &phi))| GridPoint {
            theta,
            phi,
            position: spherical_to_cartesian(theta, phi, config.distance, center),
            row,
            col,
        })
        .collect();

    debug!(
        "Planned {} x {} = {} grid points at {} m around {center}",
        vertical.len(),
        horizontal.len(),
        points.len(),
        config.distance
    );

    SamplingGrid {
        vertical_angles: vertical,
        horizontal_angles: horizontal,
        center: *center,
        distance: config.distance,
        points,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
