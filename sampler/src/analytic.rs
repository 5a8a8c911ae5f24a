//! Analytic Oracle

use crate::oracle::*;
use gonio::common::*;
use gonio::error::*;
use gonio::geometry::*;
use gonio::light::*;
use lights::*;

/// Name of the analytic backend.
pub const ANALYTIC_RENDERER: &str = "analytic";

/// Sensor of the analytic backend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VirtualSensor {
    /// Current position.
    pub position: Point3f,

    /// Current aim point.
    pub aim: Point3f,
}

/// Backend that evaluates the summed inverse-square contribution of every
/// light at the sensor position. Readings do not depend on the quality.
pub struct AnalyticOracle {
    /// The lights.
    lights: Vec<LightSource>,

    /// Number of measurements taken.
    measurements: usize,
}

impl AnalyticOracle {
    /// Returns a new `AnalyticOracle`.
    ///
    /// * `lights` - Validated lights.
    pub fn new(lights: Vec<LightSource>) -> Self {
        Self {
            lights,
            measurements: 0,
        }
    }

    /// Returns the number of measurements taken.
    pub fn measurements(&self) -> usize {
        self.measurements
    }
}

impl RadianceOracle for AnalyticOracle {
    type Sensor = VirtualSensor;

    fn name(&self) -> &str {
        ANALYTIC_RENDERER
    }

    fn create_sensor(&mut self, position: &Point3f, aim: &Point3f) -> Result<VirtualSensor> {
        Ok(VirtualSensor {
            position: *position,
            aim: *aim,
        })
    }

    fn measure(
        &mut self,
        sensor: &mut VirtualSensor,
        position: &Point3f,
        aim: &Point3f,
        _quality: u32,
    ) -> Result<Float> {
        sensor.position = *position;
        sensor.aim = *aim;
        self.measurements += 1;

        if !position.is_finite() {
            return Err(GonioError::sampling("non-finite sensor position", *position, 0.0, 0.0));
        }
        if self
            .lights
            .iter()
            .any(|l| l.world_position.distance_squared(position) == 0.0)
        {
            return Err(GonioError::sampling("sensor coincides with a light", *position, 0.0, 0.0));
        }

        Ok(self.lights.iter().map(|l| irradiance_at(l, position)).sum())
    }

    fn release_sensor(&mut self, _sensor: VirtualSensor) {}
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
