//! Radiance Oracle

use gonio::common::*;
use gonio::error::*;
use gonio::geometry::*;

/// A rendering backend that can measure the radiance arriving at a point.
///
/// Measurements are synchronous and blocking. The sensor is created once per
/// sweep, moved and re-aimed for every measurement and released at the end.
pub trait RadianceOracle {
    /// Backend specific sensor handle.
    type Sensor;

    /// Returns the backend name.
    fn name(&self) -> &str;

    /// Creates a sensor.
    ///
    /// * `position` - Initial sensor position.
    /// * `aim`      - Point the sensor looks at.
    fn create_sensor(&mut self, position: &Point3f, aim: &Point3f) -> Result<Self::Sensor>;

    /// Moves the sensor, aims it and returns the measured brightness. A
    /// failure for this placement only is reported as a `Sampling` error.
    ///
    /// * `sensor`   - The sensor.
    /// * `position` - Sensor position.
    /// * `aim`      - Point the sensor looks at.
    /// * `quality`  - Samples per measurement.
    fn measure(
        &mut self,
        sensor: &mut Self::Sensor,
        position: &Point3f,
        aim: &Point3f,
        quality: u32,
    ) -> Result<Float>;

    /// Releases a sensor.
    ///
    /// * `sensor` - The sensor.
    fn release_sensor(&mut self, sensor: Self::Sensor);
}

/// Owns the single sensor of a sweep. The sensor is created lazily by the
/// first measurement and released when the guard is dropped.
pub struct SensorGuard<'a, O: RadianceOracle> {
    /// The backend.
    oracle: &'a mut O,

    /// The sensor, once created.
    sensor: Option<O::Sensor>,
}

impl<'a, O: RadianceOracle> SensorGuard<'a, O> {
    /// Returns a new `SensorGuard` that has not created its sensor yet.
    ///
    /// * `oracle` - The backend.
    pub fn new(oracle: &'a mut O) -> Self {
        Self {
            oracle,
            sensor: None,
        }
    }

    /// Returns true once the sensor has been created.
    pub fn is_active(&self) -> bool {
        self.sensor.is_some()
    }

    /// Measures at a placement, creating the sensor first if needed.
    ///
    /// * `position` - Sensor position.
    /// * `aim`      - Point the sensor looks at.
    /// * `quality`  - Samples per measurement.
    pub fn measure(&mut self, position: &Point3f, aim: &Point3f, quality: u32) -> Result<Float> {
        if self.sensor.is_none() {
            let sensor = self.oracle.create_sensor(position, aim)?;
            debug!("Created sensor on '{}'", self.oracle.name());
            self.sensor = Some(sensor);
        }
        match self.sensor.as_mut() {
            Some(sensor) => self.oracle.measure(sensor, position, aim, quality),
            None => Err(GonioError::sampling("sensor unavailable", *position, 0.0, 0.0)),
        }
    }
}

impl<'a, O: RadianceOracle> Drop for SensorGuard<'a, O> {
    fn drop(&mut self) {
        if let Some(sensor) = self.sensor.take() {
            self.oracle.release_sensor(sensor);
            debug!("Released sensor on '{}'", self.oracle.name());
        }
    }
}
