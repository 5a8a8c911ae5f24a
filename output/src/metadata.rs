//! Metadata Sidecar

use chrono::{DateTime, Local, SecondsFormat};
use gonio::common::*;
use gonio::config::*;
use gonio::geometry::*;
use gonio::sampling::*;
use lights::*;
use sampler::*;
use serde::Serialize;

/// Unit every coordinate is written in.
pub const COORDINATE_UNIT: &str = "meters";

/// World coordinates of the photometric center.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldCoordinates {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub unit: String,
}

/// Photometric center relative to the fixture origin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelativeCoordinates {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub unit: String,
    pub note: String,
}

/// Photometric center in both frames.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhotometricCenter {
    /// World frame.
    pub world_coordinates: WorldCoordinates,

    /// Fixture frame.
    pub relative_to_fixture_origin: RelativeCoordinates,
}

/// Placement hints for tools that consume IES files.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsageInstructions {
    pub unreal_engine: String,
    pub vray: String,
    pub corona: String,
}

impl UsageInstructions {
    /// Returns hints for placing the IES light at an offset from the fixture
    /// origin.
    ///
    /// * `offset` - Photometric center relative to the fixture origin.
    pub fn for_offset(offset: &Point3f) -> Self {
        let o = format!("({:.3}, {:.3}, {:.3})", offset.x, offset.y, offset.z);
        Self {
            unreal_engine: format!("Place the IES light at offset {o} from the fixture model pivot"),
            vray: format!("Use a VRayIES light with position offset {o}"),
            corona: format!("Use a CoronaLight with IES profile at position offset {o}"),
        }
    }
}

/// How the distribution was sampled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SamplingSummary {
    /// Angular step in degrees.
    pub angular_interval: Float,

    /// Sensor distance in meters.
    pub distance: Float,

    /// Oracle samples per measurement.
    pub samples: u32,

    /// Number of grid points.
    pub total_points: usize,

    /// Number of grid points that could not be measured.
    pub failed_points: usize,

    /// Number of cells estimated from their neighbours.
    pub filled_cells: usize,

    /// Sampling time in seconds.
    pub elapsed_seconds: Float,

    /// The failed grid points.
    pub failures: Vec<SampleFailure>,
}

impl SamplingSummary {
    /// Returns a new `SamplingSummary`.
    ///
    /// * `config`       - Sampling configuration.
    /// * `sweep`        - Sweep outcome.
    /// * `filled_cells` - Number of cells filled after the sweep.
    pub fn new(config: &SamplingConfig, sweep: &Sweep, filled_cells: usize) -> Self {
        Self {
            angular_interval: config.angular_interval,
            distance: config.distance,
            samples: config.samples,
            total_points: config.total_sampling_points(),
            failed_points: sweep.failures.len(),
            filled_cells,
            elapsed_seconds: sweep.result.elapsed_seconds,
            failures: sweep.failures.clone(),
        }
    }
}

/// JSON document written next to the IES file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metadata {
    pub fixture_name: String,

    /// ISO-8601 timestamp.
    pub generated_date: String,

    pub photometric_center: PhotometricCenter,

    pub light_sources: Vec<LightSummary>,

    pub total_lumens: Float,

    pub usage_instructions: UsageInstructions,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingSummary>,
}

/// Builds the sidecar document, timestamped now.
///
/// * `fixture_name` - Fixture name.
/// * `aggregate`    - Light aggregate.
/// * `total_lumens` - Flux the data was calibrated to.
/// * `sampling`     - Sampling summary.
pub fn generate_metadata(
    fixture_name: &str,
    aggregate: &Aggregate,
    total_lumens: Float,
    sampling: Option<SamplingSummary>,
) -> Metadata {
    generate_metadata_at(fixture_name, aggregate, total_lumens, sampling, Local::now())
}

/// Builds the sidecar document with a given timestamp.
///
/// * `fixture_name` - Fixture name.
/// * `aggregate`    - Light aggregate.
/// * `total_lumens` - Flux the data was calibrated to.
/// * `sampling`     - Sampling summary.
/// * `date`         - Generation time.
pub fn generate_metadata_at(
    fixture_name: &str,
    aggregate: &Aggregate,
    total_lumens: Float,
    sampling: Option<SamplingSummary>,
    date: DateTime<Local>,
) -> Metadata {
    let world = aggregate.center;
    let relative = aggregate.relative_center;
    Metadata {
        fixture_name: fixture_name.to_string(),
        generated_date: date.to_rfc3339_opts(SecondsFormat::Secs, false),
        photometric_center: PhotometricCenter {
            world_coordinates: WorldCoordinates {
                x: world.x,
                y: world.y,
                z: world.z,
                unit: String::from(COORDINATE_UNIT),
            },
            relative_to_fixture_origin: RelativeCoordinates {
                x: relative.x,
                y: relative.y,
                z: relative.z,
                unit: String::from(COORDINATE_UNIT),
                note: String::from("Relative to the fixture model origin (pivot)"),
            },
        },
        light_sources: aggregate.lights.clone(),
        total_lumens,
        usage_instructions: UsageInstructions::for_offset(&relative),
        sampling,
    }
}

/// Partial progress written when a sweep is cancelled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SamplingDump {
    pub fixture_name: String,

    /// ISO-8601 timestamp.
    pub generated_date: String,

    /// Placements visited before cancellation.
    pub completed_points: usize,

    /// Placements in the grid.
    pub total_points: usize,

    pub config: SamplingConfig,

    /// Raw measurements; unmeasured cells are null.
    pub result: SamplingResult,

    pub failures: Vec<SampleFailure>,
}

impl SamplingDump {
    /// Returns the dump of a sweep.
    ///
    /// * `fixture_name` - Fixture name.
    /// * `config`       - Sampling configuration.
    /// * `sweep`        - Sweep outcome.
    pub fn new(fixture_name: &str, config: &SamplingConfig, sweep: &Sweep) -> Self {
        let completed_points = match sweep.status {
            SweepStatus::Completed => sweep.result.total_samples,
            SweepStatus::Cancelled { completed } => completed,
        };
        Self {
            fixture_name: fixture_name.to_string(),
            generated_date: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            completed_points,
            total_points: config.total_sampling_points(),
            config: *config,
            result: sweep.result.clone(),
            failures: sweep.failures.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
