//! Light Aggregation

use gonio::common::*;
use gonio::error::*;
use gonio::geometry::*;
use gonio::light::*;
use serde::Serialize;

/// Per-light breakdown written to the metadata sidecar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LightSummary {
    /// Identifier.
    pub id: String,

    /// Light type name.
    #[serde(rename = "type")]
    pub light_type: String,

    /// World position.
    pub position: Point3f,

    /// Radiant power in watts.
    pub power_watts: Float,

    /// Luminous flux in lumens.
    pub lumens: Float,

    /// Linear RGB color.
    pub color: [Float; 3],
}

/// Reference geometry and flux of a set of lights.
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate {
    /// Photometric center in world coordinates.
    pub center: Point3f,

    /// Photometric center relative to the fixture origin.
    pub relative_center: Point3f,

    /// Total luminous flux in lumens.
    pub total_lumens: Float,

    /// Per-light breakdown.
    pub lights: Vec<LightSummary>,
}

/// Returns the reference point the sampling sphere is centered on.
///
/// A single light is its own center. Several lights use the unweighted
/// arithmetic mean of their positions; this is a geometric centroid and does
/// not account for how much power each light emits.
///
/// * `lights` - Validated lights.
pub fn photometric_center(lights: &[LightSource]) -> Result<Point3f> {
    match lights {
        [] => Err(empty_lights("photometric center")),
        [light] => Ok(light.world_position),
        _ => {
            let positions: Vec<Point3f> = lights.iter().map(|l| l.world_position).collect();
            centroid(&positions).ok_or_else(|| empty_lights("photometric center"))
        }
    }
}

/// Returns the photometric center relative to the fixture origin.
///
/// * `lights`         - Validated lights.
/// * `fixture_origin` - Fixture origin in world coordinates.
pub fn relative_center(lights: &[LightSource], fixture_origin: &Point3f) -> Result<Point3f> {
    let center = photometric_center(lights)?;
    let d = center - *fixture_origin;
    Ok(Point3f::new(d.x, d.y, d.z))
}

/// Returns the luminous flux of one light in lumens.
///
/// * `light`     - The light.
/// * `constants` - Photometric constants.
pub fn light_flux(light: &LightSource, constants: &PhotometryConstants) -> Float {
    light.luminous_flux(constants.luminous_efficacy)
}

/// Returns the total luminous flux of the lights in lumens.
///
/// * `lights`    - Validated lights.
/// * `constants` - Photometric constants.
pub fn total_flux(lights: &[LightSource], constants: &PhotometryConstants) -> Result<Float> {
    if lights.is_empty() {
        return Err(empty_lights("total flux"));
    }
    Ok(lights.iter().map(|l| light_flux(l, constants)).sum())
}

/// Returns the per-light breakdown.
///
/// * `lights`    - Validated lights.
/// * `constants` - Photometric constants.
pub fn summarize(lights: &[LightSource], constants: &PhotometryConstants) -> Vec<LightSummary> {
    lights
        .iter()
        .map(|l| LightSummary {
            id: l.id.clone(),
            light_type: l.light_type().name().to_string(),
            position: l.world_position,
            power_watts: l.radiant_power_watts,
            lumens: light_flux(l, constants),
            color: l.color,
        })
        .collect()
}

/// Computes the center, relative center, total flux and breakdown at once.
///
/// * `lights`         - Validated lights.
/// * `fixture_origin` - Fixture origin in world coordinates.
/// * `constants`      - Photometric constants.
pub fn aggregate(
    lights: &[LightSource],
    fixture_origin: &Point3f,
    constants: &PhotometryConstants,
) -> Result<Aggregate> {
    let center = photometric_center(lights)?;
    let relative_center = relative_center(lights, fixture_origin)?;
    let total_lumens = total_flux(lights, constants)?;
    info!(
        "{} light(s), photometric center {center}, total flux {total_lumens:.2} lm",
        lights.len()
    );
    Ok(Aggregate {
        center,
        relative_center,
        total_lumens,
        lights: summarize(lights, constants),
    })
}

fn empty_lights(what: &str) -> GonioError {
    GonioError::validation(
        "lights",
        format!("cannot compute {what}"),
        vec![String::from("no light sources")],
    )
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
