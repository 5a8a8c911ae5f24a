//! Scene Validation

use crate::light::*;
use crate::error::*;
use std::fmt;

/// Unit system declared by the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitSystem {
    /// Meters.
    Metric,

    /// Anything else, by name.
    Other(String),
}

impl UnitSystem {
    /// Returns the unit system for a name; "metric", "meters" and "m" are
    /// metric.
    ///
    /// * `name` - Unit system name.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "metric" | "meters" | "meter" | "m" => Self::Metric,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true for the metric system.
    pub fn is_metric(&self) -> bool {
        *self == Self::Metric
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::Metric
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "metric"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Rendering backend description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererInfo {
    /// Backend name.
    pub name: String,

    /// True if the backend can measure radiance at a point.
    pub can_measure: bool,
}

impl RendererInfo {
    /// Returns a new `RendererInfo`.
    ///
    /// * `name`        - Backend name.
    /// * `can_measure` - True if the backend can measure radiance.
    pub fn new(name: &str, can_measure: bool) -> Self {
        Self {
            name: name.to_string(),
            can_measure,
        }
    }
}

/// Outcome of validating a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneValidation {
    /// True if there are no errors.
    pub is_valid: bool,

    /// The accepted lights.
    pub light_sources: Vec<LightSource>,

    /// Name of the rendering backend.
    pub renderer_name: String,

    /// Conditions that prevent measurement.
    pub errors: Vec<String>,

    /// Conditions worth reporting that do not prevent measurement.
    pub warnings: Vec<String>,
}

impl SceneValidation {
    /// Returns true if at least one light was accepted.
    pub fn has_lights(&self) -> bool {
        !self.light_sources.is_empty()
    }

    /// Returns the accepted lights if the scene is valid, otherwise a
    /// validation error listing every problem.
    pub fn into_result(self) -> Result<Vec<LightSource>> {
        if self.is_valid {
            Ok(self.light_sources)
        } else {
            Err(GonioError::validation(
                "scene",
                "scene validation failed",
                self.errors,
            ))
        }
    }
}

impl fmt::Display for SceneValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_valid { "valid" } else { "invalid" };
        writeln!(f, "Scene is {status}")?;
        writeln!(f, "Renderer: {}", self.renderer_name)?;
        writeln!(f, "Lights: {}", self.light_sources.len())?;
        for light in self.light_sources.iter() {
            writeln!(f, "  {light}")?;
        }
        for w in self.warnings.iter() {
            writeln!(f, "Warning: {w}")?;
        }
        for e in self.errors.iter() {
            writeln!(f, "Error: {e}")?;
        }
        Ok(())
    }
}

/// Checks that a scene can be measured. Every condition is evaluated; nothing
/// short circuits.
///
/// * `lights`    - Lights reported by the scene inventory.
/// * `renderer`  - Rendering backend.
/// * `units`     - Scene unit system.
/// * `constants` - Photometric constants holding the supported light types.
pub fn validate_scene(
    lights: &[LightDescriptor],
    renderer: &RendererInfo,
    units: &UnitSystem,
    constants: &PhotometryConstants,
) -> SceneValidation {
    let mut errors = vec![];
    let mut warnings = vec![];

    if !renderer.can_measure {
        errors.push(format!(
            "renderer '{}' cannot measure radiance",
            renderer.name
        ));
    }

    let mut light_sources = Vec::with_capacity(lights.len());
    for desc in lights.iter() {
        match LightSource::from_descriptor(desc, constants.supported_types) {
            Ok(light) => light_sources.push(light),
            Err(reason) => {
                debug!("{reason}");
                warnings.push(reason);
            }
        }
    }

    if light_sources.is_empty() {
        errors.push(String::from("scene contains no supported light sources"));
    } else if light_sources.len() > 1 {
        warnings.push(format!(
            "{} lights found; the photometric center is their unweighted centroid",
            light_sources.len()
        ));
    }

    if !units.is_metric() {
        warnings.push(format!(
            "scene units are '{units}'; distances are interpreted as meters"
        ));
    }

    SceneValidation {
        is_valid: errors.is_empty(),
        light_sources,
        renderer_name: renderer.name.clone(),
        errors,
        warnings,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
