//! Light Sources

use crate::common::*;
use crate::geometry::*;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Stores combination of flags for the light types.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct LightType: u8 {
        const POINT = 1;
        const AREA = 2;
        const SPOT = 4;
        const DIRECTIONAL = 8;
    }
}

impl LightType {
    /// Returns the light type for a scene kind name. Matching ignores case,
    /// unlike the flag lookup `from_name`.
    ///
    /// * `kind` - Kind name such as "point" or "area".
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "point" => Some(Self::POINT),
            "area" | "diffuse" => Some(Self::AREA),
            "spot" => Some(Self::SPOT),
            "directional" | "distant" | "sun" => Some(Self::DIRECTIONAL),
            _ => None,
        }
    }

    /// Tests a single light type flag and returns whether it is set or not.
    ///
    /// * `other` - Light type flag to match.
    pub fn matches(&self, other: Self) -> bool {
        self.bits() & other.bits() > 0
    }

    /// Returns the canonical name of a single light type flag.
    pub fn name(&self) -> &'static str {
        if *self == Self::POINT {
            "point"
        } else if *self == Self::AREA {
            "area"
        } else if *self == Self::SPOT {
            "spot"
        } else if *self == Self::DIRECTIONAL {
            "directional"
        } else {
            "mixed"
        }
    }
}

/// Light as reported by the scene inventory before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct LightDescriptor {
    /// Identifier, unique within the scene.
    pub id: String,

    /// Kind name as written in the scene ("point", "area", ...).
    pub kind: String,

    /// World position.
    pub position: Point3f,

    /// Radiant power in watts.
    pub power: Float,

    /// Linear RGB color.
    pub color: [Float; 3],

    /// Width of an area emitter.
    pub width: Option<Float>,

    /// Height of an area emitter.
    pub height: Option<Float>,

    /// Emitting direction of an area emitter.
    pub normal: Option<Vector3f>,
}

impl LightDescriptor {
    /// Returns a point light descriptor with white color.
    ///
    /// * `id`       - Identifier.
    /// * `position` - World position.
    /// * `power`    - Radiant power in watts.
    pub fn point(id: &str, position: Point3f, power: Float) -> Self {
        Self {
            id: id.to_string(),
            kind: String::from("point"),
            position,
            power,
            color: [1.0, 1.0, 1.0],
            width: None,
            height: None,
            normal: None,
        }
    }

    /// Returns an area light descriptor with white color.
    ///
    /// * `id`       - Identifier.
    /// * `position` - World position of the emitter center.
    /// * `power`    - Radiant power in watts.
    /// * `width`    - Emitter width.
    /// * `height`   - Emitter height.
    /// * `normal`   - Emitting direction.
    pub fn area(
        id: &str,
        position: Point3f,
        power: Float,
        width: Float,
        height: Float,
        normal: Vector3f,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind: String::from("area"),
            position,
            power,
            color: [1.0, 1.0, 1.0],
            width: Some(width),
            height: Some(height),
            normal: Some(normal),
        }
    }
}

/// Emission geometry of a validated light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Emitter {
    /// Isotropic point emitter.
    Point,

    /// One-sided rectangular emitter.
    Area {
        /// Width.
        width: Float,

        /// Height.
        height: Float,

        /// Unit emitting direction.
        normal: Vector3f,
    },
}

/// A validated light in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    /// Identifier.
    pub id: String,

    /// World position.
    pub world_position: Point3f,

    /// Radiant power in watts (>= 0).
    pub radiant_power_watts: Float,

    /// Linear RGB color.
    pub color: [Float; 3],

    /// Emission geometry.
    pub emitter: Emitter,
}

impl LightSource {
    /// Validates a descriptor against the supported light types. On failure
    /// returns the reason the light was excluded.
    ///
    /// * `desc`      - The descriptor.
    /// * `supported` - Supported light types.
    pub fn from_descriptor(
        desc: &LightDescriptor,
        supported: LightType,
    ) -> std::result::Result<Self, String> {
        let light_type = match LightType::from_kind(&desc.kind) {
            Some(t) if supported.contains(t) => t,
            Some(_) | None => {
                return Err(format!(
                    "light '{}' of type '{}' is not supported and was excluded",
                    desc.id, desc.kind
                ))
            }
        };

        if !desc.position.is_finite() {
            return Err(format!(
                "light '{}' has a non-finite position and was excluded",
                desc.id
            ));
        }
        if !desc.power.is_finite() || desc.power < 0.0 {
            return Err(format!(
                "light '{}' has invalid power {} W and was excluded",
                desc.id, desc.power
            ));
        }

        let emitter = if light_type == LightType::AREA {
            let width = desc.width.unwrap_or(1.0);
            let height = desc.height.unwrap_or(1.0);
            let normal = desc
                .normal
                .unwrap_or(Vector3f::new(0.0, 0.0, -1.0))
                .normalize();
            match normal {
                Some(normal) if width > 0.0 && height > 0.0 => Emitter::Area {
                    width,
                    height,
                    normal,
                },
                _ => {
                    return Err(format!(
                        "area light '{}' has a degenerate shape and was excluded",
                        desc.id
                    ))
                }
            }
        } else {
            Emitter::Point
        };

        Ok(Self {
            id: desc.id.clone(),
            world_position: desc.position,
            radiant_power_watts: desc.power,
            color: desc.color,
            emitter,
        })
    }

    /// Returns the light type.
    pub fn light_type(&self) -> LightType {
        match self.emitter {
            Emitter::Point => LightType::POINT,
            Emitter::Area { .. } => LightType::AREA,
        }
    }

    /// Returns the luminous flux in lumens.
    ///
    /// * `efficacy` - Luminous efficacy in lm/W.
    pub fn luminous_flux(&self, efficacy: Float) -> Float {
        self.radiant_power_watts * efficacy
    }
}

impl fmt::Display for LightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) at {} with {} W",
            self.id,
            self.light_type().name(),
            self.world_position,
            self.radiant_power_watts
        )
    }
}

/// Photometric constants passed explicitly to validation and aggregation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhotometryConstants {
    /// Luminous efficacy in lm/W.
    pub luminous_efficacy: Float,

    /// Light types accepted for measurement.
    pub supported_types: LightType,
}

impl Default for PhotometryConstants {
    fn default() -> Self {
        Self {
            luminous_efficacy: LUMINOUS_EFFICACY,
            supported_types: LightType::POINT | LightType::AREA,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_type_names() {
        assert_eq!(LightType::from_kind("Point"), Some(LightType::POINT));
        assert_eq!(LightType::from_kind("distant"), Some(LightType::DIRECTIONAL));
        assert_eq!(LightType::from_kind("mesh"), None);

        // Flag names are a separate, case-sensitive lookup.
        assert_eq!(LightType::from_name("POINT"), Some(LightType::POINT));
        assert_eq!(LightType::from_name("point"), None);
        assert_eq!(LightType::AREA.name(), "area");
        assert_eq!((LightType::POINT | LightType::AREA).name(), "mixed");
        assert!((LightType::POINT | LightType::AREA).matches(LightType::AREA));
        assert!(!LightType::POINT.matches(LightType::SPOT));
    }

    #[test]
    fn unsupported_kinds_are_rejected() {
        let mut d = LightDescriptor::point("s", Point3f::ZERO, 1.0);
        d.kind = String::from("spot");
        let supported = PhotometryConstants::default().supported_types;
        let err = LightSource::from_descriptor(&d, supported).unwrap_err();
        assert!(err.contains("not supported"));

        d.kind = String::from("mesh");
        assert!(LightSource::from_descriptor(&d, supported).is_err());

        assert!(LightSource::from_descriptor(&d, LightType::all()).is_err());
        d.kind = String::from("spot");
        assert!(LightSource::from_descriptor(&d, LightType::all()).is_ok());
    }

    #[test]
    fn invalid_power_and_position() {
        let supported = LightType::POINT;
        let d = LightDescriptor::point("p", Point3f::ZERO, -1.0);
        assert!(LightSource::from_descriptor(&d, supported).is_err());

        let d = LightDescriptor::point("p", Point3f::new(Float::NAN, 0.0, 0.0), 1.0);
        assert!(LightSource::from_descriptor(&d, supported).is_err());

        let d = LightDescriptor::point("p", Point3f::ZERO, Float::INFINITY);
        assert!(LightSource::from_descriptor(&d, supported).is_err());
    }

    #[test]
    fn area_normal_is_normalized() {
        let d = LightDescriptor::area(
            "a",
            Point3f::ZERO,
            10.0,
            0.5,
            0.5,
            Vector3f::new(0.0, 0.0, -4.0),
        );
        let l = LightSource::from_descriptor(&d, LightType::AREA).unwrap();
        assert_eq!(l.light_type(), LightType::AREA);
        match l.emitter {
            Emitter::Area { normal, .. } => assert_eq!(normal, Vector3f::new(0.0, 0.0, -1.0)),
            Emitter::Point => panic!("expected area emitter"),
        }

        let d = LightDescriptor::area("a", Point3f::ZERO, 10.0, 0.0, 0.5, Vector3f::new(0.0, 0.0, -1.0));
        assert!(LightSource::from_descriptor(&d, LightType::AREA).is_err());
    }

    #[test]
    fn luminous_flux_uses_efficacy() {
        let d = LightDescriptor::point("p", Point3f::ZERO, 2.0);
        let l = LightSource::from_descriptor(&d, LightType::POINT).unwrap();
        assert_eq!(l.luminous_flux(PhotometryConstants::default().luminous_efficacy), 1366.0);
    }
}
