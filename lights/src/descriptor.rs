//! Light Descriptors

use gonio::geometry::*;
use gonio::light::*;
use gonio::paramset::*;

/// Create a `LightDescriptor` from a scene `LightSource` statement.
///
/// Recognized parameters are `string name`, `point3 from`, `float power`,
/// `float scale`, `rgb color` and, for area lights, `float width`,
/// `float height` and `normal N`.
///
/// * `kind`   - Light kind as written in the scene.
/// * `params` - Statement parameters.
/// * `index`  - Position of the statement among the scene lights, used to
///              name lights that do not have a name.
pub fn make_light_descriptor(kind: &str, params: &ParamSet, index: usize) -> LightDescriptor {
    let id = params.find_one_string("name", format!("{kind}_{index}"));
    let position = params.find_one_point3f("from", Point3f::ZERO);
    let power = params.find_one_float("power", 1.0) * params.find_one_float("scale", 1.0);
    let color = params.find_one_rgb("color", [1.0, 1.0, 1.0]);

    let is_area = LightType::from_kind(kind) == Some(LightType::AREA);
    let (width, height, normal) = if is_area {
        (
            Some(params.find_one_float("width", 1.0)),
            Some(params.find_one_float("height", 1.0)),
            Some(params.find_one_vector3f("N", Vector3f::new(0.0, 0.0, -1.0))),
        )
    } else {
        (None, None, None)
    };

    debug!("Light '{id}' ({kind}) at {position}, {power} W");
    LightDescriptor {
        id,
        kind: kind.to_string(),
        position,
        power,
        color,
        width,
        height,
        normal,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_from_params() {
        let mut ps = ParamSet::new();
        ps.add_string("name", &[String::from("bulb")]);
        ps.add_point3f("from", &[Point3f::new(0.0, 0.0, 1.0)]);
        ps.add_float("power", &[10.0]);
        ps.add_float("scale", &[2.0]);
        ps.add_rgb("color", &[1.0, 0.9, 0.8]);

        let d = make_light_descriptor("point", &ps, 0);
        assert_eq!(d.id, "bulb");
        assert_eq!(d.kind, "point");
        assert_eq!(d.position, Point3f::new(0.0, 0.0, 1.0));
        assert_eq!(d.power, 20.0);
        assert_eq!(d.color, [1.0, 0.9, 0.8]);
        assert!(d.width.is_none());
        assert!(d.normal.is_none());
    }

    #[test]
    fn area_light_defaults() {
        let d = make_light_descriptor("area", &ParamSet::new(), 3);
        assert_eq!(d.id, "area_3");
        assert_eq!(d.power, 1.0);
        assert_eq!(d.width, Some(1.0));
        assert_eq!(d.height, Some(1.0));
        assert_eq!(d.normal, Some(Vector3f::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn unknown_kind_is_kept_for_validation() {
        let d = make_light_descriptor("mesh", &ParamSet::new(), 1);
        assert_eq!(d.kind, "mesh");
        assert!(LightSource::from_descriptor(&d, PhotometryConstants::default().supported_types).is_err());
    }
}
