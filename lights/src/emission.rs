//! Emission Model

use gonio::common::*;
use gonio::geometry::*;
use gonio::light::*;

/// Returns the radiant intensity (W/sr) a light emits in a direction.
///
/// Point lights are isotropic, `Φ / 4π`. Area lights are one-sided
/// Lambertian emitters, `Φ / π · cos θ` where θ is measured from the emitter
/// normal, and emit nothing behind them.
///
/// * `light`     - The light.
/// * `direction` - Unit direction from the light towards the receiver.
pub fn radiant_intensity(light: &LightSource, direction: &Vector3f) -> Float {
    let power = light.radiant_power_watts;
    match light.emitter {
        Emitter::Point => power * INV_FOUR_PI,
        Emitter::Area { normal, .. } => power * INV_PI * normal.dot(direction).max(0.0),
    }
}

/// Returns the irradiance (W/m²) a light produces at a point facing it.
/// Returns 0 when the point coincides with the light.
///
/// * `light` - The light.
/// * `p`     - The receiving point.
pub fn irradiance_at(light: &LightSource, p: &Point3f) -> Float {
    let d = *p - light.world_position;
    let dist2 = d.length_squared();
    match d.normalize() {
        Some(dir) if dist2 > 0.0 => radiant_intensity(light, &dir) / dist2,
        _ => 0.0,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    fn integrate_over_sphere(light: &LightSource) -> Float {
        // Midpoint rule on a 1° grid.
        let n_theta = 180;
        let n_phi = 360;
        let d_theta = PI / n_theta as Float;
        let d_phi = TWO_PI / n_phi as Float;
        let mut sum = 0.0;
        for i in 0..n_theta {
            let theta = (i as Float + 0.5) * d_theta;
            for j in 0..n_phi {
                let phi = (j as Float + 0.5) * d_phi;
                let p = spherical_to_cartesian(degrees(theta), degrees(phi), 1.0, &Point3f::ZERO);
                let dir = Vector3f::from(p);
                sum += radiant_intensity(light, &dir) * theta.sin() * d_theta * d_phi;
            }
        }
        sum
    }

    #[test]
    fn point_light_is_isotropic() {
        let d = LightDescriptor::point("p", Point3f::ZERO, 4.0 * PI);
        let l = LightSource::from_descriptor(&d, LightType::POINT).unwrap();
        assert!(approx_eq!(Float, radiant_intensity(&l, &Vector3f::new(0.0, 0.0, 1.0)), 1.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, radiant_intensity(&l, &Vector3f::new(1.0, 0.0, 0.0)), 1.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, integrate_over_sphere(&l), 4.0 * PI, epsilon = 1e-3));
    }

    #[test]
    fn area_light_is_one_sided_lambertian() {
        let d = LightDescriptor::area("a", Point3f::ZERO, PI, 1.0, 1.0, Vector3f::new(0.0, 0.0, -1.0));
        let l = LightSource::from_descriptor(&d, LightType::AREA).unwrap();
        assert!(approx_eq!(Float, radiant_intensity(&l, &Vector3f::new(0.0, 0.0, -1.0)), 1.0, epsilon = 1e-12));
        assert_eq!(radiant_intensity(&l, &Vector3f::new(0.0, 0.0, 1.0)), 0.0);
        assert!(approx_eq!(Float, integrate_over_sphere(&l), PI, epsilon = 1e-3));
    }

    #[test]
    fn irradiance_follows_inverse_square() {
        let d = LightDescriptor::point("p", Point3f::ZERO, 4.0 * PI);
        let l = LightSource::from_descriptor(&d, LightType::POINT).unwrap();
        assert!(approx_eq!(Float, irradiance_at(&l, &Point3f::new(0.0, 2.0, 0.0)), 0.25, epsilon = 1e-12));
        assert_eq!(irradiance_at(&l, &Point3f::ZERO), 0.0);
    }
}
