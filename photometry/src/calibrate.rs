//! Radiometric Calibration

use gonio::common::*;
use gonio::error::*;
use gonio::photometric::*;
use gonio::sampling::*;

/// Returns the solid angle weight `sin θ · Δθ · ΔØ` (steradians) of every
/// grid cell, indexed `[theta][phi]`.
///
/// Δθ is the vertical step, or π for a single row. ΔØ is the gap to the next
/// horizontal angle, wrapping around at 360°, or 2π for a single column.
///
/// * `vertical`   - Vertical angles θ in degrees.
/// * `horizontal` - Horizontal angles Ø in degrees.
pub fn solid_angle_weights(vertical: &[Float], horizontal: &[Float]) -> Vec<Vec<Float>> {
    let d_theta = if vertical.len() > 1 {
        radians(vertical[1] - vertical[0])
    } else {
        PI
    };

    let n = horizontal.len();
    let d_phi: Vec<Float> = (0..n)
        .map(|j| {
            if n == 1 {
                TWO_PI
            } else if j + 1 < n {
                radians(horizontal[j + 1] - horizontal[j])
            } else {
                radians(360.0 - horizontal[j] + horizontal[0])
            }
        })
        .collect();

    vertical
        .iter()
        .map(|theta| {
            let s = radians(*theta).sin() * d_theta;
            d_phi.iter().map(|dp| s * dp).collect()
        })
        .collect()
}

/// Returns the weighted sum `Σ v · w` of a grid of values over the sphere.
///
/// * `values`     - Values indexed `[theta][phi]`.
/// * `vertical`   - Vertical angles θ in degrees.
/// * `horizontal` - Horizontal angles Ø in degrees.
pub fn flux_integral(values: &[Vec<Float>], vertical: &[Float], horizontal: &[Float]) -> Float {
    let weights = solid_angle_weights(vertical, horizontal);
    values
        .iter()
        .zip(weights.iter())
        .flat_map(|(row, w)| row.iter().zip(w.iter()).map(|(v, w)| v * w))
        .sum()
}

/// Returns the factor that maps raw readings to candela so that the
/// distribution integrates to the declared flux.
///
/// * `result`       - Raw measurements.
/// * `total_lumens` - Declared total luminous flux.
pub fn calibration_factor(result: &SamplingResult, total_lumens: Float) -> Result<Float> {
    if !(total_lumens.is_finite() && total_lumens > 0.0) {
        return Err(GonioError::calibration(
            "total lumens must be positive",
            total_lumens,
            None,
        ));
    }

    let integral = flux_integral(
        &result.luminance,
        &result.vertical_angles,
        &result.horizontal_angles,
    );
    if !integral.is_finite() || integral <= 0.0 {
        return Err(GonioError::calibration(
            format!("raw flux integral is {integral}; no light was measured"),
            total_lumens,
            None,
        ));
    }

    let k = total_lumens / integral;
    if !k.is_finite() {
        return Err(GonioError::calibration(
            "calibration factor is not finite",
            total_lumens,
            Some(k),
        ));
    }
    Ok(k)
}

/// Converts raw measurements to absolute candela.
///
/// * `result`       - Raw measurements; must pass the integrity check.
/// * `total_lumens` - Declared total luminous flux.
/// * `distance`     - Measurement distance in meters.
/// * `fixture_name` - Fixture name.
pub fn calibrate(
    result: &SamplingResult,
    total_lumens: Float,
    distance: Float,
    fixture_name: &str,
) -> Result<PhotometricData> {
    result.check_integrity()?;
    let k = calibration_factor(result, total_lumens)?;

    let candela: Vec<Vec<Float>> = result
        .luminance
        .iter()
        .map(|row| row.iter().map(|v| (v * k).max(0.0)).collect())
        .collect();

    let data = PhotometricData {
        vertical_angles: result.vertical_angles.clone(),
        horizontal_angles: result.horizontal_angles.clone(),
        candela,
        total_lumens,
        distance_meters: distance,
        fixture_name: fixture_name.to_string(),
    };
    data.check()?;

    if let Some(stats) = data.statistics() {
        debug!("Calibration factor {k:.6e}; candela {stats}");
    }
    Ok(data)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use gonio::geometry::*;
    use proptest::prelude::*;

    fn angles(interval: Float) -> (Vec<Float>, Vec<Float>) {
        let nt = gonio::config::num_theta(interval);
        let np = gonio::config::num_phi(interval);
        (
            (0..nt).map(|i| i as Float * interval).collect(),
            (0..np).map(|j| j as Float * interval).collect(),
        )
    }

    fn uniform(interval: Float, value: Float) -> SamplingResult {
        let (v, h) = angles(interval);
        let mut r = SamplingResult::new_unsampled(v, h, Point3f::ZERO);
        for row in r.luminance.iter_mut() {
            row.iter_mut().for_each(|c| *c = value);
        }
        r
    }

    #[test]
    fn weights_cover_the_sphere() {
        let (v, h) = angles(5.0);
        let total: Float = solid_angle_weights(&v, &h).iter().flatten().sum();
        assert!(approx_eq!(Float, total, FOUR_PI, epsilon = FOUR_PI * 0.01));
    }

    #[test]
    fn horizontal_gap_wraps() {
        let w = solid_angle_weights(&[90.0], &[0.0, 90.0, 270.0]);
        assert!(approx_eq!(Float, w[0][0], PI * PI / 2.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, w[0][1], PI * PI, epsilon = 1e-12));
        assert!(approx_eq!(Float, w[0][2], PI * PI / 2.0, epsilon = 1e-12));

        let w = solid_angle_weights(&[90.0], &[0.0]);
        assert!(approx_eq!(Float, w[0][0], TWO_PI * PI, epsilon = 1e-12));
    }

    #[test]
    fn uniform_grid_is_isotropic() {
        let r = uniform(10.0, 3.0);
        let data = calibrate(&r, 1800.0, 5.0, "Lamp").unwrap();
        let expected = 1800.0 / FOUR_PI;
        for v in data.candela.iter().flatten() {
            assert!((v - expected).abs() / expected < 0.01);
        }
        assert_eq!(data.fixture_name, "Lamp");
        assert_eq!(data.distance_meters, 5.0);
    }

    #[test]
    fn zero_signal_is_a_calibration_error() {
        let r = uniform(10.0, 0.0);
        match calibrate(&r, 1800.0, 5.0, "Lamp") {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Calibration),
            Ok(_) => panic!("expected calibration error"),
        }
    }

    #[test]
    fn non_positive_lumens_are_rejected() {
        let r = uniform(10.0, 1.0);
        for lumens in [0.0, -5.0, Float::NAN, Float::INFINITY] {
            match calibration_factor(&r, lumens) {
                Err(e) => assert_eq!(e.kind(), ErrorKind::Calibration),
                Ok(_) => panic!("expected calibration error for {lumens}"),
            }
        }
    }

    #[test]
    fn incomplete_result_is_a_validation_error() {
        let mut r = uniform(10.0, 1.0);
        r.luminance[3][4] = Float::NAN;
        match calibrate(&r, 1800.0, 5.0, "Lamp") {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Validation),
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn negative_readings_clamp_to_zero() {
        let mut r = uniform(10.0, 1.0);
        r.luminance[5][5] = -0.5;
        let data = calibrate(&r, 1000.0, 5.0, "Lamp").unwrap();
        assert_eq!(data.candela[5][5], 0.0);
        assert!(data.validate_data());
    }

    proptest! {
        #[test]
        fn flux_is_conserved(
            interval in prop_oneof![Just(5.0), Just(7.0), Just(10.0), Just(15.0), Just(45.0)],
            lumens in 1.0..100_000.0f64,
            skew in 0.0..5.0f64,
        ) {
            // Brighter towards the floor, like a downlight.
            let (v, h) = angles(interval);
            let mut r = SamplingResult::new_unsampled(v, h, Point3f::ZERO);
            let vertical = r.vertical_angles.clone();
            for (row, theta) in r.luminance.iter_mut().zip(vertical.iter()) {
                let value = 1.0 + skew * radians(*theta).cos().max(0.0);
                row.iter_mut().for_each(|c| *c = value);
            }

            let data = calibrate(&r, lumens, 5.0, "Lamp").unwrap();
            let flux = flux_integral(&data.candela, &data.vertical_angles, &data.horizontal_angles);
            prop_assert!((flux - lumens).abs() / lumens < 0.01);
        }
    }
}
