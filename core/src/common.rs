//! Common

/// Use 64-bit precision for floating point numbers.
pub type Float = f64;

/// PI (π)
pub const PI: Float = std::f64::consts::PI;

/// 2*PI (2π)
pub const TWO_PI: Float = PI * 2.0;

/// 4*PI (4π)
pub const FOUR_PI: Float = PI * 4.0;

/// 1/PI (1/π)
pub const INV_PI: Float = 1.0 / PI;

/// 1/4*PI (1/4π)
pub const INV_FOUR_PI: Float = 1.0 / FOUR_PI;

/// Luminous efficacy (lm/W) used to convert radiant watts to lumens.
pub const LUMINOUS_EFFICACY: Float = 683.0;

/// Tolerance used when counting angular steps so that exact divisors such as
/// 180/7.2 are not lost to rounding.
pub const ANGLE_EPSILON: Float = 1e-9;

/// Convert degrees to radians.
///
/// * `deg` - Angle in degrees.
#[inline(always)]
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Convert radians to degrees.
///
/// * `rad` - Angle in radians.
#[inline(always)]
pub fn degrees(rad: Float) -> Float {
    (180.0 / PI) * rad
}

/// Clamp the given value to a range.
///
/// * `val`  - The value.
/// * `low`  - Low end of range.
/// * `high` - High end of range.
#[inline(always)]
pub fn clamp<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Formats a duration given in seconds as "N s", "M min S s" or "H.h h".
///
/// * `seconds` - Duration in seconds.
pub fn format_duration(seconds: Float) -> String {
    if seconds < 60.0 {
        format!("{} s", seconds.max(0.0) as u64)
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0) as u64;
        let remaining = (seconds % 60.0) as u64;
        format!("{minutes} min {remaining} s")
    } else {
        format!("{:.1} h", seconds / 3600.0)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
