//! Geometry
//!
//! World frame is right-handed with +Z up. Spherical angles follow the
//! photometric (Type C) convention used throughout the workspace:
//!
//! * θ = 0° points straight down (-Z), θ = 90° lies on the horizontal plane
//!   and θ = 180° points straight up (+Z).
//! * Ø = 0° points along +X and increases towards +Y.

use crate::common::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 3-D point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,

    /// Z-coordinate.
    pub z: Float,
}

/// A 3-D vector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3f {
    /// X-component.
    pub x: Float,

    /// Y-component.
    pub y: Float,

    /// Z-component.
    pub z: Float,
}

impl Point3f {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Creates a new 3-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub const fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    /// Returns true if all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Returns the squared distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance_squared(&self, other: &Self) -> Float {
        (*self - *other).length_squared()
    }

    /// Returns the distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance(&self, other: &Self) -> Float {
        self.distance_squared(other).sqrt()
    }
}

impl Vector3f {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Creates a new 3-D vector.
    ///
    /// * `x` - X-component.
    /// * `y` - Y-component.
    /// * `z` - Z-component.
    pub const fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    /// Returns the square of the vector's length.
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the vector's length.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns the dot product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn dot(&self, other: &Self) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns a unit vector in the same direction or `None` for a zero or
    /// non-finite vector.
    pub fn normalize(&self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(*self / len)
        } else {
            None
        }
    }
}

impl Add<Vector3f> for Point3f {
    type Output = Point3f;

    fn add(self, v: Vector3f) -> Self::Output {
        Point3f::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Point3f {
    type Output = Vector3f;

    fn sub(self, other: Point3f) -> Self::Output {
        Vector3f::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Sub<Vector3f> for Point3f {
    type Output = Point3f;

    fn sub(self, v: Vector3f) -> Self::Output {
        Point3f::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Mul<Float> for Vector3f {
    type Output = Vector3f;

    fn mul(self, f: Float) -> Self::Output {
        Vector3f::new(self.x * f, self.y * f, self.z * f)
    }
}

impl Div<Float> for Vector3f {
    type Output = Vector3f;

    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        Vector3f::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl Neg for Vector3f {
    type Output = Vector3f;

    fn neg(self) -> Self::Output {
        Vector3f::new(-self.x, -self.y, -self.z)
    }
}

impl From<Point3f> for Vector3f {
    fn from(p: Point3f) -> Self {
        Vector3f::new(p.x, p.y, p.z)
    }
}

impl From<[Float; 3]> for Point3f {
    fn from(a: [Float; 3]) -> Self {
        Point3f::new(a[0], a[1], a[2])
    }
}

impl fmt::Display for Point3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(3);
        write!(f, "({:.*}, {:.*}, {:.*})", p, self.x, p, self.y, p, self.z)
    }
}

impl fmt::Display for Vector3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(3);
        write!(f, "[{:.*}, {:.*}, {:.*}]", p, self.x, p, self.y, p, self.z)
    }
}

/// Returns the point at spherical coordinates (θ, Ø, r) around a center.
///
/// * `theta`  - Vertical angle θ in degrees (0 = down, 180 = up).
/// * `phi`    - Horizontal angle Ø in degrees (0 = +X).
/// * `r`      - Radius.
/// * `center` - Center of the sphere.
pub fn spherical_to_cartesian(theta: Float, phi: Float, r: Float, center: &Point3f) -> Point3f {
    let (sin_theta, cos_theta) = radians(theta).sin_cos();
    let (sin_phi, cos_phi) = radians(phi).sin_cos();
    Point3f::new(
        r * sin_theta * cos_phi + center.x,
        r * sin_theta * sin_phi + center.y,
        -r * cos_theta + center.z,
    )
}

/// Recovers spherical coordinates (θ, Ø, r) of a point relative to a center.
/// Ø is in [0, 360) and is meaningless at the poles. Returns `None` when the
/// point coincides with the center.
///
/// * `p`      - The point.
/// * `center` - Center of the sphere.
pub fn cartesian_to_spherical(p: &Point3f, center: &Point3f) -> Option<(Float, Float, Float)> {
    let d = *p - *center;
    let r = d.length();
    if r <= 0.0 || !r.is_finite() {
        return None;
    }

    let theta = degrees(clamp(-d.z / r, -1.0, 1.0).acos());
    let mut phi = degrees(d.y.atan2(d.x));
    if phi < 0.0 {
        phi += 360.0;
    }
    if phi >= 360.0 {
        phi -= 360.0;
    }
    Some((theta, phi, r))
}

/// Returns the unweighted centroid of a set of points or `None` if empty.
///
/// * `points` - The points.
pub fn centroid(points: &[Point3f]) -> Option<Point3f> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as Float;
    let sum = points
        .iter()
        .fold(Vector3f::ZERO, |acc, p| Vector3f::new(acc.x + p.x, acc.y + p.y, acc.z + p.z));
    Some(Point3f::new(sum.x / n, sum.y / n, sum.z / n))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
