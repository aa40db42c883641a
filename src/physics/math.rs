//! Vector algebra and sampling helpers for the simulation core
//!
//! [`Vector3`] refuses to operate on non-finite components: every arithmetic
//! operation checks its operands and panics with the offending value instead
//! of letting a NaN or infinity spread through the body set.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

const PI: Scalar = std::f64::consts::PI;

/// 3D vector used for positions, velocities and impulses.
///
/// Persisted as `{"X": .., "Y": .., "Z": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Vector3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Panics if any component is NaN or infinite.
    #[inline]
    #[track_caller]
    pub fn assert_finite(self, context: &str) -> Self {
        assert!(
            self.is_finite(),
            "non-finite vector in {context}: ({}, {}, {})",
            self.x,
            self.y,
            self.z
        );
        self
    }

    #[inline]
    #[track_caller]
    pub fn dot(self, other: Self) -> Scalar {
        let a = self.assert_finite("dot");
        let b = other.assert_finite("dot");
        a.x * b.x + a.y * b.y + a.z * b.z
    }

    #[inline]
    #[track_caller]
    pub fn cross(self, other: Self) -> Self {
        let a = self.assert_finite("cross");
        let b = other.assert_finite("cross");
        Self::new(
            a.y * b.z - b.y * a.z,
            b.x * a.z - a.x * b.z,
            a.x * b.y - b.x * a.y,
        )
    }

    #[inline]
    #[track_caller]
    pub fn length_squared(self) -> Scalar {
        self.dot(self)
    }

    #[inline]
    #[track_caller]
    pub fn length(self) -> Scalar {
        libm::sqrt(self.length_squared())
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    #[inline]
    #[track_caller]
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::ZERO;
        }
        self.scaled(1.0 / length)
    }

    #[inline]
    #[track_caller]
    pub fn scaled(self, n: Scalar) -> Self {
        let v = self.assert_finite("scale");
        assert!(n.is_finite(), "non-finite scale factor: {n}");
        Self::new(v.x * n, v.y * n, v.z * n)
    }

    #[inline]
    #[track_caller]
    pub fn distance(self, other: Self) -> Scalar {
        (other - self).length()
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Add for Vector3 {
    type Output = Self;

    #[track_caller]
    fn add(self, rhs: Self) -> Self {
        let a = self.assert_finite("add");
        let b = rhs.assert_finite("add");
        Self::new(a.x + b.x, a.y + b.y, a.z + b.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    #[track_caller]
    fn sub(self, rhs: Self) -> Self {
        let a = self.assert_finite("sub");
        let b = rhs.assert_finite("sub");
        Self::new(a.x - b.x, a.y - b.y, a.z - b.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    #[track_caller]
    fn neg(self) -> Self {
        self.scaled(-1.0)
    }
}

impl Mul<Scalar> for Vector3 {
    type Output = Self;

    #[track_caller]
    fn mul(self, rhs: Scalar) -> Self {
        self.scaled(rhs)
    }
}

impl Div<Scalar> for Vector3 {
    type Output = Self;

    #[track_caller]
    fn div(self, rhs: Scalar) -> Self {
        assert!(rhs != 0.0, "vector divided by zero");
        self.scaled(1.0 / rhs)
    }
}

impl AddAssign for Vector3 {
    #[track_caller]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector3 {
    #[track_caller]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// Half-space boundary used by the renderer's visibility tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub point: Vector3,
}

impl Plane {
    /// The normal is stored normalized.
    pub fn new(normal: Vector3, point: Vector3) -> Self {
        Self {
            normal: normal.normalized(),
            point,
        }
    }

    /// Plane through three points, facing the side from which `a -> b -> c`
    /// winds counter-clockwise.
    pub fn from_points(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self::new((b - a).cross(c - a), a)
    }

    /// Signed distance; positive on the side the normal points to.
    pub fn distance(&self, point: Vector3) -> Scalar {
        self.normal.dot(point - self.point)
    }

    pub fn contains_in_front(&self, point: Vector3) -> bool {
        self.distance(point) >= 0.0
    }
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vector3 {
    let theta = rng.random_range(0.0..=2.0 * PI);
    let phi = libm::acos(rng.random_range(-1.0..=1.0));

    Vector3::new(
        libm::sin(phi) * libm::cos(theta),
        libm::sin(phi) * libm::sin(theta),
        libm::cos(phi),
    )
}

/// Uniformly distributed point inside a ball of the given radius around `center`.
pub fn random_point_in_ball<R: Rng + ?Sized>(
    rng: &mut R,
    center: Vector3,
    radius: Scalar,
) -> Vector3 {
    if radius <= 0.0 {
        return center;
    }
    // cube root keeps the density uniform in volume rather than in radius
    let r = radius * libm::cbrt(rng.random_range(0.0..=1.0));
    center + random_unit_vector(rng) * r
}

/// Radius of a sphere of the given mass at constant density.
pub fn radius_for_mass(mass: Scalar, density: Scalar) -> Scalar {
    libm::cbrt(3.0 * mass / (4.0 * PI * density))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_normalized_has_unit_length() {
        let v = Vector3::new(1.0, 1.0, 1.0).normalized();
        assert_relative_eq!(v.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalized_zero_is_zero() {
        assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let v = Vector3::new(-3.5, 7.25, 1e6);
        assert_eq!(v.distance(v), 0.0);
    }

    #[test]
    fn test_cross_of_axes() {
        assert_eq!(Vector3::X.cross(Vector3::Y), Vector3::Z);
        assert_eq!(Vector3::Y.cross(Vector3::Z), Vector3::X);
        assert_eq!(Vector3::Y.cross(Vector3::X), -Vector3::Z);
    }

    #[test]
    fn test_dot_and_arithmetic() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, -5.0, 6.0);
        assert_eq!(a.dot(b), 12.0);
        assert_eq!(a + b, Vector3::new(5.0, -3.0, 9.0));
        assert_eq!(a - b, Vector3::new(-3.0, 7.0, -3.0));
        assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(b / 2.0, Vector3::new(2.0, -2.5, 3.0));
    }

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), Vector3::ZERO);

        assert_eq!(plane.distance(Vector3::new(0.0, 0.0, 1.0)), 1.0);
        assert_eq!(plane.distance(Vector3::new(0.0, 0.0, 0.0)), 0.0);
        assert_eq!(plane.distance(Vector3::new(1.0, 1.0, 0.0)), 0.0);
        assert!(!plane.contains_in_front(Vector3::new(0.0, 0.0, -0.5)));
    }

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(Vector3::ZERO, Vector3::X, Vector3::Y);
        assert_eq!(plane.normal, Vector3::Z);
        assert_relative_eq!(plane.distance(Vector3::new(5.0, 5.0, 2.0)), 2.0);
    }

    #[test]
    #[should_panic(expected = "non-finite vector")]
    fn test_nan_operand_panics() {
        let _ = Vector3::new(Scalar::NAN, 0.0, 0.0) + Vector3::X;
    }

    #[test]
    #[should_panic(expected = "non-finite vector")]
    fn test_infinite_operand_panics_in_length() {
        let _ = Vector3::new(0.0, Scalar::INFINITY, 0.0).length();
    }

    #[test]
    fn test_vector_serializes_with_uppercase_keys() {
        let json = serde_json::to_string(&Vector3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, r#"{"X":1.0,"Y":2.0,"Z":3.0}"#);
    }

    #[test]
    fn test_random_unit_vector_properties() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let v = random_unit_vector(&mut rng);
            assert!(
                (v.length() - 1.0).abs() < 1e-10,
                "Vector length should be 1, but was: {}",
                v.length()
            );
        }
    }

    #[test]
    fn test_random_point_in_ball_stays_inside() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let center = Vector3::new(10.0, -4.0, 2.0);
        for _ in 0..10_000 {
            let p = random_point_in_ball(&mut rng, center, 3.0);
            assert!(p.distance(center) <= 3.0 + 1e-12);
        }
        assert_eq!(random_point_in_ball(&mut rng, center, 0.0), center);
    }

    #[test]
    fn test_radius_for_mass_round_trips_volume() {
        let radius = radius_for_mass(8.0, 2.0);
        let volume = 4.0 / 3.0 * PI * radius.powi(3);
        assert_relative_eq!(volume * 2.0, 8.0, epsilon = 1e-12);
    }
}
