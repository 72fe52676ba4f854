use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

/// Free 3-vector used for intermediate results (cross products, sums) that
/// are not constrained to the unit sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Normalizes the vector, or `None` when it is (numerically) zero.
    #[must_use]
    pub fn normalized(self) -> Option<UnitVector3> {
        let len = self.length();
        if len.is_finite() && len > Tolerance::ZERO_LENGTH.eps {
            Some(UnitVector3::new_unchecked(
                self.x / len,
                self.y / len,
                self.z / len,
            ))
        } else {
            None
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UnitVector3
// ─────────────────────────────────────────────────────────────────────────────

/// A unit-length 3-vector: a position on the unit sphere.
///
/// Only constructed through normalizing paths so the length invariant holds
/// up to floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitVector3 {
    x: f64,
    y: f64,
    z: f64,
}

impl UnitVector3 {
    /// Geographic north pole.
    pub const NORTH_POLE: Self = Self::new_unchecked(0.0, 0.0, 1.0);
    /// Geographic south pole.
    pub const SOUTH_POLE: Self = Self::new_unchecked(0.0, 0.0, -1.0);

    pub(crate) const fn new_unchecked(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Normalizes `(x, y, z)`; `None` for a zero or non-finite input.
    #[must_use]
    pub fn try_new(x: f64, y: f64, z: f64) -> Option<Self> {
        Vec3::new(x, y, z).normalized()
    }

    #[must_use]
    pub const fn x(self) -> f64 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> f64 {
        self.y
    }

    #[must_use]
    pub const fn z(self) -> f64 {
        self.z
    }

    #[must_use]
    pub const fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Vec3 {
        self.as_vec3().cross(rhs.as_vec3())
    }

    #[must_use]
    pub const fn antipode(self) -> Self {
        Self::new_unchecked(-self.x, -self.y, -self.z)
    }

    /// Angular distance in radians, robust for both tiny and near-π angles.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        self.cross(other).length().atan2(self.dot(other))
    }

    /// Whether the two positions coincide within `tol` (chord length).
    #[must_use]
    pub fn coincides_with(self, other: Self, tol: Tolerance) -> bool {
        (self.as_vec3() - other.as_vec3()).length_squared() <= tol.eps_squared()
    }

    /// Whether the two positions are antipodal within `tol`.
    #[must_use]
    pub fn is_antipodal_to(self, other: Self, tol: Tolerance) -> bool {
        self.coincides_with(other.antipode(), tol)
    }

    #[must_use]
    pub fn to_lat_lon(self) -> LatLonPoint {
        LatLonPoint::from(self)
    }
}

impl From<UnitVector3> for Vec3 {
    fn from(v: UnitVector3) -> Self {
        v.as_vec3()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LatLonPoint
// ─────────────────────────────────────────────────────────────────────────────

/// Geographic coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonPoint {
    pub lat: f64,
    pub lon: f64,
}

impl LatLonPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub fn to_unit_vector(self) -> UnitVector3 {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        UnitVector3::new_unchecked(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }
}

impl From<UnitVector3> for LatLonPoint {
    fn from(v: UnitVector3) -> Self {
        let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
        // atan2 yields [-180, 180]; fold -180 onto 180.
        let mut lon = v.y.atan2(v.x).to_degrees();
        if lon <= -180.0 {
            lon += 360.0;
        }
        Self::new(lat, lon)
    }
}

impl From<LatLonPoint> for UnitVector3 {
    fn from(p: LatLonPoint) -> Self {
        p.to_unit_vector()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for geometric operations.
///
/// Presets:
/// - `Tolerance::DEFAULT` - crossing and endpoint tests on the unit sphere (1e-9)
/// - `Tolerance::ZERO_LENGTH` - degenerate arcs and zero-length vectors (1e-12)
/// - `Tolerance::POLE_WINDING` - total longitude sweep of a pole-enclosing ring (1e-8 degrees)
/// - `Tolerance::CLOSENESS` - proximity score ties (1e-12)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// Tolerance for detecting zero-length vectors and arcs (1e-12).
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    /// Tolerance on `|sum of longitude deltas| - 360` in degrees (1e-8).
    pub const POLE_WINDING: Self = Self { eps: 1e-8 };

    /// Tolerance when comparing two proximity scores (1e-12).
    pub const CLOSENESS: Self = Self { eps: 1e-12 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn default_geom() -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[must_use]
    pub fn approx_zero_f64(self, a: f64) -> bool {
        a.abs() <= self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
