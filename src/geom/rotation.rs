//! Finite rotations of the sphere and geometry reconstruction.
//!
//! Rotations are stored as unit quaternions. Composition, inversion and
//! interpolation stay on the quaternion side; vectors are rotated with the
//! usual `q v q*` sandwich expanded into cross products.

use std::sync::Arc;

use serde::Serialize;

use super::core::{LatLonPoint, Tolerance, UnitVector3, Vec3};
use super::geometry::{
    GeometryOnSphere, MultiPointOnSphere, PointOnSphere, PolygonOnSphere, PolylineOnSphere,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Quaternion {
    w: f64,
    v: Vec3,
}

impl Quaternion {
    const IDENTITY: Self = Self {
        w: 1.0,
        v: Vec3::ZERO,
    };

    fn mul(self, rhs: Self) -> Self {
        Self {
            w: self.w * rhs.w - self.v.dot(rhs.v),
            v: rhs.v * self.w + self.v * rhs.w + self.v.cross(rhs.v),
        }
    }

    fn conjugate(self) -> Self {
        Self {
            w: self.w,
            v: -self.v,
        }
    }

    fn dot(self, rhs: Self) -> f64 {
        self.w * rhs.w + self.v.dot(rhs.v)
    }

    fn scaled(self, s: f64) -> Self {
        Self {
            w: self.w * s,
            v: self.v * s,
        }
    }

    fn add(self, rhs: Self) -> Self {
        Self {
            w: self.w + rhs.w,
            v: self.v + rhs.v,
        }
    }

    fn normalized(self) -> Self {
        let norm = self.dot(self).sqrt();
        if norm > 0.0 && norm.is_finite() {
            self.scaled(1.0 / norm)
        } else {
            Self::IDENTITY
        }
    }
}

/// A rotation of the unit sphere about an Euler pole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiniteRotation {
    q: Quaternion,
}

impl FiniteRotation {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            q: Quaternion::IDENTITY,
        }
    }

    /// Rotation by `angle_deg` degrees (counter-clockwise looking down on the
    /// pole) about `pole`.
    #[must_use]
    pub fn from_euler_pole(pole: UnitVector3, angle_deg: f64) -> Self {
        let half = 0.5 * angle_deg.to_radians();
        let (sin_half, cos_half) = half.sin_cos();
        Self {
            q: Quaternion {
                w: cos_half,
                v: pole.as_vec3() * sin_half,
            }
            .normalized(),
        }
    }

    /// Same as [`FiniteRotation::from_euler_pole`] with the pole in degrees.
    #[must_use]
    pub fn from_lat_lon_pole(pole_lat: f64, pole_lon: f64, angle_deg: f64) -> Self {
        Self::from_euler_pole(LatLonPoint::new(pole_lat, pole_lon).to_unit_vector(), angle_deg)
    }

    /// Whether this rotation is the identity within `tol`.
    #[must_use]
    pub fn is_identity(&self, tol: Tolerance) -> bool {
        self.q.v.length() <= tol.eps
    }

    /// Euler pole and angle in degrees, or `None` for the identity.
    #[must_use]
    pub fn euler_pole_and_angle(&self) -> Option<(UnitVector3, f64)> {
        let pole = self.q.v.normalized()?;
        let angle = 2.0 * self.q.v.length().atan2(self.q.w);
        Some((pole, angle.to_degrees()))
    }

    /// `self` applied after `first`.
    #[must_use]
    pub fn compose(&self, first: &Self) -> Self {
        Self {
            q: self.q.mul(first.q).normalized(),
        }
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate(),
        }
    }

    /// Spherical linear interpolation: `t = 0` yields `self`, `t = 1` yields `to`.
    #[must_use]
    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        let mut end = to.q;
        let mut cos_theta = self.q.dot(end);
        // q and -q are the same rotation; take the short way round.
        if cos_theta < 0.0 {
            end = end.scaled(-1.0);
            cos_theta = -cos_theta;
        }

        let q = if cos_theta > 1.0 - Tolerance::DEFAULT.eps {
            self.q.scaled(1.0 - t).add(end.scaled(t))
        } else {
            let theta = cos_theta.clamp(-1.0, 1.0).acos();
            let sin_theta = theta.sin();
            let a = ((1.0 - t) * theta).sin() / sin_theta;
            let b = (t * theta).sin() / sin_theta;
            self.q.scaled(a).add(end.scaled(b))
        };
        Self { q: q.normalized() }
    }

    #[must_use]
    pub fn rotate(&self, v: UnitVector3) -> UnitVector3 {
        let p = v.as_vec3();
        let u = self.q.v;
        let t = u.cross(p) * 2.0;
        let rotated = p + t * self.q.w + u.cross(t);
        rotated.normalized().unwrap_or(v)
    }
}

impl Default for FiniteRotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotates every vertex of `geometry` by `rotation`.
///
/// Rotation preserves arc lengths, so rotated polylines and polygons keep
/// their construction invariants. Should rounding ever break one, the
/// unrotated geometry is returned and the failure is logged.
#[must_use]
pub fn reconstruct(geometry: &GeometryOnSphere, rotation: &FiniteRotation) -> GeometryOnSphere {
    if rotation.is_identity(Tolerance::ZERO_LENGTH) {
        return geometry.clone();
    }

    let rotate_all = |vertices: &[UnitVector3]| -> Vec<UnitVector3> {
        vertices.iter().map(|v| rotation.rotate(*v)).collect()
    };

    let rotated = match geometry {
        GeometryOnSphere::Point(point) => {
            Ok(GeometryOnSphere::Point(PointOnSphere::new(rotation.rotate(point.position()))))
        }
        GeometryOnSphere::MultiPoint(multi) => MultiPointOnSphere::new(rotate_all(multi.points()))
            .map(|m| GeometryOnSphere::MultiPoint(Arc::new(m))),
        GeometryOnSphere::Polyline(polyline) => {
            PolylineOnSphere::new(rotate_all(polyline.vertices()))
                .map(|p| GeometryOnSphere::Polyline(Arc::new(p)))
        }
        GeometryOnSphere::Polygon(polygon) => PolygonOnSphere::new(rotate_all(polygon.vertices()))
            .map(|p| GeometryOnSphere::Polygon(Arc::new(p))),
    };

    rotated.unwrap_or_else(|err| {
        log::warn!(
            "rotated {} lost a construction invariant ({err}); keeping unrotated geometry",
            geometry.type_name()
        );
        geometry.clone()
    })
}
