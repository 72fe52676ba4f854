//! Bounds, pole enclosure and point-in-boundary tests for closed boundaries
//! on the sphere.
//!
//! Boundary edges are great-circle arcs. Latitude bounds include the
//! poleward bulge of each arc, and the ray cast by [`locate_in`] meets each
//! edge at the latitude of its great circle.

use serde::Serialize;

use crate::geom::{GreatCircleArc, LatLonPoint, Tolerance, UnitVector3, Vec3};

/// Latitude/longitude extent of a boundary, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Bounds of nothing; including any point replaces every field.
    pub const EMPTY: Self = Self {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lon: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
    };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_lat > self.max_lat
    }

    pub fn include(&mut self, point: LatLonPoint) {
        self.include_lat(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lon = self.max_lon.max(point.lon);
    }

    fn include_lat(&mut self, lat: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
    }

    #[must_use]
    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Which geographic pole, if any, lies inside a closed boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PoleEnclosure {
    #[default]
    None,
    North,
    South,
}

/// Result of [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Membership {
    Outside,
    Inside,
    OnBoundary,
}

impl Membership {
    /// Inside or on the boundary.
    #[must_use]
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Inside | Self::OnBoundary)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounds
// ─────────────────────────────────────────────────────────────────────────────

/// Wraps a longitude difference into `(-180, 180]`.
fn wrap_longitude_delta(delta: f64) -> f64 {
    let wrapped = delta % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

fn edges(
    vertices: &[UnitVector3],
    closed: bool,
) -> impl Iterator<Item = (UnitVector3, UnitVector3)> + '_ {
    let count = if closed {
        vertices.len()
    } else {
        vertices.len().saturating_sub(1)
    };
    (0..count).map(move |i| (vertices[i], vertices[(i + 1) % vertices.len()]))
}

/// Latitudes of the poleward extremes of the arc from `a` to `b` that lie
/// strictly inside the arc.
fn arc_latitude_extremes(a: UnitVector3, b: UnitVector3) -> impl Iterator<Item = f64> {
    let arc = GreatCircleArc::new(a, b).ok();
    arc.into_iter().flat_map(|arc| {
        let axis = arc.rotation_axis();
        // Highest point of the great circle: the north pole projected onto
        // the arc's plane.
        let k = UnitVector3::NORTH_POLE.as_vec3();
        let top = (k - axis.as_vec3() * axis.z()).normalized();
        top.into_iter()
            .flat_map(|top| [top, top.antipode()])
            .filter(move |p| arc.spans(*p, Tolerance::DEFAULT))
            .map(|p| p.to_lat_lon().lat)
    })
}

/// Bounds of `vertices` and, for closed rings, the enclosed pole.
///
/// A ring encloses a pole when its longitude deltas, each wrapped into
/// `(-180, 180]`, sum to ±360° (within [`Tolerance::POLE_WINDING`]). The
/// enclosed pole is the one on the side of the larger absolute latitude
/// extreme. Enclosing a pole extends the bounds to that pole and to all
/// longitudes.
#[must_use]
pub fn compute_bounds(vertices: &[UnitVector3], closed: bool) -> (Bounds, PoleEnclosure) {
    let mut bounds = Bounds::EMPTY;
    for vertex in vertices {
        bounds.include(vertex.to_lat_lon());
    }
    for (a, b) in edges(vertices, closed) {
        for lat in arc_latitude_extremes(a, b) {
            bounds.include_lat(lat);
        }
    }

    if !closed || vertices.len() < 3 {
        return (bounds, PoleEnclosure::None);
    }

    let lat_lons: Vec<LatLonPoint> = vertices.iter().map(|v| v.to_lat_lon()).collect();
    let sweep: f64 = lat_lons
        .iter()
        .zip(lat_lons.iter().cycle().skip(1))
        .map(|(a, b)| wrap_longitude_delta(b.lon - a.lon))
        .sum();

    if !Tolerance::POLE_WINDING.approx_eq_f64(sweep.abs(), 360.0) {
        return (bounds, PoleEnclosure::None);
    }

    let north = bounds.max_lat.abs();
    let south = bounds.min_lat.abs();
    let pole = if north > south || (north == south && bounds.max_lat + bounds.min_lat >= 0.0) {
        bounds.max_lat = 90.0;
        PoleEnclosure::North
    } else {
        bounds.min_lat = -90.0;
        PoleEnclosure::South
    };
    bounds.min_lon = -180.0;
    bounds.max_lon = 180.0;
    (bounds, pole)
}

// ─────────────────────────────────────────────────────────────────────────────
// Point location
// ─────────────────────────────────────────────────────────────────────────────

/// Latitude (degrees) at which the edge from `a` to `b` crosses the meridian
/// at `lon`, which must lie within the edge's longitude span.
///
/// An edge on a great circle through both poles that spans any longitude
/// range runs over a pole and meets every meridian there.
fn crossing_latitude(a: UnitVector3, b: UnitVector3, lon: f64) -> f64 {
    let normal: Vec3 = a.cross(b);
    if Tolerance::ZERO_LENGTH.approx_zero_f64(normal.z) {
        return if a.z() + b.z() >= 0.0 { 90.0 } else { -90.0 };
    }
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    let tan_lat = -(normal.x * cos_lon + normal.y * sin_lon) / normal.z;
    tan_lat.atan().to_degrees()
}

/// Locates `point` relative to a closed ring of `vertices` with precomputed
/// `bounds` and `pole`.
///
/// A meridian ray is cast from the point towards the north pole (towards
/// the south pole when the ring encloses it) and the edges it crosses are
/// counted. Rings with fewer than three vertices have no interior.
#[must_use]
pub fn locate_in(
    point: UnitVector3,
    vertices: &[UnitVector3],
    bounds: &Bounds,
    pole: PoleEnclosure,
    tol: Tolerance,
) -> Membership {
    if vertices.iter().any(|v| v.coincides_with(point, tol)) {
        return Membership::OnBoundary;
    }
    if vertices.len() < 3 {
        return Membership::Outside;
    }

    let p = point.to_lat_lon();
    let rejected = match pole {
        PoleEnclosure::None => !bounds.contains_lat(p.lat),
        PoleEnclosure::North => p.lat < bounds.min_lat,
        PoleEnclosure::South => p.lat > bounds.max_lat,
    };
    if rejected {
        return Membership::Outside;
    }

    // Angular tolerance in degrees.
    let lat_eps = tol.eps.to_degrees();
    let northward = pole != PoleEnclosure::South;
    let mut crossings = 0_usize;

    for (a, b) in edges(vertices, true) {
        let (la, lb) = (a.to_lat_lon(), b.to_lat_lon());
        let delta = wrap_longitude_delta(lb.lon - la.lon);

        if delta.abs() <= lat_eps {
            // Edge along a meridian: only a containment test.
            let on_meridian = wrap_longitude_delta(p.lon - la.lon).abs() <= lat_eps;
            let (lo, hi) = (la.lat.min(lb.lat), la.lat.max(lb.lat));
            if on_meridian && p.lat >= lo - lat_eps && p.lat <= hi + lat_eps {
                return Membership::OnBoundary;
            }
            continue;
        }

        let (lo, hi) = if delta > 0.0 {
            (la.lon, la.lon + delta)
        } else {
            (la.lon + delta, la.lon)
        };
        let Some(lon) = [p.lon, p.lon + 360.0, p.lon - 360.0]
            .into_iter()
            .find(|t| lo <= *t && *t < hi)
        else {
            continue;
        };
        let lat = crossing_latitude(a, b, lon);

        if (lat - p.lat).abs() <= lat_eps {
            return Membership::OnBoundary;
        }
        if (northward && lat > p.lat) || (!northward && lat < p.lat) {
            crossings += 1;
        }
    }

    let odd = crossings % 2 == 1;
    if odd != (pole != PoleEnclosure::None) {
        Membership::Inside
    } else {
        Membership::Outside
    }
}

/// Locates `point` relative to a resolved boundary.
///
/// Open boundaries have no interior; only their vertices count as on the
/// boundary.
#[must_use]
pub fn locate(point: UnitVector3, boundary: &super::ResolvedBoundary) -> Membership {
    let tol = boundary.tolerance();
    match boundary.kind() {
        super::BoundaryKind::Closed => locate_in(
            point,
            boundary.vertices(),
            boundary.bounds(),
            boundary.pole(),
            tol,
        ),
        super::BoundaryKind::Open => {
            if boundary.vertices().iter().any(|v| v.coincides_with(point, tol)) {
                Membership::OnBoundary
            } else {
                Membership::Outside
            }
        }
    }
}
