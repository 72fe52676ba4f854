//! Point, multi-point, polyline and polygon geometries on the unit sphere.
//!
//! Every geometry is immutable once constructed. Polylines and polygons are
//! shared behind `Arc` inside [`GeometryOnSphere`], so cloning a geometry or
//! handing it to several sections never copies vertex data.

use std::sync::Arc;

use serde::Serialize;

use super::arc::GreatCircleArc;
use super::core::{LatLonPoint, UnitVector3};
use super::proximity::ProximityCriteria;

/// Errors raised while constructing geometries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// Too few vertices for the requested geometry type.
    #[error("{kind} needs at least {required} vertices, got {count}")]
    InsufficientVertices {
        kind: &'static str,
        required: usize,
        count: usize,
    },

    /// Two adjacent vertices coincide, so the arc between them is undefined.
    #[error("adjacent vertices coincide")]
    CoincidentVertices,

    /// Two adjacent vertices are antipodal, so the arc between them is ambiguous.
    #[error("adjacent vertices are antipodal")]
    AntipodalVertices,

    /// Adjacent-vertex failure annotated with the offending arc index.
    #[error("invalid arc {index}: {source}")]
    InvalidArc {
        index: usize,
        #[source]
        source: Box<GeometryError>,
    },
}

fn build_arcs(
    vertices: &[UnitVector3],
    closed: bool,
) -> Result<Vec<GreatCircleArc>, GeometryError> {
    let pairs = vertices.windows(2).map(|w| (w[0], w[1]));
    let closing = closed
        .then(|| (vertices[vertices.len() - 1], vertices[0]))
        .into_iter();

    pairs
        .chain(closing)
        .enumerate()
        .map(|(index, (a, b))| {
            GreatCircleArc::new(a, b).map_err(|source| GeometryError::InvalidArc {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Point / MultiPoint
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointOnSphere(UnitVector3);

impl PointOnSphere {
    #[must_use]
    pub const fn new(position: UnitVector3) -> Self {
        Self(position)
    }

    #[must_use]
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self(LatLonPoint::new(lat, lon).to_unit_vector())
    }

    #[must_use]
    pub const fn position(&self) -> UnitVector3 {
        self.0
    }
}

impl From<UnitVector3> for PointOnSphere {
    fn from(position: UnitVector3) -> Self {
        Self(position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiPointOnSphere {
    points: Vec<UnitVector3>,
}

impl MultiPointOnSphere {
    /// # Errors
    /// Returns [`GeometryError::InsufficientVertices`] for an empty point set.
    pub fn new(points: Vec<UnitVector3>) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::InsufficientVertices {
                kind: "multi-point",
                required: 1,
                count: 0,
            });
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[UnitVector3] {
        &self.points
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polyline
// ─────────────────────────────────────────────────────────────────────────────

/// Open sequence of great-circle arcs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineOnSphere {
    vertices: Vec<UnitVector3>,
    #[serde(skip)]
    arcs: Vec<GreatCircleArc>,
}

impl PolylineOnSphere {
    /// # Errors
    /// Returns an error for fewer than two vertices or for a coincident or
    /// antipodal adjacent pair.
    pub fn new(vertices: Vec<UnitVector3>) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::InsufficientVertices {
                kind: "polyline",
                required: 2,
                count: vertices.len(),
            });
        }
        let arcs = build_arcs(&vertices, false)?;
        Ok(Self { vertices, arcs })
    }

    /// Convenience constructor from `(lat, lon)` pairs in degrees.
    ///
    /// # Errors
    /// Same as [`PolylineOnSphere::new`].
    pub fn from_lat_lon(points: &[(f64, f64)]) -> Result<Self, GeometryError> {
        Self::new(
            points
                .iter()
                .map(|&(lat, lon)| LatLonPoint::new(lat, lon).to_unit_vector())
                .collect(),
        )
    }

    #[must_use]
    pub fn vertices(&self) -> &[UnitVector3] {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn arcs(&self) -> &[GreatCircleArc] {
        &self.arcs
    }

    #[must_use]
    pub fn first_vertex(&self) -> UnitVector3 {
        self.vertices[0]
    }

    #[must_use]
    pub fn last_vertex(&self) -> UnitVector3 {
        self.vertices[self.vertices.len() - 1]
    }

    /// Same arcs traversed end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let vertices: Vec<_> = self.vertices.iter().rev().copied().collect();
        let arcs = self.arcs.iter().rev().map(GreatCircleArc::reversed).collect();
        Self { vertices, arcs }
    }

    /// Best closeness over all arcs, if any arc passes the criteria.
    #[must_use]
    pub fn is_close_to(&self, criteria: &ProximityCriteria) -> Option<f64> {
        self.arcs
            .iter()
            .filter_map(|arc| arc.is_close_to(criteria))
            .reduce(f64::max)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polygon
// ─────────────────────────────────────────────────────────────────────────────

/// Closed ring of great-circle arcs; the closing arc is implicit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonOnSphere {
    vertices: Vec<UnitVector3>,
    #[serde(skip)]
    arcs: Vec<GreatCircleArc>,
}

impl PolygonOnSphere {
    /// # Errors
    /// Returns an error for fewer than three vertices or for a coincident or
    /// antipodal adjacent pair, the closing pair included.
    pub fn new(vertices: Vec<UnitVector3>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::InsufficientVertices {
                kind: "polygon",
                required: 3,
                count: vertices.len(),
            });
        }
        let arcs = build_arcs(&vertices, true)?;
        Ok(Self { vertices, arcs })
    }

    /// # Errors
    /// Same as [`PolygonOnSphere::new`].
    pub fn from_lat_lon(points: &[(f64, f64)]) -> Result<Self, GeometryError> {
        Self::new(
            points
                .iter()
                .map(|&(lat, lon)| LatLonPoint::new(lat, lon).to_unit_vector())
                .collect(),
        )
    }

    #[must_use]
    pub fn vertices(&self) -> &[UnitVector3] {
        &self.vertices
    }

    #[must_use]
    pub fn arcs(&self) -> &[GreatCircleArc] {
        &self.arcs
    }

    /// The ring as an open vertex list that repeats the first vertex at the
    /// end, which is how polygon boundaries take part in intersections.
    #[must_use]
    pub fn exterior_as_polyline_vertices(&self) -> Vec<UnitVector3> {
        let mut ring = self.vertices.clone();
        ring.push(self.vertices[0]);
        ring
    }

    #[must_use]
    pub fn is_close_to(&self, criteria: &ProximityCriteria) -> Option<f64> {
        self.arcs
            .iter()
            .filter_map(|arc| arc.is_close_to(criteria))
            .reduce(f64::max)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GeometryOnSphere
// ─────────────────────────────────────────────────────────────────────────────

/// Any geometry a feature property can hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GeometryOnSphere {
    Point(PointOnSphere),
    MultiPoint(Arc<MultiPointOnSphere>),
    Polyline(Arc<PolylineOnSphere>),
    Polygon(Arc<PolygonOnSphere>),
}

impl GeometryOnSphere {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::MultiPoint(_) => "multi-point",
            Self::Polyline(_) => "polyline",
            Self::Polygon(_) => "polygon",
        }
    }

    /// Vertices in storage order. Polygons do not repeat the first vertex.
    #[must_use]
    pub fn vertices(&self) -> &[UnitVector3] {
        match self {
            Self::Point(point) => std::slice::from_ref(&point.0),
            Self::MultiPoint(multi) => multi.points(),
            Self::Polyline(polyline) => polyline.vertices(),
            Self::Polygon(polygon) => polygon.vertices(),
        }
    }

    /// Closeness of `criteria`'s test point to this geometry.
    #[must_use]
    pub fn is_close_to(&self, criteria: &ProximityCriteria) -> Option<f64> {
        match self {
            Self::Point(point) => criteria.point_closeness(point.0),
            Self::MultiPoint(multi) => multi
                .points()
                .iter()
                .filter_map(|p| criteria.point_closeness(*p))
                .reduce(f64::max),
            Self::Polyline(polyline) => polyline.is_close_to(criteria),
            Self::Polygon(polygon) => polygon.is_close_to(criteria),
        }
    }
}

impl From<PointOnSphere> for GeometryOnSphere {
    fn from(point: PointOnSphere) -> Self {
        Self::Point(point)
    }
}

impl From<PolylineOnSphere> for GeometryOnSphere {
    fn from(polyline: PolylineOnSphere) -> Self {
        Self::Polyline(Arc::new(polyline))
    }
}

impl From<PolygonOnSphere> for GeometryOnSphere {
    fn from(polygon: PolygonOnSphere) -> Self {
        Self::Polygon(Arc::new(polygon))
    }
}

impl From<MultiPointOnSphere> for GeometryOnSphere {
    fn from(multi: MultiPointOnSphere) -> Self {
        Self::MultiPoint(Arc::new(multi))
    }
}
