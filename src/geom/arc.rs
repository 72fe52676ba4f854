//! Great-circle arcs: the edges of every polyline and polygon on the sphere.
//!
//! Arc crossings are computed in closed form from the two rotation axes, not
//! from a planar approximation: two distinct great circles meet in exactly
//! two antipodal points, and at most one of them can lie on both arcs because
//! every arc is shorter than a half circle.

use super::core::{Tolerance, UnitVector3};
use super::geometry::GeometryError;
use super::proximity::ProximityCriteria;

/// Minor great-circle arc between two non-coincident, non-antipodal points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircleArc {
    start: UnitVector3,
    end: UnitVector3,
    axis: UnitVector3,
}

impl GreatCircleArc {
    /// Creates the arc from `start` to `end`.
    ///
    /// # Errors
    /// Returns [`GeometryError::CoincidentVertices`] or
    /// [`GeometryError::AntipodalVertices`] when the rotation axis is undefined.
    pub fn new(start: UnitVector3, end: UnitVector3) -> Result<Self, GeometryError> {
        match start.cross(end).normalized() {
            Some(axis) => Ok(Self { start, end, axis }),
            None if start.dot(end) > 0.0 => Err(GeometryError::CoincidentVertices),
            None => Err(GeometryError::AntipodalVertices),
        }
    }

    #[must_use]
    pub const fn start(&self) -> UnitVector3 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> UnitVector3 {
        self.end
    }

    /// Unit normal of the arc's great-circle plane (right-handed, start to end).
    #[must_use]
    pub const fn rotation_axis(&self) -> UnitVector3 {
        self.axis
    }

    /// The same arc traversed from end to start.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            axis: self.axis.antipode(),
        }
    }

    /// Arc length in radians.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.angle_to(self.end)
    }

    /// Whether `p`, assumed to lie on the arc's great circle, lies between
    /// the endpoints (inclusive within `tol`).
    #[must_use]
    pub fn spans(&self, p: UnitVector3, tol: Tolerance) -> bool {
        self.start.cross(p).dot(self.axis.as_vec3()) >= -tol.eps
            && p.cross(self.end).dot(self.axis.as_vec3()) >= -tol.eps
    }

    /// Fractional position of `p` along the arc, clamped to `[0, 1]`.
    #[must_use]
    pub fn parameter_of(&self, p: UnitVector3) -> f64 {
        let length = self.length();
        if length <= 0.0 {
            return 0.0;
        }
        (self.start.angle_to(p) / length).clamp(0.0, 1.0)
    }

    /// Crossing point of two arcs, if any.
    ///
    /// Arcs on the same great circle never report a crossing. A crossing
    /// within `tol` of an endpoint is snapped to that endpoint so that shared
    /// vertices produce bit-identical intersection points.
    #[must_use]
    pub fn intersect(&self, other: &Self, tol: Tolerance) -> Option<UnitVector3> {
        let direction = self.axis.cross(other.axis).normalized()?;
        let candidate = [direction, direction.antipode()]
            .into_iter()
            .find(|p| self.spans(*p, tol) && other.spans(*p, tol))?;

        let snapped = [self.start, self.end, other.start, other.end]
            .into_iter()
            .find(|endpoint| endpoint.coincides_with(candidate, tol))
            .unwrap_or(candidate);
        Some(snapped)
    }

    /// Closeness of the criteria's test point to this arc, if it passes the
    /// inclusion threshold.
    ///
    /// Closeness is the cosine of the angular distance to the nearest point of
    /// the arc. Points further from the great circle than the latitude
    /// exclusion threshold allows are rejected before the full test.
    #[must_use]
    pub fn is_close_to(&self, criteria: &ProximityCriteria) -> Option<f64> {
        let p = criteria.test_point();
        let dot_axis = p.dot(self.axis);
        if dot_axis.abs() > criteria.latitude_exclusion_threshold() {
            return None;
        }

        let projected = p.as_vec3() - self.axis.as_vec3() * dot_axis;
        let closeness = match projected.normalized() {
            Some(foot) if self.spans(foot, Tolerance::ZERO_LENGTH) => {
                (1.0 - dot_axis * dot_axis).max(0.0).sqrt()
            }
            _ => p.dot(self.start).max(p.dot(self.end)),
        };

        (closeness >= criteria.closeness_inclusion_threshold()).then_some(closeness)
    }
}
