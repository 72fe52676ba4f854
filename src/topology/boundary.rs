use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureId, PlateId, PropertyName, RotationModel};
use crate::geom::{Tolerance, UnitVector3};

use super::diagnostics::ResolveDiagnostics;
use super::membership::{Bounds, Membership, PoleEnclosure, compute_bounds, locate};
use super::velocity::{Velocity, velocity_at};

/// Whether the assembled vertices form a ring or an open line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryKind {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubSegmentShape {
    Point,
    Line,
}

/// Provenance of a contiguous run of boundary vertices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubSegment {
    pub feature_id: FeatureId,
    pub property_name: PropertyName,
    pub shape: SubSegmentShape,
    /// Indices into [`ResolvedBoundary::vertices`].
    pub range: Range<usize>,
    pub reversed: bool,
}

/// A boundary (or line) assembled from its sections at one reconstruction
/// time. Built once and never modified; resolve again for another time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBoundary {
    feature_id: Option<FeatureId>,
    plate_id: Option<PlateId>,
    reconstruction_time: f64,
    kind: BoundaryKind,
    vertices: Vec<UnitVector3>,
    sub_segments: Vec<SubSegment>,
    bounds: Bounds,
    pole: PoleEnclosure,
    degraded: bool,
    tolerance: Tolerance,
    diagnostics: ResolveDiagnostics,
}

impl ResolvedBoundary {
    pub(crate) fn new(
        kind: BoundaryKind,
        reconstruction_time: f64,
        vertices: Vec<UnitVector3>,
        sub_segments: Vec<SubSegment>,
        tolerance: Tolerance,
        diagnostics: ResolveDiagnostics,
    ) -> Self {
        let (bounds, pole) = compute_bounds(&vertices, kind == BoundaryKind::Closed);
        let degraded = diagnostics.multiple_intersection_count > 0;
        Self {
            feature_id: None,
            plate_id: None,
            reconstruction_time,
            kind,
            vertices,
            sub_segments,
            bounds,
            pole,
            degraded,
            tolerance,
            diagnostics,
        }
    }

    /// Attaches the topological feature this boundary belongs to.
    #[must_use]
    pub(crate) fn with_owner(mut self, feature_id: FeatureId, plate_id: Option<PlateId>) -> Self {
        self.feature_id = Some(feature_id);
        self.plate_id = plate_id;
        self
    }

    #[must_use]
    pub fn feature_id(&self) -> Option<&FeatureId> {
        self.feature_id.as_ref()
    }

    #[must_use]
    pub const fn plate_id(&self) -> Option<PlateId> {
        self.plate_id
    }

    #[must_use]
    pub const fn reconstruction_time(&self) -> f64 {
        self.reconstruction_time
    }

    #[must_use]
    pub const fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// Flattened vertices. Closed boundaries do not repeat the first vertex.
    #[must_use]
    pub fn vertices(&self) -> &[UnitVector3] {
        &self.vertices
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Sub-segments in boundary order; their ranges tile the vertices.
    #[must_use]
    pub fn sub_segments(&self) -> &[SubSegment] {
        &self.sub_segments
    }

    #[must_use]
    pub fn sub_segment_vertices(&self, sub_segment: &SubSegment) -> &[UnitVector3] {
        &self.vertices[sub_segment.range.clone()]
    }

    #[must_use]
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[must_use]
    pub const fn pole(&self) -> PoleEnclosure {
        self.pole
    }

    /// Set when a pair of sections crossed more often than expected and the
    /// boundary was assembled from the first crossing or the untrimmed
    /// section. The result may be topologically wrong.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &ResolveDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn locate(&self, point: UnitVector3) -> Membership {
        locate(point, self)
    }

    /// Velocities of the boundary's plate at each point inside or on the
    /// boundary; `None` for points outside.
    ///
    /// Boundaries without a plate id use the fixed reference frame.
    #[must_use]
    pub fn velocities(
        &self,
        points: &[UnitVector3],
        rotations: &dyn RotationModel,
        delta_time: f64,
    ) -> Vec<Option<Velocity>> {
        let plate_id = self.plate_id.unwrap_or_default();
        points
            .iter()
            .map(|point| {
                self.locate(*point).is_covered().then(|| {
                    velocity_at(
                        *point,
                        plate_id,
                        self.reconstruction_time,
                        delta_time,
                        rotations,
                    )
                })
            })
            .collect()
    }
}
