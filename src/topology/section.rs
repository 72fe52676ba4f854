//! References from a topological feature to the features it is built from.

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureId, PropertyName, property_names};
use crate::geom::PointOnSphere;

/// Names one property of another feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyDelegate {
    pub feature_id: FeatureId,
    pub property_name: PropertyName,
}

impl PropertyDelegate {
    #[must_use]
    pub fn new(feature_id: impl Into<FeatureId>, property_name: PropertyName) -> Self {
        Self {
            feature_id: feature_id.into(),
            property_name,
        }
    }

    /// Delegate to a feature's reconstruction plate id.
    #[must_use]
    pub fn plate_id_of(feature_id: impl Into<FeatureId>) -> Self {
        Self::new(feature_id, property_names::RECONSTRUCTION_PLATE_ID)
    }
}

/// Where a section meets its neighbour, and how to tell which side of the
/// crossing belongs to the section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionDescriptor {
    /// Geometry of the adjacent section.
    pub adjacent: PropertyDelegate,
    /// Present-day anchor lying on the part of this section to keep.
    pub reference_point: PointOnSphere,
    /// Plate id used to carry the anchor to the reconstruction time.
    pub reference_point_plate_id: PropertyDelegate,
}

impl IntersectionDescriptor {
    #[must_use]
    pub fn new(
        adjacent: PropertyDelegate,
        reference_point: PointOnSphere,
        reference_point_plate_id: PropertyDelegate,
    ) -> Self {
        Self {
            adjacent,
            reference_point,
            reference_point_plate_id,
        }
    }
}

/// One entry of a topological feature's ordered section list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReference {
    pub feature_id: FeatureId,
    pub property_name: PropertyName,
    /// Traverse the section end to start when stitching.
    pub reverse: bool,
    pub start_intersection: Option<IntersectionDescriptor>,
    pub end_intersection: Option<IntersectionDescriptor>,
}

impl SectionReference {
    #[must_use]
    pub fn new(feature_id: impl Into<FeatureId>, property_name: PropertyName) -> Self {
        Self {
            feature_id: feature_id.into(),
            property_name,
            reverse: false,
            start_intersection: None,
            end_intersection: None,
        }
    }

    #[must_use]
    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    #[must_use]
    pub fn with_start_intersection(mut self, descriptor: IntersectionDescriptor) -> Self {
        self.start_intersection = Some(descriptor);
        self
    }

    #[must_use]
    pub fn with_end_intersection(mut self, descriptor: IntersectionDescriptor) -> Self {
        self.end_intersection = Some(descriptor);
        self
    }
}
