mod arc;
mod core;
mod geometry;
mod intersection;
mod proximity;
mod rotation;

pub use arc::GreatCircleArc;
pub use self::core::{LatLonPoint, Tolerance, UnitVector3, Vec3};
pub use geometry::{
    GeometryError, GeometryOnSphere, MultiPointOnSphere, PointOnSphere, PolygonOnSphere,
    PolylineOnSphere,
};
pub use intersection::{
    CurveSide, HeadMiddleTail, HeadTail, IntersectionError, IntersectionGraph, IntersectionNode,
    NodeIndex, PartitionIndex, PartitionedCurve, SingleIntersection, TwoIntersections,
    partition, partition_at_single_intersection, partition_at_two_intersections,
};
pub use proximity::{DEFAULT_PROXIMITY_THRESHOLD, ProximityCriteria};
pub use rotation::{FiniteRotation, reconstruct};
