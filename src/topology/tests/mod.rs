mod test_assembler_basic;
mod test_resolver_basic;
mod test_velocity_basic;

use crate::feature::{Feature, PlateId, property_names};
use crate::geom::{
    GeometryOnSphere, LatLonPoint, PointOnSphere, PolylineOnSphere, Tolerance, UnitVector3,
};
use crate::topology::{IntersectionDescriptor, PropertyDelegate, SectionReference};

pub(super) const PLATE: PlateId = PlateId(101);

pub(super) fn ll(lat: f64, lon: f64) -> UnitVector3 {
    LatLonPoint::new(lat, lon).to_unit_vector()
}

pub(super) fn vertices(points: &[(f64, f64)]) -> Vec<UnitVector3> {
    points.iter().map(|&(lat, lon)| ll(lat, lon)).collect()
}

pub(super) fn assert_same_vertices(got: &[UnitVector3], want: &[UnitVector3]) {
    assert_eq!(got.len(), want.len(), "vertex count: {got:?} vs {want:?}");
    for (g, w) in got.iter().zip(want) {
        assert!(g.coincides_with(*w, Tolerance::new(1e-9)), "{g:?} != {w:?}");
    }
}

/// Line feature on the center-line property, fixed to [`PLATE`].
pub(super) fn line_feature(id: &str, points: &[(f64, f64)]) -> Feature {
    let polyline = PolylineOnSphere::from_lat_lon(points).expect("valid polyline");
    Feature::new(id)
        .with_property(property_names::CENTER_LINE_OF, GeometryOnSphere::from(polyline))
        .with_property(property_names::RECONSTRUCTION_PLATE_ID, PLATE)
}

pub(super) fn line(id: &str) -> SectionReference {
    SectionReference::new(id, property_names::CENTER_LINE_OF)
}

/// Intersection with `adjacent`'s center line, anchored at `anchor` on the
/// plate of `adjacent`.
pub(super) fn meets(adjacent: &str, anchor: (f64, f64)) -> IntersectionDescriptor {
    IntersectionDescriptor::new(
        PropertyDelegate::new(adjacent, property_names::CENTER_LINE_OF),
        PointOnSphere::from_lat_lon(anchor.0, anchor.1),
        PropertyDelegate::plate_id_of(adjacent),
    )
}

// Three lines crossing pairwise, enclosing a triangle with corners near
// (0, 0.7), (0, 20) and (24.5, 20).
pub(super) const TRIANGLE_A: [(f64, f64); 3] = [(0.0, -10.0), (0.0, 10.0), (0.0, 30.0)];
pub(super) const TRIANGLE_B: [(f64, f64); 3] = [(-10.0, 20.0), (10.0, 20.0), (40.0, 20.0)];
pub(super) const TRIANGLE_C: [(f64, f64); 3] = [(-5.0, -5.0), (12.0, 10.0), (30.0, 25.0)];

pub(super) fn triangle_features() -> Vec<Feature> {
    vec![
        line_feature("A", &TRIANGLE_A),
        line_feature("B", &TRIANGLE_B),
        line_feature("C", &TRIANGLE_C),
    ]
}

pub(super) fn triangle_sections() -> Vec<SectionReference> {
    vec![
        line("A")
            .with_start_intersection(meets("C", (0.0, 10.0)))
            .with_end_intersection(meets("B", (0.0, 10.0))),
        line("B")
            .with_start_intersection(meets("A", (10.0, 20.0)))
            .with_end_intersection(meets("C", (10.0, 20.0))),
        line("C")
            .reversed(true)
            .with_start_intersection(meets("B", (12.0, 10.0)))
            .with_end_intersection(meets("A", (12.0, 10.0))),
    ]
}
