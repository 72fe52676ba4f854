use std::sync::Arc;

use super::{PLATE, assert_same_vertices, line, line_feature, ll, meets, vertices};
use crate::feature::{
    Feature, FeatureId, LookupError, MemoryFeatureStore, PlateId, PropertyValue, RotationTable,
    TimePeriod, TimeWindow, property_names,
};
use crate::geom::{
    FiniteRotation, GeometryOnSphere, HeadTail, MultiPointOnSphere, PointOnSphere,
    PolylineOnSphere, Tolerance, UnitVector3,
};
use crate::topology::resolver::choose_piece;
use crate::topology::{
    PieceChoice, PropertyDelegate, ResolveContext, ResolveDiagnostics, ResolveOptions,
    ResolvedSection, SectionError, SectionReference, extract_params, reconstruct_section,
    resolve_section,
};

fn resolve(
    store: &MemoryFeatureStore,
    rotations: &RotationTable,
    reference: &SectionReference,
    time: f64,
) -> (Result<ResolvedSection, SectionError>, ResolveDiagnostics) {
    let ctx = ResolveContext::new(store, rotations, time, ResolveOptions::default());
    let mut diagnostics = ResolveDiagnostics::new();
    let result = resolve_section(reference, &ctx, &mut diagnostics);
    (result, diagnostics)
}

fn polyline(points: &[(f64, f64)]) -> GeometryOnSphere {
    PolylineOnSphere::from_lat_lon(points).unwrap().into()
}

#[test]
fn point_sections_resolve_to_their_position() {
    let store: MemoryFeatureStore = [Feature::new("vent").with_property(
        property_names::POSITION,
        GeometryOnSphere::from(PointOnSphere::from_lat_lon(12.0, 34.0)),
    )]
    .into_iter()
    .collect();
    let reference = SectionReference::new("vent", property_names::POSITION);

    let (result, diagnostics) = resolve(&store, &RotationTable::new(), &reference, 0.0);
    let section = result.unwrap();
    assert!(section.as_line().is_none());
    assert_eq!(section.vertices(), &[ll(12.0, 34.0)]);
    assert!(diagnostics.is_clean());
}

#[test]
fn multi_points_are_unsupported() {
    let cloud = MultiPointOnSphere::new(vec![ll(0.0, 0.0), ll(1.0, 1.0)]).unwrap();
    let store: MemoryFeatureStore = [Feature::new("cloud")
        .with_property(property_names::POSITION, GeometryOnSphere::from(cloud))]
    .into_iter()
    .collect();
    let reference = SectionReference::new("cloud", property_names::POSITION);

    let (result, _) = resolve(&store, &RotationTable::new(), &reference, 0.0);
    assert_eq!(
        result.unwrap_err(),
        SectionError::UnsupportedGeometry { kind: "multi-point" }
    );
}

#[test]
fn missing_and_duplicated_features_fail_lookup() {
    let store: MemoryFeatureStore = [
        line_feature("twin", &[(0.0, 0.0), (0.0, 10.0)]),
        line_feature("twin", &[(5.0, 0.0), (5.0, 10.0)]),
    ]
    .into_iter()
    .collect();
    let rotations = RotationTable::new();

    let (result, _) = resolve(&store, &rotations, &line("nobody"), 0.0);
    assert_eq!(
        result.unwrap_err(),
        SectionError::Lookup(LookupError::Missing(FeatureId::new("nobody")))
    );

    let (result, _) = resolve(&store, &rotations, &line("twin"), 0.0);
    assert_eq!(
        result.unwrap_err(),
        SectionError::Lookup(LookupError::Ambiguous {
            id: FeatureId::new("twin"),
            count: 2
        })
    );
}

#[test]
fn features_outside_their_valid_time_are_inactive() {
    let feature = line_feature("ridge", &[(0.0, 0.0), (0.0, 10.0)])
        .with_property(property_names::VALID_TIME, TimePeriod::new(50.0, 20.0));

    let err = extract_params(&feature, &property_names::CENTER_LINE_OF, 10.0).unwrap_err();
    assert_eq!(
        err,
        SectionError::Inactive {
            id: FeatureId::new("ridge"),
            time: 10.0
        }
    );

    let params = extract_params(&feature, &property_names::CENTER_LINE_OF, 30.0).unwrap();
    assert_eq!(params.plate_id, PLATE);
    assert_eq!(params.valid_time, TimePeriod::new(50.0, 20.0));
}

#[test]
fn extraction_unwraps_time_dependent_values() {
    let young = polyline(&[(0.0, 0.0), (0.0, 10.0)]);
    let old = polyline(&[(20.0, 0.0), (20.0, 10.0)]);
    let feature = Feature::new("trench")
        .with_property(
            property_names::CENTER_LINE_OF,
            PropertyValue::PiecewiseAggregation(vec![
                TimeWindow::new(TimePeriod::new(100.0, 50.0), old.clone().into()),
                TimeWindow::new(
                    TimePeriod::new(50.0, 0.0),
                    PropertyValue::constant(young.clone().into()),
                ),
            ]),
        )
        .with_property(
            property_names::RECONSTRUCTION_PLATE_ID,
            PropertyValue::constant(PlateId(301).into()),
        );

    let params = extract_params(&feature, &property_names::CENTER_LINE_OF, 10.0).unwrap();
    assert_eq!(params.geometry, young);
    assert_eq!(params.plate_id, PlateId(301));

    let params = extract_params(&feature, &property_names::CENTER_LINE_OF, 75.0).unwrap();
    assert_eq!(params.geometry, old);

    let err = extract_params(&feature, &property_names::CENTER_LINE_OF, 200.0).unwrap_err();
    assert!(matches!(err, SectionError::NoValueAtTime { time, .. } if time == 200.0));
}

#[test]
fn extraction_reports_absent_and_non_geometry_properties() {
    let feature = Feature::new("label")
        .with_property(property_names::NAME, PropertyValue::Text("Pacific".into()));
    assert_eq!(feature.name(), Some("Pacific"));

    let err = extract_params(&feature, &property_names::CENTER_LINE_OF, 0.0).unwrap_err();
    assert!(matches!(err, SectionError::MissingProperty { .. }));

    let err = extract_params(&feature, &property_names::NAME, 0.0).unwrap_err();
    assert!(matches!(err, SectionError::NotAGeometry { .. }));

    // No plate id: reconstructed with the fixed frame.
    let feature = Feature::new("fixed")
        .with_property(property_names::CENTER_LINE_OF, polyline(&[(0.0, 0.0), (0.0, 1.0)]));
    let params = extract_params(&feature, &property_names::CENTER_LINE_OF, 0.0).unwrap();
    assert_eq!(params.plate_id, PlateId::ANCHOR);
}

#[test]
fn sections_and_anchors_are_rotated_to_the_reconstruction_time() {
    let moving = PlateId(201);
    let rotations = RotationTable::new()
        .with_sample(moving, 0.0, FiniteRotation::identity())
        .with_sample(
            moving,
            10.0,
            FiniteRotation::from_euler_pole(UnitVector3::NORTH_POLE, 10.0),
        );
    let store: MemoryFeatureStore = [
        Feature::new("moving")
            .with_property(property_names::CENTER_LINE_OF, polyline(&[(0.0, 0.0), (0.0, 10.0)]))
            .with_property(property_names::RECONSTRUCTION_PLATE_ID, moving),
        line_feature("fixed", &[(-10.0, 15.0), (10.0, 15.0)]),
    ]
    .into_iter()
    .collect();

    // The anchor rides on the moving plate: (0, 2) today, (0, 12) at 10 Ma.
    let mut descriptor = meets("fixed", (0.0, 2.0));
    descriptor.reference_point_plate_id = PropertyDelegate::plate_id_of("moving");
    let reference = line("moving").with_end_intersection(descriptor);

    let (result, diagnostics) = resolve(&store, &rotations, &reference, 10.0);
    let section = result.unwrap();
    let line = section.as_line().unwrap();

    assert_same_vertices(&line.reconstructed, &vertices(&[(0.0, 10.0), (0.0, 20.0)]));
    assert_same_vertices(&line.vertices, &vertices(&[(0.0, 10.0), (0.0, 15.0)]));
    assert!(line.end_anchor.unwrap().coincides_with(ll(0.0, 12.0), Tolerance::new(1e-9)));

    let intersection = line.end_intersection.as_ref().unwrap();
    assert_eq!(intersection.choice, PieceChoice::Head);
    assert_eq!(intersection.intersection_count, 1);
    assert!(!intersection.ambiguous);
    assert!(intersection.point.coincides_with(ll(0.0, 15.0), Tolerance::new(1e-9)));
    assert!(line.start_intersection.is_none());
    assert!(diagnostics.is_clean());
}

#[test]
fn descriptors_trim_both_ends() {
    let store: MemoryFeatureStore = super::triangle_features().into_iter().collect();
    let sections = super::triangle_sections();

    let (result, diagnostics) = resolve(&store, &RotationTable::new(), &sections[1], 0.0);
    let section = result.unwrap();
    let line = section.as_line().unwrap();

    assert_eq!(line.start_intersection.as_ref().unwrap().choice, PieceChoice::Tail);
    assert_eq!(line.end_intersection.as_ref().unwrap().choice, PieceChoice::Head);
    assert_eq!(line.vertices.len(), 3);
    assert!(line.vertices[0].coincides_with(ll(0.0, 20.0), Tolerance::new(1e-9)));
    assert!(line.vertices[1].coincides_with(ll(10.0, 20.0), Tolerance::new(1e-12)));
    assert_eq!(line.reconstructed, vertices(&super::TRIANGLE_B));
    assert!(!line.degraded);
    assert!(diagnostics.is_clean());
}

#[test]
fn equidistant_anchor_keeps_the_head_and_is_reported() {
    let store: MemoryFeatureStore = [
        line_feature("east-west", &[(0.0, -10.0), (0.0, 10.0)]),
        line_feature("north-south", &[(-10.0, 0.0), (10.0, 0.0)]),
    ]
    .into_iter()
    .collect();
    let reference = line("east-west").with_end_intersection(meets("north-south", (5.0, 0.0)));

    let (result, diagnostics) = resolve(&store, &RotationTable::new(), &reference, 0.0);
    let section = result.unwrap();
    let line = section.as_line().unwrap();

    let intersection = line.end_intersection.as_ref().unwrap();
    assert_eq!(intersection.choice, PieceChoice::Head);
    assert!(intersection.ambiguous);
    assert_same_vertices(&line.vertices, &vertices(&[(0.0, -10.0), (0.0, 0.0)]));
    assert_eq!(diagnostics.ambiguous_choices, 1);
    assert!(diagnostics.has_warnings());
}

#[test]
fn repeated_crossing_trims_at_the_first_and_is_reported() {
    let store: MemoryFeatureStore = [
        line_feature("straight", &[(0.0, 0.0), (0.0, 30.0)]),
        line_feature("zigzag", &[(-5.0, 20.0), (5.0, 20.0), (5.0, 10.0), (-5.0, 10.0)]),
    ]
    .into_iter()
    .collect();
    let reference = line("straight").with_end_intersection(meets("zigzag", (0.0, 5.0)));

    let (result, diagnostics) = resolve(&store, &RotationTable::new(), &reference, 0.0);
    let section = result.unwrap();
    let line = section.as_line().unwrap();

    assert!(line.degraded);
    assert_eq!(line.end_intersection.as_ref().unwrap().intersection_count, 2);
    assert_ne!(line.vertices, line.reconstructed);
    assert_eq!(diagnostics.multiple_intersection_count, 1);
    assert_eq!(diagnostics.warnings.len(), 1, "{:?}", diagnostics.warnings);
}

#[test]
fn reconstruction_alone_keeps_the_full_line() {
    let store: MemoryFeatureStore = super::triangle_features().into_iter().collect();
    let sections = super::triangle_sections();
    let rotations = RotationTable::new();
    let ctx = ResolveContext::new(&store, &rotations, 0.0, ResolveOptions::default());
    let mut diagnostics = ResolveDiagnostics::new();

    let section = reconstruct_section(&sections[1], &ctx, &mut diagnostics).unwrap();
    let line = section.as_line().unwrap();
    assert_eq!(line.vertices, vertices(&super::TRIANGLE_B));
    assert_eq!(line.vertices, line.reconstructed);
    assert!(line.start_anchor.is_some() && line.end_anchor.is_some());
    assert!(line.start_intersection.is_none() && line.end_intersection.is_none());
    assert!(diagnostics.is_clean());
}

#[test]
fn neighbours_that_never_meet_leave_the_section_whole() {
    let store: MemoryFeatureStore = [
        line_feature("a", &[(0.0, 0.0), (0.0, 10.0)]),
        line_feature("b", &[(30.0, 0.0), (30.0, 10.0)]),
    ]
    .into_iter()
    .collect();
    let reference = line("a").with_start_intersection(meets("b", (0.0, 5.0)));

    let (result, diagnostics) = resolve(&store, &RotationTable::new(), &reference, 0.0);
    let section = result.unwrap();
    let line = section.as_line().unwrap();
    assert_eq!(line.vertices, line.reconstructed);
    assert!(line.start_intersection.is_none());
    assert!(line.start_anchor.is_some());
    assert!(diagnostics.is_clean());
}

#[test]
fn missing_anchor_plate_uses_the_present_day_anchor() {
    let store: MemoryFeatureStore = [
        line_feature("a", &[(0.0, -10.0), (0.0, 10.0)]),
        line_feature("b", &[(-10.0, 0.0), (10.0, 0.0)]),
    ]
    .into_iter()
    .collect();
    let mut descriptor = meets("b", (0.0, 5.0));
    descriptor.reference_point_plate_id = PropertyDelegate::plate_id_of("ghost");
    let reference = line("a").with_end_intersection(descriptor);

    let (result, diagnostics) = resolve(&store, &RotationTable::new(), &reference, 0.0);
    let line = result.unwrap();
    let line = line.as_line().unwrap();
    assert_eq!(line.end_anchor, Some(ll(0.0, 5.0)));
    assert_eq!(line.end_intersection.as_ref().unwrap().choice, PieceChoice::Tail);
    assert_eq!(diagnostics.warnings.len(), 1);
}

#[test]
fn choose_piece_prefers_the_strictly_closer_piece() {
    let head = Arc::new(PolylineOnSphere::from_lat_lon(&[(0.0, -10.0), (0.0, 0.0)]).unwrap());
    let tail = Arc::new(PolylineOnSphere::from_lat_lon(&[(0.0, 0.0), (0.0, 10.0)]).unwrap());
    let options = ResolveOptions::default();
    let both = HeadTail {
        head: Some(Arc::clone(&head)),
        tail: Some(Arc::clone(&tail)),
    };

    let chosen = choose_piece(&both, ll(1.0, 6.0), &options).unwrap();
    assert_eq!(chosen.choice, PieceChoice::Tail);
    assert!(!chosen.ambiguous);
    assert!(Arc::ptr_eq(&chosen.polyline, &tail));

    // Close to neither piece.
    let chosen = choose_piece(&both, ll(60.0, 0.0), &options).unwrap();
    assert_eq!(chosen.choice, PieceChoice::Head);
    assert!(chosen.ambiguous);

    // A lone piece is taken even when the anchor is far away.
    let only_tail = HeadTail {
        head: None,
        tail: Some(tail),
    };
    let chosen = choose_piece(&only_tail, ll(60.0, 0.0), &options).unwrap();
    assert_eq!(chosen.choice, PieceChoice::Tail);
    assert!(!chosen.ambiguous);

    assert!(choose_piece(&HeadTail::default(), ll(0.0, 0.0), &options).is_none());
}
