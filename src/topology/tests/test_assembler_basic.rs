use super::{
    assert_same_vertices, line, line_feature, ll, meets, triangle_features, triangle_sections,
    vertices,
};
use crate::feature::{Feature, FeatureId, MemoryFeatureStore, RotationTable, property_names};
use crate::geom::{GeometryOnSphere, PointOnSphere, PolygonOnSphere, Tolerance};
use crate::topology::{
    BoundaryKind, Membership, ResolveContext, ResolveOptions, ResolvedBoundary, SectionReference,
    SubSegmentShape, assemble,
};

fn assemble_with(
    features: Vec<Feature>,
    sections: &[SectionReference],
    kind: BoundaryKind,
) -> ResolvedBoundary {
    let store: MemoryFeatureStore = features.into_iter().collect();
    let rotations = RotationTable::new();
    let ctx = ResolveContext::new(&store, &rotations, 0.0, ResolveOptions::default());
    assemble(sections, kind, &ctx).expect("no engine failure")
}

/// Sub-segment ranges cover every vertex exactly once, in order.
fn assert_tiles(boundary: &ResolvedBoundary) {
    let mut next = 0;
    for sub_segment in boundary.sub_segments() {
        assert_eq!(sub_segment.range.start, next, "{sub_segment:?}");
        assert!(sub_segment.range.end >= sub_segment.range.start);
        next = sub_segment.range.end;
    }
    assert_eq!(next, boundary.vertices().len());
}

#[test]
fn single_polygon_round_trips() {
    let outline = [(0.0, 0.0), (0.0, 10.0), (10.0, 5.0)];
    let features = vec![Feature::new("plate").with_property(
        property_names::OUTLINE_OF,
        GeometryOnSphere::from(PolygonOnSphere::from_lat_lon(&outline).unwrap()),
    )];
    let sections = [SectionReference::new("plate", property_names::OUTLINE_OF)];

    let boundary = assemble_with(features, &sections, BoundaryKind::Closed);
    assert_eq!(boundary.vertices(), vertices(&outline).as_slice());
    assert_eq!(boundary.sub_segments().len(), 1);
    assert_eq!(boundary.sub_segments()[0].range, 0..3);
    assert!(boundary.diagnostics().is_clean());
    assert!(!boundary.is_degraded());
    assert_eq!(boundary.locate(ll(3.0, 5.0)), Membership::Inside);
}

#[test]
fn single_reversed_line_is_emitted_backwards() {
    let points = [(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)];
    let sections = [line("arc").reversed(true)];

    let boundary = assemble_with(
        vec![line_feature("arc", &points)],
        &sections,
        BoundaryKind::Open,
    );
    let mut expected = vertices(&points);
    expected.reverse();
    assert_eq!(boundary.vertices(), expected.as_slice());
    assert!(boundary.sub_segments()[0].reversed);
    assert_eq!(boundary.kind(), BoundaryKind::Open);
}

#[test]
fn empty_section_list_gives_an_empty_boundary() {
    let boundary = assemble_with(Vec::new(), &[], BoundaryKind::Closed);
    assert!(boundary.is_empty());
    assert!(boundary.sub_segments().is_empty());
    assert!(boundary.bounds().is_empty());
    assert_eq!(boundary.locate(ll(0.0, 0.0)), Membership::Outside);
    assert!(boundary.diagnostics().is_clean());
}

#[test]
fn unresolvable_sections_are_skipped() {
    let sections = [line("missing"), line("also-missing")];
    let boundary = assemble_with(Vec::new(), &sections, BoundaryKind::Closed);

    assert!(boundary.is_empty());
    let diagnostics = boundary.diagnostics();
    assert_eq!(diagnostics.section_count, 2);
    assert_eq!(diagnostics.resolved_section_count, 0);
    assert_eq!(diagnostics.skipped_sections.len(), 2);
    assert_eq!(diagnostics.skipped_sections[0].feature_id, FeatureId::new("missing"));
    assert!(!diagnostics.is_clean());
}

#[test]
fn three_crossing_lines_close_a_triangle() {
    let boundary = assemble_with(
        triangle_features(),
        &triangle_sections(),
        BoundaryKind::Closed,
    );

    assert_eq!(boundary.vertices().len(), 6, "{:?}", boundary.vertices());
    let ranges: Vec<_> = boundary
        .sub_segments()
        .iter()
        .map(|s| (s.feature_id.as_str().to_owned(), s.range.clone()))
        .collect();
    assert_eq!(
        ranges,
        vec![
            ("A".to_owned(), 0..3),
            ("B".to_owned(), 3..5),
            ("C".to_owned(), 5..6),
        ]
    );
    assert_tiles(&boundary);
    assert!(boundary.sub_segments()[2].reversed);

    // Interior vertices of each section survive untouched.
    let tol = Tolerance::new(1e-12);
    assert!(boundary.vertices()[1].coincides_with(ll(0.0, 10.0), tol));
    assert!(boundary.vertices()[3].coincides_with(ll(10.0, 20.0), tol));
    assert!(boundary.vertices()[5].coincides_with(ll(12.0, 10.0), tol));
    // A meets B on the equator at B's meridian.
    assert!(boundary.vertices()[2].coincides_with(ll(0.0, 20.0), Tolerance::new(1e-9)));

    let diagnostics = boundary.diagnostics();
    assert_eq!(diagnostics.intersections_resolved, 6);
    assert!(diagnostics.is_clean(), "{:?}", diagnostics.warnings);
    assert!(!boundary.is_degraded());

    assert_eq!(boundary.locate(ll(5.0, 12.0)), Membership::Inside);
    assert_eq!(boundary.locate(ll(-5.0, 12.0)), Membership::Outside);
    assert_eq!(boundary.locate(ll(5.0, 25.0)), Membership::Outside);
    assert_eq!(boundary.locate(ll(10.0, 20.0)), Membership::OnBoundary);
}

#[test]
fn resolving_twice_gives_the_same_boundary() {
    let store: MemoryFeatureStore = triangle_features().into_iter().collect();
    let rotations = RotationTable::new();
    let ctx = ResolveContext::new(&store, &rotations, 0.0, ResolveOptions::default());
    let sections = triangle_sections();

    let first = assemble(&sections, BoundaryKind::Closed, &ctx).unwrap();
    let second = assemble(&sections, BoundaryKind::Closed, &ctx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_section_is_skipped_and_the_rest_still_close() {
    let mut sections = triangle_sections();
    sections.insert(2, line("ghost"));

    let boundary = assemble_with(triangle_features(), &sections, BoundaryKind::Closed);
    assert_eq!(boundary.vertices().len(), 6);
    assert_eq!(boundary.sub_segments().len(), 3);
    assert_tiles(&boundary);

    let diagnostics = boundary.diagnostics();
    assert_eq!(diagnostics.section_count, 4);
    assert_eq!(diagnostics.resolved_section_count, 3);
    assert_eq!(diagnostics.skipped_sections.len(), 1);
    assert_eq!(diagnostics.skipped_sections[0].feature_id, FeatureId::new("ghost"));
}

#[test]
fn two_lines_crossing_twice_form_a_loop() {
    let first = [(0.0, -10.0), (10.0, 20.0), (0.0, 50.0)];
    let second = [(5.0, 0.0), (-10.0, 20.0), (5.0, 40.0)];
    let features = vec![line_feature("upper", &first), line_feature("lower", &second)];
    let sections = [line("upper"), line("lower").reversed(true)];

    let boundary = assemble_with(features, &sections, BoundaryKind::Closed);
    let found = boundary.vertices();
    assert_eq!(found.len(), 4, "{found:?}");
    assert_eq!(found[1], ll(10.0, 20.0));
    assert_eq!(found[3], ll(-10.0, 20.0));
    assert_eq!(boundary.sub_segments()[0].range, 0..3);
    assert_eq!(boundary.sub_segments()[1].range, 3..4);
    assert_tiles(&boundary);

    let diagnostics = boundary.diagnostics();
    assert_eq!(diagnostics.intersections_resolved, 2);
    assert!(diagnostics.is_clean(), "{:?}", diagnostics.warnings);
    assert_eq!(boundary.locate(ll(0.0, 20.0)), Membership::Inside);
    assert_eq!(boundary.locate(ll(0.0, 60.0)), Membership::Outside);
}

#[test]
fn open_line_trims_only_between_neighbours() {
    let features = vec![
        line_feature("west", &[(0.0, -10.0), (0.0, 10.0)]),
        line_feature("east", &[(-10.0, 5.0), (10.0, 5.0)]),
    ];
    let sections = [
        line("west").with_end_intersection(meets("east", (0.0, 0.0))),
        line("east").with_start_intersection(meets("west", (5.0, 5.0))),
    ];

    let boundary = assemble_with(features, &sections, BoundaryKind::Open);
    assert_same_vertices(
        boundary.vertices(),
        &vertices(&[(0.0, -10.0), (0.0, 5.0), (10.0, 5.0)]),
    );
    assert_eq!(boundary.sub_segments()[0].range, 0..2);
    assert_eq!(boundary.sub_segments()[1].range, 2..3);
    assert_eq!(boundary.diagnostics().intersections_resolved, 2);
    // Open lines have no interior.
    assert_eq!(boundary.locate(ll(1.0, 4.0)), Membership::Outside);
    assert_eq!(boundary.locate(ll(10.0, 5.0)), Membership::OnBoundary);
}

#[test]
fn repeated_crossings_leave_sections_untrimmed_and_degraded() {
    let zigzag = [(-5.0, 20.0), (5.0, 20.0), (5.0, 10.0), (-5.0, 10.0)];
    let features = vec![
        line_feature("straight", &[(0.0, 0.0), (0.0, 30.0)]),
        line_feature("zigzag", &zigzag),
    ];
    let sections = [
        line("straight").with_end_intersection(meets("zigzag", (0.0, 5.0))),
        line("zigzag").with_start_intersection(meets("straight", (5.0, 15.0))),
    ];

    let boundary = assemble_with(features, &sections, BoundaryKind::Open);
    assert!(boundary.is_degraded());
    // One report per neighbour test: straight against zigzag and back.
    assert_eq!(boundary.diagnostics().multiple_intersection_count, 2);
    assert_eq!(boundary.diagnostics().warnings.len(), 2);

    let straight = &boundary.sub_segments()[0];
    assert_eq!(
        boundary.sub_segment_vertices(straight),
        vertices(&[(0.0, 0.0), (0.0, 30.0)]).as_slice()
    );
    assert_eq!(boundary.vertices().len(), 6);
}

#[test]
fn point_sections_contribute_one_vertex() {
    let features = vec![
        line_feature("ridge", &[(0.0, 0.0), (0.0, 10.0)]),
        Feature::new("hotspot").with_property(
            property_names::POSITION,
            GeometryOnSphere::from(PointOnSphere::from_lat_lon(10.0, 5.0)),
        ),
    ];
    let sections = [
        line("ridge"),
        SectionReference::new("hotspot", property_names::POSITION),
    ];

    let boundary = assemble_with(features, &sections, BoundaryKind::Closed);
    assert_eq!(
        boundary.vertices(),
        vertices(&[(0.0, 0.0), (0.0, 10.0), (10.0, 5.0)]).as_slice()
    );
    assert_eq!(boundary.sub_segments()[1].shape, SubSegmentShape::Point);
    assert_eq!(boundary.sub_segments()[1].range, 2..3);
    assert_eq!(boundary.locate(ll(3.0, 5.0)), Membership::Inside);
}

#[test]
fn crossings_outside_the_kept_piece_do_not_degrade_the_boundary() {
    // "hook" crosses the full "middle" line twice, but only once within the
    // piece left after trimming "middle" against "cross".
    let features = vec![
        line_feature("hook", &[(-5.0, 0.0), (5.0, 0.0), (5.0, 25.0), (-5.0, 25.0)]),
        line_feature("middle", &[(0.0, -10.0), (0.0, 30.0)]),
        line_feature("cross", &[(-10.0, 20.0), (10.0, 20.0)]),
    ];
    let sections = [
        line("hook"),
        line("middle")
            .with_start_intersection(meets("hook", (0.0, 5.0)))
            .with_end_intersection(meets("cross", (0.0, 5.0))),
        line("cross"),
    ];

    let boundary = assemble_with(features, &sections, BoundaryKind::Open);
    let middle = &boundary.sub_segments()[1];
    assert_same_vertices(
        boundary.sub_segment_vertices(middle),
        &vertices(&[(0.0, 0.0), (0.0, 20.0)]),
    );

    let diagnostics = boundary.diagnostics();
    assert_eq!(diagnostics.intersections_resolved, 2);
    assert_eq!(diagnostics.multiple_intersection_count, 0);
    assert!(diagnostics.is_clean(), "{:?}", diagnostics.warnings);
    assert!(!boundary.is_degraded());
}

#[test]
fn tied_junction_is_reported_once() {
    let features = vec![
        line_feature("north-south", &[(0.0, -10.0), (0.0, 10.0)]),
        line_feature("east-west", &[(-10.0, 0.0), (10.0, 0.0)]),
    ];
    // The anchor lies on "east-west", as far from one piece of
    // "north-south" as from the other.
    let sections = [
        line("north-south").with_end_intersection(meets("east-west", (5.0, 0.0))),
        line("east-west"),
    ];

    let boundary = assemble_with(features, &sections, BoundaryKind::Open);
    let diagnostics = boundary.diagnostics();
    assert_eq!(diagnostics.ambiguous_choices, 1);
    assert_eq!(diagnostics.warnings.len(), 1, "{:?}", diagnostics.warnings);
    assert_eq!(diagnostics.intersections_resolved, 1);
    assert!(!boundary.is_degraded());

    // The head is kept.
    let first = &boundary.sub_segments()[0];
    assert_same_vertices(
        boundary.sub_segment_vertices(first),
        &vertices(&[(0.0, -10.0), (0.0, 0.0)]),
    );
}
