use super::ll;
use crate::feature::{Feature, MemoryFeatureStore, PlateId, RotationTable, property_names};
use crate::geom::{FiniteRotation, GeometryOnSphere, PolygonOnSphere, UnitVector3};
use crate::topology::{
    BoundaryKind, EARTH_RADIUS_KM, ResolveContext, ResolveOptions, SectionReference, Velocity,
    assemble, velocity_at,
};

const SPINNING: PlateId = PlateId(101);

/// Plate 101 turns eastward about the north pole by 1° per Myr.
fn spinning_plate() -> RotationTable {
    RotationTable::new()
        .with_sample(SPINNING, 0.0, FiniteRotation::identity())
        .with_sample(
            SPINNING,
            10.0,
            FiniteRotation::from_euler_pole(UnitVector3::NORTH_POLE, 10.0),
        )
}

#[test]
fn fixed_plate_does_not_move() {
    let rotations = spinning_plate();
    let velocity = velocity_at(ll(30.0, 40.0), PlateId::ANCHOR, 0.0, 1.0, &rotations);
    assert_eq!(velocity, Velocity::ZERO);
    assert_eq!(velocity.magnitude(), 0.0);
}

#[test]
fn spinning_plate_moves_west_at_the_equator() {
    let rotations = spinning_plate();
    let velocity = velocity_at(ll(0.0, 0.0), SPINNING, 0.0, 1.0, &rotations);

    // One degree of equator per Myr, in cm/yr.
    let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians() * 0.1;
    assert!((velocity.east + expected).abs() < 1e-3, "{velocity:?}");
    assert!(velocity.north.abs() < 1e-9, "{velocity:?}");
    assert!((velocity.azimuth() - 270.0).abs() < 1e-6);

    // Speed falls off with the cosine of latitude.
    let north = velocity_at(ll(60.0, 0.0), SPINNING, 0.0, 1.0, &rotations);
    assert!((north.magnitude() - expected * 0.5).abs() < 1e-3, "{north:?}");
}

#[test]
fn non_positive_interval_yields_zero() {
    let rotations = spinning_plate();
    assert_eq!(
        velocity_at(ll(0.0, 0.0), SPINNING, 0.0, 0.0, &rotations),
        Velocity::ZERO
    );
    assert_eq!(
        velocity_at(ll(0.0, 0.0), SPINNING, 0.0, -1.0, &rotations),
        Velocity::ZERO
    );
}

#[test]
fn boundary_velocities_cover_only_inside_points() {
    let square = [(-5.0, -5.0), (-5.0, 5.0), (5.0, 5.0), (5.0, -5.0)];
    let outline = PolygonOnSphere::from_lat_lon(&square).unwrap();
    let store: MemoryFeatureStore = [Feature::new("plate")
        .with_property(property_names::OUTLINE_OF, GeometryOnSphere::from(outline))]
    .into_iter()
    .collect();
    let rotations = spinning_plate();
    let ctx = ResolveContext::new(&store, &rotations, 0.0, ResolveOptions::default());
    let sections = [SectionReference::new("plate", property_names::OUTLINE_OF)];

    let boundary = assemble(&sections, BoundaryKind::Closed, &ctx)
        .unwrap()
        .with_owner("plate".into(), Some(SPINNING));
    let velocities = boundary.velocities(&[ll(0.0, 0.0), ll(20.0, 0.0)], &rotations, 1.0);

    assert_eq!(velocities.len(), 2);
    assert!(velocities[0].expect("inside").east < 0.0);
    assert!(velocities[1].is_none());
}
