//! Resolution of one section reference into reconstructed, disambiguated
//! geometry.
//!
//! A section is resolved in four steps:
//!
//! 1. [`extract_params`] reads the plate id, valid time and geometry from the
//!    referenced feature at the reconstruction time.
//! 2. [`reconstruct_params`] rotates that geometry with the plate's absolute
//!    rotation.
//! 3. [`reconstruct_section`] dispatches on the resulting shape and rotates
//!    the anchors of its declared intersections.
//! 4. [`resolve_section`] additionally trims lines at each declared
//!    intersection, keeping the piece nearest to the reconstructed anchor.

use std::sync::Arc;

use serde::Serialize;

use crate::feature::{
    Feature, FeatureId, FeatureStore, LookupError, PlateId, PropertyName, RotationModel,
    TimePeriod,
};
use crate::geom::{
    GeometryOnSphere, HeadTail, IntersectionError, PolylineOnSphere, ProximityCriteria,
    Tolerance, UnitVector3, partition_at_single_intersection, reconstruct,
};

use super::diagnostics::ResolveDiagnostics;
use super::options::ResolveOptions;
use super::section::{IntersectionDescriptor, PropertyDelegate, SectionReference};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Why a section could not be resolved.
///
/// Every variant except an engine invariant violation means "skip this
/// section"; see [`SectionError::is_fatal`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SectionError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("feature {id} is not active at {time} Ma")]
    Inactive { id: FeatureId, time: f64 },

    #[error("feature {id} has no property {property}")]
    MissingProperty { id: FeatureId, property: PropertyName },

    #[error("property {property} of feature {id} has no value at {time} Ma")]
    NoValueAtTime {
        id: FeatureId,
        property: PropertyName,
        time: f64,
    },

    #[error("property {property} of feature {id} is not a geometry")]
    NotAGeometry { id: FeatureId, property: PropertyName },

    #[error("{kind} geometry cannot be used as a boundary section")]
    UnsupportedGeometry { kind: &'static str },

    #[error(transparent)]
    Intersection(#[from] IntersectionError),
}

impl SectionError {
    /// Engine invariant violations are bugs, not data problems, and must not
    /// be absorbed.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Intersection(IntersectionError::InvariantViolation { .. })
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter extraction and reconstruction
// ─────────────────────────────────────────────────────────────────────────────

/// What is needed to reconstruct one geometry property of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionParams {
    pub plate_id: PlateId,
    pub valid_time: TimePeriod,
    /// Present-day geometry, with time-dependent wrappers already removed.
    pub geometry: GeometryOnSphere,
}

/// Reads the reconstruction parameters of `feature`'s `property_name` at
/// `time`.
///
/// Features without a plate id are reconstructed with [`PlateId::ANCHOR`].
///
/// # Errors
/// [`SectionError::Inactive`] outside the feature's valid time, and the
/// property errors when the property is absent, has no value at `time` or is
/// not a geometry.
pub fn extract_params(
    feature: &Feature,
    property_name: &PropertyName,
    time: f64,
) -> Result<ReconstructionParams, SectionError> {
    let valid_time = feature.valid_time();
    if !valid_time.contains(time) {
        return Err(SectionError::Inactive {
            id: feature.id().clone(),
            time,
        });
    }

    let value = feature
        .property(property_name)
        .ok_or_else(|| SectionError::MissingProperty {
            id: feature.id().clone(),
            property: property_name.clone(),
        })?;
    let value = value.at_time(time).ok_or_else(|| SectionError::NoValueAtTime {
        id: feature.id().clone(),
        property: property_name.clone(),
        time,
    })?;
    let geometry = value
        .as_geometry()
        .ok_or_else(|| SectionError::NotAGeometry {
            id: feature.id().clone(),
            property: property_name.clone(),
        })?
        .clone();

    let plate_id = feature.plate_id(time).unwrap_or_else(|| {
        log::debug!("feature {} has no plate id; not rotating it", feature.id());
        PlateId::ANCHOR
    });

    Ok(ReconstructionParams {
        plate_id,
        valid_time,
        geometry,
    })
}

/// Rotates the extracted geometry to its position at `time`.
#[must_use]
pub fn reconstruct_params(
    params: &ReconstructionParams,
    time: f64,
    rotations: &dyn RotationModel,
) -> GeometryOnSphere {
    let rotation = rotations.absolute_rotation(params.plate_id, time);
    reconstruct(&params.geometry, &rotation)
}

// ─────────────────────────────────────────────────────────────────────────────
// Shape dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// The role a reconstructed geometry can play in a boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionShape {
    Point(UnitVector3),
    /// Polyline vertices, or a polygon ring with its first vertex repeated.
    Line(Vec<UnitVector3>),
    Unsupported(&'static str),
}

impl SectionShape {
    #[must_use]
    pub fn of(geometry: &GeometryOnSphere) -> Self {
        match geometry {
            GeometryOnSphere::Point(point) => Self::Point(point.position()),
            GeometryOnSphere::Polyline(polyline) => Self::Line(polyline.vertices().to_vec()),
            GeometryOnSphere::Polygon(polygon) => {
                Self::Line(polygon.exterior_as_polyline_vertices())
            }
            GeometryOnSphere::MultiPoint(_) => Self::Unsupported(geometry.type_name()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolved sections
// ─────────────────────────────────────────────────────────────────────────────

/// Which piece of a curve split at a crossing was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PieceChoice {
    Head,
    Tail,
}

/// Outcome of trimming a line at one declared intersection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologicalIntersection {
    /// Crossing point the line was cut at.
    pub point: UnitVector3,
    /// Anchor after rotation to the reconstruction time.
    pub reconstructed_anchor: UnitVector3,
    pub intersection_count: usize,
    pub choice: PieceChoice,
    /// Neither piece was strictly closer to the anchor.
    pub ambiguous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologicalPoint {
    pub feature_id: FeatureId,
    pub property_name: PropertyName,
    pub point: UnitVector3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologicalLine {
    pub feature_id: FeatureId,
    pub property_name: PropertyName,
    pub reverse: bool,
    /// Full reconstructed vertices, before any trimming.
    pub reconstructed: Vec<UnitVector3>,
    /// Vertices after trimming at the declared intersections.
    pub vertices: Vec<UnitVector3>,
    pub start_anchor: Option<UnitVector3>,
    pub end_anchor: Option<UnitVector3>,
    pub start_intersection: Option<TopologicalIntersection>,
    pub end_intersection: Option<TopologicalIntersection>,
    /// An intersection crossed more than once and only the first crossing
    /// was used.
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolvedSection {
    Point(TopologicalPoint),
    Line(TopologicalLine),
}

impl ResolvedSection {
    #[must_use]
    pub fn feature_id(&self) -> &FeatureId {
        match self {
            Self::Point(point) => &point.feature_id,
            Self::Line(line) => &line.feature_id,
        }
    }

    #[must_use]
    pub fn property_name(&self) -> &PropertyName {
        match self {
            Self::Point(point) => &point.property_name,
            Self::Line(line) => &line.property_name,
        }
    }

    #[must_use]
    pub fn as_line(&self) -> Option<&TopologicalLine> {
        match self {
            Self::Line(line) => Some(line),
            Self::Point(_) => None,
        }
    }

    /// Resolved vertices: the point itself, or the trimmed line.
    #[must_use]
    pub fn vertices(&self) -> &[UnitVector3] {
        match self {
            Self::Point(point) => std::slice::from_ref(&point.point),
            Self::Line(line) => &line.vertices,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only collaborators and settings shared by every section of a
/// resolution.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub store: &'a dyn FeatureStore,
    pub rotations: &'a dyn RotationModel,
    pub time: f64,
    pub options: ResolveOptions,
}

impl<'a> ResolveContext<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn FeatureStore,
        rotations: &'a dyn RotationModel,
        time: f64,
        options: ResolveOptions,
    ) -> Self {
        Self {
            store,
            rotations,
            time,
            options,
        }
    }

    /// Looks up, extracts and reconstructs one geometry property.
    ///
    /// # Errors
    /// Lookup and extraction failures, see [`SectionError`].
    pub fn reconstructed_geometry(
        &self,
        feature_id: &FeatureId,
        property_name: &PropertyName,
    ) -> Result<GeometryOnSphere, SectionError> {
        let feature = self.store.resolve_feature(feature_id)?;
        let params = extract_params(feature, property_name, self.time)?;
        Ok(reconstruct_params(&params, self.time, self.rotations))
    }

    fn delegated_plate_id(&self, delegate: &PropertyDelegate) -> Option<PlateId> {
        let feature = self.store.resolve_feature(&delegate.feature_id).ok()?;
        feature
            .property(&delegate.property_name)?
            .at_time(self.time)?
            .as_plate_id()
    }

    /// Rotates a descriptor's present-day anchor to the reconstruction time.
    ///
    /// An anchor whose plate id cannot be found stays at its present-day
    /// position.
    pub fn reconstruct_anchor(
        &self,
        descriptor: &IntersectionDescriptor,
        diagnostics: &mut ResolveDiagnostics,
    ) -> UnitVector3 {
        let anchor = descriptor.reference_point.position();
        let delegate = &descriptor.reference_point_plate_id;
        match self.delegated_plate_id(delegate) {
            Some(plate_id) => self
                .rotations
                .absolute_rotation(plate_id, self.time)
                .rotate(anchor),
            None => {
                diagnostics.warn(format!(
                    "no plate id at {} via {}.{}; using the present-day anchor",
                    self.time, delegate.feature_id, delegate.property_name
                ));
                anchor
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Piece selection
// ─────────────────────────────────────────────────────────────────────────────

/// The piece of a split curve kept for a section.
#[derive(Debug, Clone)]
pub struct ChosenPiece {
    pub choice: PieceChoice,
    pub polyline: Arc<PolylineOnSphere>,
    pub ambiguous: bool,
}

/// Picks the head or tail nearest to `anchor`.
///
/// The strictly closer piece wins. When only one piece exists it is taken.
/// Ties within [`Tolerance::CLOSENESS`], or an anchor close to neither piece,
/// keep the head and are reported as ambiguous. Returns `None` only when
/// both pieces are missing.
#[must_use]
pub fn choose_piece(
    pieces: &HeadTail,
    anchor: UnitVector3,
    options: &ResolveOptions,
) -> Option<ChosenPiece> {
    let pick = |choice, polyline: &Arc<PolylineOnSphere>, ambiguous| ChosenPiece {
        choice,
        polyline: Arc::clone(polyline),
        ambiguous,
    };

    let (head, tail) = match (&pieces.head, &pieces.tail) {
        (None, None) => return None,
        (Some(head), None) => return Some(pick(PieceChoice::Head, head, false)),
        (None, Some(tail)) => return Some(pick(PieceChoice::Tail, tail, false)),
        (Some(head), Some(tail)) => (head, tail),
    };

    let criteria = ProximityCriteria::new(anchor, options.proximity_threshold);
    let chosen = match (head.is_close_to(&criteria), tail.is_close_to(&criteria)) {
        (Some(h), Some(t)) if Tolerance::CLOSENESS.approx_eq_f64(h, t) => {
            pick(PieceChoice::Head, head, true)
        }
        (Some(h), Some(t)) if t > h => pick(PieceChoice::Tail, tail, false),
        (Some(_), _) => pick(PieceChoice::Head, head, false),
        (None, Some(_)) => pick(PieceChoice::Tail, tail, false),
        (None, None) => pick(PieceChoice::Head, head, true),
    };
    Some(chosen)
}

// ─────────────────────────────────────────────────────────────────────────────
// Section resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves the geometry a descriptor names as adjacent, as vertices usable
/// for an intersection test. `None` (with a warning) when the adjacent
/// geometry is not a line or cannot be resolved.
fn adjacent_line(
    descriptor: &IntersectionDescriptor,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Option<Vec<UnitVector3>> {
    let adjacent = &descriptor.adjacent;
    match ctx.reconstructed_geometry(&adjacent.feature_id, &adjacent.property_name) {
        Ok(geometry) => match SectionShape::of(&geometry) {
            SectionShape::Line(vertices) => Some(vertices),
            SectionShape::Point(_) | SectionShape::Unsupported(_) => {
                log::debug!(
                    "adjacent section {} is a {}; nothing to intersect",
                    adjacent.feature_id,
                    geometry.type_name()
                );
                None
            }
        },
        Err(err) => {
            diagnostics.warn(format!(
                "adjacent section {} unavailable: {err}",
                adjacent.feature_id
            ));
            None
        }
    }
}

/// Trims `working` at its crossing with `adjacent`, keeping the piece nearest
/// `anchor`. Returns the trimmed vertices, or `None` when there is nothing to
/// trim.
fn trim_at_descriptor(
    working: &[UnitVector3],
    adjacent: &[UnitVector3],
    anchor: UnitVector3,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Result<Option<(Vec<UnitVector3>, TopologicalIntersection)>, SectionError> {
    let Some(split) =
        partition_at_single_intersection(working, adjacent, ctx.options.tolerance)?
    else {
        log::debug!("declared neighbours do not intersect; using the section in full");
        return Ok(None);
    };
    let Some(piece) = choose_piece(&split.first, anchor, &ctx.options) else {
        return Ok(None);
    };
    if piece.ambiguous {
        diagnostics.ambiguous_choices += 1;
        diagnostics.warn(format!(
            "anchor is not closer to either side of the crossing; keeping the {:?}",
            piece.choice
        ));
    }

    let intersection = TopologicalIntersection {
        point: split.point,
        reconstructed_anchor: anchor,
        intersection_count: split.intersection_count,
        choice: piece.choice,
        ambiguous: piece.ambiguous,
    };
    Ok(Some((piece.polyline.vertices().to_vec(), intersection)))
}

/// Looks up and reconstructs one section reference and rotates its anchors,
/// without trimming it at its declared intersections.
///
/// This is what a boundary is assembled from: the assembler trims each line
/// against its actual neighbours itself.
///
/// # Errors
/// Lookup and extraction failures, and [`SectionError::UnsupportedGeometry`]
/// for geometries that cannot be a section.
pub fn reconstruct_section(
    reference: &SectionReference,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Result<ResolvedSection, SectionError> {
    let geometry = ctx.reconstructed_geometry(&reference.feature_id, &reference.property_name)?;

    let reconstructed = match SectionShape::of(&geometry) {
        SectionShape::Point(point) => {
            return Ok(ResolvedSection::Point(TopologicalPoint {
                feature_id: reference.feature_id.clone(),
                property_name: reference.property_name.clone(),
                point,
            }));
        }
        SectionShape::Unsupported(kind) => {
            return Err(SectionError::UnsupportedGeometry { kind });
        }
        SectionShape::Line(vertices) => vertices,
    };

    let start_anchor = reference
        .start_intersection
        .as_ref()
        .map(|descriptor| ctx.reconstruct_anchor(descriptor, diagnostics));
    let end_anchor = reference
        .end_intersection
        .as_ref()
        .map(|descriptor| ctx.reconstruct_anchor(descriptor, diagnostics));

    Ok(ResolvedSection::Line(TopologicalLine {
        feature_id: reference.feature_id.clone(),
        property_name: reference.property_name.clone(),
        reverse: reference.reverse,
        vertices: reconstructed.clone(),
        reconstructed,
        start_anchor,
        end_anchor,
        start_intersection: None,
        end_intersection: None,
        degraded: false,
    }))
}

/// Resolves one section reference at the context's reconstruction time,
/// trimming lines at their declared intersections: start first, then end.
///
/// # Errors
/// Any [`SectionError`]. Callers assembling a boundary skip the section
/// unless [`SectionError::is_fatal`] holds.
pub fn resolve_section(
    reference: &SectionReference,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Result<ResolvedSection, SectionError> {
    let mut line = match reconstruct_section(reference, ctx, diagnostics)? {
        ResolvedSection::Line(line) => line,
        point @ ResolvedSection::Point(_) => return Ok(point),
    };

    for (descriptor, anchor, at_start) in [
        (reference.start_intersection.as_ref(), line.start_anchor, true),
        (reference.end_intersection.as_ref(), line.end_anchor, false),
    ] {
        let (Some(descriptor), Some(anchor)) = (descriptor, anchor) else {
            continue;
        };
        let Some(adjacent) = adjacent_line(descriptor, ctx, diagnostics) else {
            continue;
        };
        let Some((vertices, intersection)) =
            trim_at_descriptor(&line.vertices, &adjacent, anchor, ctx, diagnostics)?
        else {
            continue;
        };
        if intersection.intersection_count > 1 {
            line.degraded = true;
            diagnostics.multiple_intersection_count += 1;
            diagnostics.warn(format!(
                "{} crosses {} {} times; trimming at the first crossing",
                line.feature_id, descriptor.adjacent.feature_id, intersection.intersection_count
            ));
        }
        line.vertices = vertices;
        if at_start {
            line.start_intersection = Some(intersection);
        } else {
            line.end_intersection = Some(intersection);
        }
    }

    Ok(ResolvedSection::Line(line))
}
