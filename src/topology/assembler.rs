//! Stitching of resolved sections into one boundary.
//!
//! Every section is reconstructed first and unusable ones are dropped. The
//! remaining sections are then walked as `(prev, current, next)` triples,
//! cyclically for closed boundaries. A line section starts from its full
//! reconstructed vertices and is trimmed where it crosses its neighbours,
//! keeping the piece nearest to the anchor declared for that side:
//!
//! ```text
//!          prev                        next
//!     ─────────┐                     ┌─────────
//!              │   current           │
//!   ───────────X═════════════════════X───────────
//!              │  (kept piece)       │
//! ```
//!
//! Two closed-boundary line sections that cross exactly twice are joined
//! through their middle pieces instead.

use crate::feature::FeatureId;
use crate::geom::{
    IntersectionError, Tolerance, UnitVector3, partition_at_single_intersection,
    partition_at_two_intersections,
};

use super::boundary::{BoundaryKind, ResolvedBoundary, SubSegment, SubSegmentShape};
use super::diagnostics::ResolveDiagnostics;
use super::resolver::{
    ResolveContext, ResolvedSection, SectionError, TopologicalLine, choose_piece,
    reconstruct_section,
};
use super::section::SectionReference;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures that abandon a whole boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("intersection engine failed on section {feature_id}: {source}")]
    Engine {
        feature_id: FeatureId,
        #[source]
        source: IntersectionError,
    },

    #[error(transparent)]
    Lookup(#[from] crate::feature::LookupError),

    #[error("feature {0} has no topological section list")]
    NotATopology(FeatureId),

    #[error("topological feature {id} is not active at {time} Ma")]
    Inactive { id: FeatureId, time: f64 },
}

// ─────────────────────────────────────────────────────────────────────────────
// Output builder
// ─────────────────────────────────────────────────────────────────────────────

struct BoundaryBuilder {
    vertices: Vec<UnitVector3>,
    sub_segments: Vec<SubSegment>,
    tol: Tolerance,
}

impl BoundaryBuilder {
    fn new(tol: Tolerance) -> Self {
        Self {
            vertices: Vec::new(),
            sub_segments: Vec::new(),
            tol,
        }
    }

    /// Appends `vertices` for `section`. A vertex equal to the current last
    /// vertex (a shared junction) is not repeated.
    fn append(&mut self, section: &ResolvedSection, vertices: &[UnitVector3], reversed: bool) {
        let start = self.vertices.len();
        for vertex in vertices {
            if self
                .vertices
                .last()
                .is_some_and(|last| last.coincides_with(*vertex, self.tol))
            {
                continue;
            }
            self.vertices.push(*vertex);
        }
        let shape = match section {
            ResolvedSection::Point(_) => SubSegmentShape::Point,
            ResolvedSection::Line(_) => SubSegmentShape::Line,
        };
        self.sub_segments.push(SubSegment {
            feature_id: section.feature_id().clone(),
            property_name: section.property_name().clone(),
            shape,
            range: start..self.vertices.len(),
            reversed,
        });
    }

    fn finish(
        mut self,
        kind: BoundaryKind,
        time: f64,
        diagnostics: ResolveDiagnostics,
    ) -> ResolvedBoundary {
        if kind == BoundaryKind::Closed && self.vertices.len() > 1 {
            let first = self.vertices[0];
            if self
                .vertices
                .last()
                .is_some_and(|last| last.coincides_with(first, self.tol))
            {
                self.vertices.pop();
                let len = self.vertices.len();
                for sub_segment in &mut self.sub_segments {
                    sub_segment.range.start = sub_segment.range.start.min(len);
                    sub_segment.range.end = sub_segment.range.end.min(len);
                }
            }
        }
        log::debug!(
            "assembled {} vertices from {} sub-segments ({})",
            self.vertices.len(),
            self.sub_segments.len(),
            diagnostics.summary()
        );
        ResolvedBoundary::new(
            kind,
            time,
            self.vertices,
            self.sub_segments,
            self.tol,
            diagnostics,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Neighbour trimming
// ─────────────────────────────────────────────────────────────────────────────

/// Trims `working` where it crosses `neighbor`, keeping the piece nearest
/// `anchor`.
///
/// No crossing leaves `working` untouched. More than one crossing is
/// reported, marks the boundary degraded and also leaves `working`
/// untouched. Malformed curves are reported and ignored; only engine
/// invariant violations are returned.
fn trim_against(
    working: &mut Vec<UnitVector3>,
    line: &TopologicalLine,
    neighbor: &TopologicalLine,
    anchor: UnitVector3,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Result<(), ResolveError> {
    let split = match partition_at_single_intersection(
        working.as_slice(),
        &neighbor.reconstructed,
        ctx.options.tolerance,
    ) {
        Ok(Some(split)) => split,
        Ok(None) => return Ok(()),
        Err(source @ IntersectionError::InvariantViolation { .. }) => {
            return Err(ResolveError::Engine {
                feature_id: line.feature_id.clone(),
                source,
            });
        }
        Err(err) => {
            diagnostics.warn(format!(
                "cannot intersect {} with {}: {err}",
                line.feature_id, neighbor.feature_id
            ));
            return Ok(());
        }
    };

    if split.has_multiple_intersections() {
        diagnostics.multiple_intersection_count += 1;
        diagnostics.warn(format!(
            "{} crosses {} {} times; leaving it untrimmed",
            line.feature_id, neighbor.feature_id, split.intersection_count
        ));
        return Ok(());
    }

    let Some(piece) = choose_piece(&split.first, anchor, &ctx.options) else {
        return Ok(());
    };
    if piece.ambiguous {
        diagnostics.ambiguous_choices += 1;
        diagnostics.warn(format!(
            "anchor of {} is not closer to either side of its crossing with {}; keeping the {:?}",
            line.feature_id, neighbor.feature_id, piece.choice
        ));
    }
    diagnostics.intersections_resolved += 1;
    *working = piece.polyline.vertices().to_vec();
    Ok(())
}

/// Vertices `line` contributes between `prev` and `next`, before reversal.
fn trimmed_line(
    line: &TopologicalLine,
    prev: Option<&ResolvedSection>,
    next: Option<&ResolvedSection>,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Result<Vec<UnitVector3>, ResolveError> {
    let mut working = line.reconstructed.clone();

    if let (Some(neighbor), Some(anchor)) =
        (next.and_then(ResolvedSection::as_line), line.end_anchor)
    {
        trim_against(&mut working, line, neighbor, anchor, ctx, diagnostics)?;
    }
    if let (Some(neighbor), Some(anchor)) =
        (prev.and_then(ResolvedSection::as_line), line.start_anchor)
    {
        trim_against(&mut working, line, neighbor, anchor, ctx, diagnostics)?;
    }
    Ok(working)
}

/// Appends the vertices of `section`, reversing them when flagged.
fn append_section(
    builder: &mut BoundaryBuilder,
    section: &ResolvedSection,
    mut vertices: Vec<UnitVector3>,
) {
    let reversed = section.as_line().is_some_and(|line| line.reverse);
    if reversed {
        vertices.reverse();
    }
    builder.append(section, &vertices, reversed);
}

// ─────────────────────────────────────────────────────────────────────────────
// Assembly
// ─────────────────────────────────────────────────────────────────────────────

/// Joins two line sections of a closed boundary through the middle pieces
/// of their two crossings. `Ok(false)` when they do not cross exactly twice.
fn assemble_two_crossing_loop(
    builder: &mut BoundaryBuilder,
    sections: &[ResolvedSection],
    ctx: &ResolveContext<'_>,
    diagnostics: &mut ResolveDiagnostics,
) -> Result<bool, ResolveError> {
    let [first_section, second_section] = sections else {
        return Ok(false);
    };
    let (Some(first), Some(second)) = (first_section.as_line(), second_section.as_line()) else {
        return Ok(false);
    };

    let two = match partition_at_two_intersections(
        &first.reconstructed,
        &second.reconstructed,
        ctx.options.tolerance,
    ) {
        Ok(Some(two)) => two,
        Ok(None) => return Ok(false),
        Err(source @ IntersectionError::InvariantViolation { .. }) => {
            return Err(ResolveError::Engine {
                feature_id: first.feature_id.clone(),
                source,
            });
        }
        Err(err) => {
            diagnostics.warn(format!(
                "cannot intersect {} with {}: {err}",
                first.feature_id, second.feature_id
            ));
            return Ok(false);
        }
    };
    let (Some(first_middle), Some(second_middle)) = (&two.first.middle, &two.second.middle) else {
        return Ok(false);
    };

    // Opposed middles close the loop as they are; otherwise exactly one of
    // the two must be reversed.
    if two.middle_segments_opposed != (first.reverse == second.reverse) {
        diagnostics.warn(format!(
            "reverse flags of {} and {} do not close their two-crossing loop",
            first.feature_id, second.feature_id
        ));
    }

    diagnostics.intersections_resolved += 2;
    append_section(builder, first_section, first_middle.vertices().to_vec());
    append_section(builder, second_section, second_middle.vertices().to_vec());
    Ok(true)
}

/// Reconstructs `sections` and stitches them into a boundary of `kind`.
///
/// Lines are trimmed only against their neighbours in the boundary, so the
/// diagnostics and [`ResolvedBoundary::is_degraded`] describe exactly the
/// crossings the assembled boundary was cut at.
///
/// Sections that cannot be resolved (missing, ambiguous or inactive
/// features, unusable geometry) are skipped and reported in the boundary's
/// diagnostics. No sections yield an empty boundary.
///
/// # Errors
/// [`ResolveError::Engine`] when the intersection engine breaks its own
/// invariants.
pub fn assemble(
    sections: &[SectionReference],
    kind: BoundaryKind,
    ctx: &ResolveContext<'_>,
) -> Result<ResolvedBoundary, ResolveError> {
    let mut diagnostics = ResolveDiagnostics::new();
    diagnostics.section_count = sections.len();

    let mut resolved: Vec<ResolvedSection> = Vec::with_capacity(sections.len());
    for reference in sections {
        match reconstruct_section(reference, ctx, &mut diagnostics) {
            Ok(section) => resolved.push(section),
            Err(SectionError::Intersection(
                source @ IntersectionError::InvariantViolation { .. },
            )) => {
                return Err(ResolveError::Engine {
                    feature_id: reference.feature_id.clone(),
                    source,
                });
            }
            Err(err) => diagnostics.skip(&reference.feature_id, err),
        }
    }
    diagnostics.resolved_section_count = resolved.len();

    let mut builder = BoundaryBuilder::new(ctx.options.tolerance);
    let closed = kind == BoundaryKind::Closed;
    if let [only] = resolved.as_slice() {
        append_section(&mut builder, only, only.vertices().to_vec());
    } else if !(closed
        && assemble_two_crossing_loop(&mut builder, &resolved, ctx, &mut diagnostics)?)
    {
        let count = resolved.len();
        for (index, section) in resolved.iter().enumerate() {
            let vertices = match section {
                ResolvedSection::Point(point) => vec![point.point],
                ResolvedSection::Line(line) => {
                    let prev = if closed {
                        Some(&resolved[(index + count - 1) % count])
                    } else {
                        index.checked_sub(1).map(|i| &resolved[i])
                    };
                    let next = if closed {
                        Some(&resolved[(index + 1) % count])
                    } else {
                        resolved.get(index + 1)
                    };
                    trimmed_line(line, prev, next, ctx, &mut diagnostics)?
                }
            };
            append_section(&mut builder, section, vertices);
        }
    }

    Ok(builder.finish(kind, ctx.time, diagnostics))
}
