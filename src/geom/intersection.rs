//! Partitioning of two curves at their mutual crossings.
//!
//! [`partition`] walks every arc of the first curve against every arc of the
//! second, collects the crossing points and splits both curves there. The
//! result is an [`IntersectionGraph`]: an arena of intersection nodes and
//! partitioned sub-curves, linked by index along each original curve.
//!
//! ```text
//!   first curve:   P0 ──▶ N0 ──▶ P1 ──▶ N1 ──▶ P2
//!   second curve:  Q0 ──▶ N1 ──▶ Q1 ──▶ N0 ──▶ Q2
//! ```
//!
//! Nodes are numbered in first-curve order. Each node links to at most one
//! previous and one next partition per curve; a missing link means the
//! crossing sits on that curve's endpoint (a T- or V-junction).
//!
//! The graph is built per query and owns everything it references, so it can
//! be dropped as soon as the caller has taken the pieces it needs.

use std::sync::Arc;

use super::arc::GreatCircleArc;
use super::core::{Tolerance, UnitVector3};
use super::geometry::{GeometryError, PolylineOnSphere};

// ─────────────────────────────────────────────────────────────────────────────
// Handles
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier for an intersection node within one graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeIndex(pub usize);

/// Identifier for a partitioned sub-curve within one graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PartitionIndex(pub usize);

/// Which of the two input curves a link or partition belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CurveSide {
    First,
    Second,
}

impl CurveSide {
    pub const BOTH: [Self; 2] = [Self::First, Self::Second];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures of the intersection engine.
///
/// The first two variants are malformed input; callers are expected to reject
/// such curves before asking for a partition. `InvariantViolation` indicates
/// a defect in the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntersectionError {
    #[error("{side:?} curve needs at least 2 vertices, got {count}")]
    InsufficientVertices { side: CurveSide, count: usize },

    #[error("{side:?} curve has a degenerate arc at {index}: {source}")]
    DegenerateArc {
        side: CurveSide,
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error("{side:?} curve partition {index} is not a valid polyline: {source}")]
    InvalidPartition {
        side: CurveSide,
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error("intersection node {node} has no link into the {side:?} curve")]
    InvariantViolation { node: usize, side: CurveSide },
}

// ─────────────────────────────────────────────────────────────────────────────
// Graph elements
// ─────────────────────────────────────────────────────────────────────────────

/// A point where the two curves cross.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionNode {
    point: UnitVector3,
    prev: [Option<PartitionIndex>; 2],
    next: [Option<PartitionIndex>; 2],
}

impl IntersectionNode {
    #[must_use]
    pub const fn point(&self) -> UnitVector3 {
        self.point
    }

    #[must_use]
    pub const fn prev_partition(&self, side: CurveSide) -> Option<PartitionIndex> {
        self.prev[side.index()]
    }

    #[must_use]
    pub const fn next_partition(&self, side: CurveSide) -> Option<PartitionIndex> {
        self.next[side.index()]
    }

    /// Whether either curve ends at this node.
    #[must_use]
    pub fn is_junction(&self) -> bool {
        self.prev.iter().chain(self.next.iter()).any(Option::is_none)
    }
}

/// A piece of one original curve between two nodes (or a node and a curve end).
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedCurve {
    polyline: Arc<PolylineOnSphere>,
    side: CurveSide,
    sequence: usize,
    prev_node: Option<NodeIndex>,
    next_node: Option<NodeIndex>,
}

impl PartitionedCurve {
    #[must_use]
    pub fn polyline(&self) -> &Arc<PolylineOnSphere> {
        &self.polyline
    }

    #[must_use]
    pub const fn side(&self) -> CurveSide {
        self.side
    }

    #[must_use]
    pub const fn prev_node(&self) -> Option<NodeIndex> {
        self.prev_node
    }

    #[must_use]
    pub const fn next_node(&self) -> Option<NodeIndex> {
        self.next_node
    }
}

/// Both curves split at every mutual crossing.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionGraph {
    nodes: Vec<IntersectionNode>,
    partitions: Vec<PartitionedCurve>,
    curve_partitions: [Vec<PartitionIndex>; 2],
    curve_nodes: [Vec<NodeIndex>; 2],
}

impl IntersectionGraph {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &IntersectionNode {
        &self.nodes[index.0]
    }

    #[must_use]
    pub fn partition(&self, index: PartitionIndex) -> &PartitionedCurve {
        &self.partitions[index.0]
    }

    /// Nodes in the order they are met walking along `side`.
    #[must_use]
    pub fn nodes_along(&self, side: CurveSide) -> &[NodeIndex] {
        &self.curve_nodes[side.index()]
    }

    /// Partitions of `side` in curve order.
    #[must_use]
    pub fn partitions_along(&self, side: CurveSide) -> &[PartitionIndex] {
        &self.curve_partitions[side.index()]
    }

    /// All crossing points. The order carries no meaning; walk the graph with
    /// [`IntersectionGraph::nodes_along`] and the node links instead.
    #[must_use]
    pub fn intersection_points(&self) -> Vec<UnitVector3> {
        self.nodes.iter().map(IntersectionNode::point).collect()
    }

    /// Partitions of `side` from the curve start up to `node`, joined.
    /// `None` when the curve starts at the node.
    #[must_use]
    pub fn head_at(&self, node: NodeIndex, side: CurveSide) -> Option<Arc<PolylineOnSphere>> {
        let last = self.node(node).prev_partition(side)?;
        let upto = self.partition(last).sequence;
        self.join(&self.curve_partitions[side.index()][..=upto])
    }

    /// Partitions of `side` from `node` to the curve end, joined.
    /// `None` when the curve ends at the node.
    #[must_use]
    pub fn tail_at(&self, node: NodeIndex, side: CurveSide) -> Option<Arc<PolylineOnSphere>> {
        let first = self.node(node).next_partition(side)?;
        let from = self.partition(first).sequence;
        self.join(&self.curve_partitions[side.index()][from..])
    }

    /// Partitions of `side` strictly between two nodes met in that order.
    #[must_use]
    pub fn between(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        side: CurveSide,
    ) -> Option<Arc<PolylineOnSphere>> {
        let start = self.partition(self.node(from).next_partition(side)?).sequence;
        let end = self.partition(self.node(to).prev_partition(side)?).sequence;
        if start > end {
            return None;
        }
        self.join(&self.curve_partitions[side.index()][start..=end])
    }

    fn join(&self, parts: &[PartitionIndex]) -> Option<Arc<PolylineOnSphere>> {
        match parts {
            [] => None,
            [single] => Some(Arc::clone(&self.partition(*single).polyline)),
            _ => {
                let mut vertices: Vec<UnitVector3> = Vec::new();
                for part in parts {
                    let piece = self.partition(*part).polyline.vertices();
                    let skip = usize::from(!vertices.is_empty());
                    vertices.extend_from_slice(&piece[skip..]);
                }
                PolylineOnSphere::new(vertices).ok().map(Arc::new)
            }
        }
    }

    fn validate(&self) -> Result<(), IntersectionError> {
        for (index, node) in self.nodes.iter().enumerate() {
            for side in CurveSide::BOTH {
                if node.prev_partition(side).is_none() && node.next_partition(side).is_none() {
                    return Err(IntersectionError::InvariantViolation { node: index, side });
                }
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Partitioning
// ─────────────────────────────────────────────────────────────────────────────

/// Position along a curve: arc index plus the fraction along that arc.
/// Vertex `k` sits exactly at `k as f64`.
type CurvePosition = f64;

#[derive(Debug, Clone, Copy)]
struct Crossing {
    point: UnitVector3,
    position: [CurvePosition; 2],
}

fn build_curve_arcs(
    vertices: &[UnitVector3],
    side: CurveSide,
) -> Result<Vec<GreatCircleArc>, IntersectionError> {
    if vertices.len() < 2 {
        return Err(IntersectionError::InsufficientVertices {
            side,
            count: vertices.len(),
        });
    }
    vertices
        .windows(2)
        .enumerate()
        .map(|(index, w)| {
            GreatCircleArc::new(w[0], w[1])
                .map_err(|source| IntersectionError::DegenerateArc { side, index, source })
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn position_on_arc(arc: &GreatCircleArc, index: usize, p: UnitVector3) -> CurvePosition {
    if p == arc.start() {
        index as f64
    } else if p == arc.end() {
        (index + 1) as f64
    } else {
        index as f64 + arc.parameter_of(p)
    }
}

fn find_crossings(
    first: &[GreatCircleArc],
    second: &[GreatCircleArc],
    tol: Tolerance,
) -> Vec<Crossing> {
    let mut crossings = Vec::new();
    for (i, arc_a) in first.iter().enumerate() {
        for (j, arc_b) in second.iter().enumerate() {
            if let Some(point) = arc_a.intersect(arc_b, tol) {
                crossings.push(Crossing {
                    point,
                    position: [
                        position_on_arc(arc_a, i, point),
                        position_on_arc(arc_b, j, point),
                    ],
                });
            }
        }
    }

    crossings.sort_by(|a, b| {
        a.position[0]
            .total_cmp(&b.position[0])
            .then(a.position[1].total_cmp(&b.position[1]))
    });
    // A crossing on a shared vertex is found once per adjoining arc, and a
    // closed ring meets itself at its first vertex.
    let mut unique: Vec<Crossing> = Vec::with_capacity(crossings.len());
    for crossing in crossings {
        if !unique.iter().any(|kept| kept.point.coincides_with(crossing.point, tol)) {
            unique.push(crossing);
        }
    }
    unique
}

/// Vertices of `curve` from `(start_pos, start)` to `(end_pos, end)`.
#[allow(clippy::cast_precision_loss)]
fn sub_curve(
    curve: &[UnitVector3],
    (start_pos, start): (CurvePosition, UnitVector3),
    (end_pos, end): (CurvePosition, UnitVector3),
    tol: Tolerance,
) -> Vec<UnitVector3> {
    let mut vertices = vec![start];
    for (k, vertex) in curve.iter().enumerate() {
        let at = k as f64;
        let last = vertices[vertices.len() - 1];
        if at > start_pos && at < end_pos && !vertex.coincides_with(last, tol) {
            vertices.push(*vertex);
        }
    }
    if end.coincides_with(vertices[vertices.len() - 1], tol) {
        if vertices.len() > 1 {
            let last = vertices.len() - 1;
            vertices[last] = end;
        }
    } else {
        vertices.push(end);
    }
    vertices
}

fn empty_node(point: UnitVector3) -> IntersectionNode {
    IntersectionNode {
        point,
        prev: [None; 2],
        next: [None; 2],
    }
}

/// Degenerate partition of a curve against itself: every vertex is a node
/// and every arc a partition shared by both sides.
fn partition_self(curve: &[UnitVector3]) -> Result<IntersectionGraph, IntersectionError> {
    let mut nodes: Vec<IntersectionNode> = curve.iter().map(|v| empty_node(*v)).collect();
    let mut partitions = Vec::new();
    let mut curve_partitions = [Vec::new(), Vec::new()];

    for (index, pair) in curve.windows(2).enumerate() {
        let polyline = PolylineOnSphere::new(pair.to_vec()).map_err(|source| {
            IntersectionError::InvalidPartition {
                side: CurveSide::First,
                index,
                source,
            }
        })?;
        let polyline = Arc::new(polyline);
        for side in CurveSide::BOTH {
            let handle = PartitionIndex(partitions.len());
            partitions.push(PartitionedCurve {
                polyline: Arc::clone(&polyline),
                side,
                sequence: index,
                prev_node: Some(NodeIndex(index)),
                next_node: Some(NodeIndex(index + 1)),
            });
            nodes[index].next[side.index()] = Some(handle);
            nodes[index + 1].prev[side.index()] = Some(handle);
            curve_partitions[side.index()].push(handle);
        }
    }

    let order: Vec<NodeIndex> = (0..nodes.len()).map(NodeIndex).collect();
    let graph = IntersectionGraph {
        nodes,
        partitions,
        curve_partitions,
        curve_nodes: [order.clone(), order],
    };
    graph.validate()?;
    Ok(graph)
}

/// Splits both curves at every point where `first` crosses `second`.
///
/// Returns `Ok(None)` when the curves do not cross. Self-intersections of
/// either curve are not recorded. Passing the very same vertex slice twice
/// makes every vertex a node.
///
/// # Errors
/// Returns an error when either curve has fewer than two vertices or a
/// degenerate arc, or when the built graph breaks its own link invariant.
pub fn partition(
    first: &[UnitVector3],
    second: &[UnitVector3],
    tol: Tolerance,
) -> Result<Option<IntersectionGraph>, IntersectionError> {
    let first_arcs = build_curve_arcs(first, CurveSide::First)?;
    let second_arcs = build_curve_arcs(second, CurveSide::Second)?;

    if std::ptr::eq(first, second) {
        return partition_self(first).map(Some);
    }

    let crossings = find_crossings(&first_arcs, &second_arcs, tol);
    if crossings.is_empty() {
        return Ok(None);
    }

    let mut nodes: Vec<IntersectionNode> = crossings.iter().map(|c| empty_node(c.point)).collect();
    let mut partitions = Vec::new();
    let mut curve_partitions = [Vec::new(), Vec::new()];
    let mut curve_nodes = [Vec::new(), Vec::new()];

    for (side, curve) in CurveSide::BOTH.into_iter().zip([first, second]) {
        let s = side.index();
        let mut order: Vec<NodeIndex> = (0..crossings.len()).map(NodeIndex).collect();
        order.sort_by(|a, b| crossings[a.0].position[s].total_cmp(&crossings[b.0].position[s]));

        let mut prev_node: Option<NodeIndex> = None;
        let mut from = (0.0, curve[0]);
        let end_of_curve = (f64::INFINITY, curve[curve.len() - 1]);

        for next_node in order.iter().copied().map(Some).chain(std::iter::once(None)) {
            let to = next_node.map_or(end_of_curve, |n| {
                (crossings[n.0].position[s], crossings[n.0].point)
            });
            let vertices = sub_curve(curve, from, to, tol);

            if vertices.len() >= 2 {
                let sequence = curve_partitions[s].len();
                let polyline = PolylineOnSphere::new(vertices).map_err(|source| {
                    IntersectionError::InvalidPartition {
                        side,
                        index: sequence,
                        source,
                    }
                })?;
                let handle = PartitionIndex(partitions.len());
                partitions.push(PartitionedCurve {
                    polyline: Arc::new(polyline),
                    side,
                    sequence,
                    prev_node,
                    next_node,
                });
                if let Some(n) = prev_node {
                    nodes[n.0].next[s] = Some(handle);
                }
                if let Some(n) = next_node {
                    nodes[n.0].prev[s] = Some(handle);
                }
                curve_partitions[s].push(handle);
            }

            if let Some(n) = next_node {
                prev_node = Some(n);
                from = (crossings[n.0].position[s], crossings[n.0].point);
            }
        }
        curve_nodes[s] = order;
    }

    let graph = IntersectionGraph {
        nodes,
        partitions,
        curve_partitions,
        curve_nodes,
    };
    graph.validate()?;
    Ok(Some(graph))
}

// ─────────────────────────────────────────────────────────────────────────────
// Convenience entry points
// ─────────────────────────────────────────────────────────────────────────────

/// The two halves of one curve either side of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadTail {
    /// From the curve start to the node; `None` if the curve starts there.
    pub head: Option<Arc<PolylineOnSphere>>,
    /// From the node to the curve end; `None` if the curve ends there.
    pub tail: Option<Arc<PolylineOnSphere>>,
}

/// Both curves split at their first crossing (in first-curve order).
#[derive(Debug, Clone, PartialEq)]
pub struct SingleIntersection {
    pub point: UnitVector3,
    /// Total number of crossings found; only the first one was used.
    pub intersection_count: usize,
    pub first: HeadTail,
    pub second: HeadTail,
}

impl SingleIntersection {
    #[must_use]
    pub const fn has_multiple_intersections(&self) -> bool {
        self.intersection_count > 1
    }

    #[must_use]
    pub const fn pieces(&self, side: CurveSide) -> &HeadTail {
        match side {
            CurveSide::First => &self.first,
            CurveSide::Second => &self.second,
        }
    }
}

/// Partitions the curves and splits each at the first node.
///
/// Curves that should cross once but cross several times are logged and the
/// first node in first-curve order is used.
///
/// # Errors
/// Same as [`partition`].
pub fn partition_at_single_intersection(
    first: &[UnitVector3],
    second: &[UnitVector3],
    tol: Tolerance,
) -> Result<Option<SingleIntersection>, IntersectionError> {
    let Some(graph) = partition(first, second, tol)? else {
        return Ok(None);
    };

    let count = graph.node_count();
    if count > 1 {
        log::warn!(
            "expected a single intersection between sections, found {count}; using the first"
        );
    }

    let node = graph.nodes_along(CurveSide::First)[0];
    let split = |side| HeadTail {
        head: graph.head_at(node, side),
        tail: graph.tail_at(node, side),
    };
    Ok(Some(SingleIntersection {
        point: graph.node(node).point(),
        intersection_count: count,
        first: split(CurveSide::First),
        second: split(CurveSide::Second),
    }))
}

/// The three pieces of one curve cut at two nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadMiddleTail {
    pub head: Option<Arc<PolylineOnSphere>>,
    pub middle: Option<Arc<PolylineOnSphere>>,
    pub tail: Option<Arc<PolylineOnSphere>>,
}

/// Both curves split at exactly two crossings.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoIntersections {
    /// Crossing points in first-curve order.
    pub points: [UnitVector3; 2],
    pub first: HeadMiddleTail,
    pub second: HeadMiddleTail,
    /// True when the second curve's head ends at the second node (in first-
    /// curve order), so the two middle pieces run in opposite directions and
    /// together close a loop.
    pub middle_segments_opposed: bool,
}

/// Partitions two curves known to cross exactly twice.
///
/// Returns `Ok(None)` unless exactly two crossings exist.
///
/// # Errors
/// Same as [`partition`].
pub fn partition_at_two_intersections(
    first: &[UnitVector3],
    second: &[UnitVector3],
    tol: Tolerance,
) -> Result<Option<TwoIntersections>, IntersectionError> {
    let Some(graph) = partition(first, second, tol)? else {
        return Ok(None);
    };
    if graph.node_count() != 2 {
        log::debug!(
            "two-intersection partition requested but {} intersections found",
            graph.node_count()
        );
        return Ok(None);
    }

    let split = |side: CurveSide| {
        let along = graph.nodes_along(side);
        HeadMiddleTail {
            head: graph.head_at(along[0], side),
            middle: graph.between(along[0], along[1], side),
            tail: graph.tail_at(along[1], side),
        }
    };

    let first_order = graph.nodes_along(CurveSide::First);
    let second_head_end = graph.nodes_along(CurveSide::Second)[0];

    Ok(Some(TwoIntersections {
        points: [
            graph.node(first_order[0]).point(),
            graph.node(first_order[1]).point(),
        ],
        first: split(CurveSide::First),
        second: split(CurveSide::Second),
        middle_segments_opposed: second_head_end == first_order[1],
    }))
}
