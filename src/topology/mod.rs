//! Resolution of topological boundaries and lines.
//!
//! A topological feature does not store its own geometry. It lists
//! [`SectionReference`]s to other features, and its shape at a reconstruction
//! time is rebuilt from theirs:
//!
//! - [`resolver`] turns one reference into a reconstructed point or line,
//!   trimmed at its declared intersections.
//! - [`assembler`] stitches the resolved sections into a [`ResolvedBoundary`],
//!   trimming each line against its neighbours.
//! - [`membership`] answers bounds, pole-enclosure and point-in-boundary
//!   queries on the result.
//! - [`velocity`] samples plate velocities at points the boundary covers.

pub mod assembler;
mod boundary;
mod diagnostics;
pub mod membership;
mod options;
pub mod resolver;
mod section;
pub mod velocity;

pub use assembler::{ResolveError, assemble};
pub use boundary::{BoundaryKind, ResolvedBoundary, SubSegment, SubSegmentShape};
pub use diagnostics::{ResolveDiagnostics, SkippedSection};
pub use membership::{Bounds, Membership, PoleEnclosure, compute_bounds, locate};
pub use options::ResolveOptions;
pub use resolver::{
    PieceChoice, ReconstructionParams, ResolveContext, ResolvedSection, SectionError,
    SectionShape, TopologicalIntersection, TopologicalLine, TopologicalPoint, extract_params,
    reconstruct_params, reconstruct_section, resolve_section,
};
pub use section::{IntersectionDescriptor, PropertyDelegate, SectionReference};
pub use velocity::{EARTH_RADIUS_KM, Velocity, velocity_at};

#[cfg(test)]
mod tests;
