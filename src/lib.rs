#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Resolution of topological plate boundaries on the unit sphere.
//!
//! A topological boundary is an ordered list of references to other
//! features. [`TopologyResolver`] reconstructs each referenced geometry at a
//! given time, trims adjacent sections at their crossings, stitches the
//! pieces into one [`ResolvedBoundary`] and records which feature each run of
//! vertices came from.
//!
//! ```
//! use plate_topology::feature::{Feature, MemoryFeatureStore, RotationTable, property_names};
//! use plate_topology::geom::{GeometryOnSphere, PolygonOnSphere, UnitVector3};
//! use plate_topology::topology::{Membership, SectionReference};
//! use plate_topology::TopologyResolver;
//!
//! let outline = PolygonOnSphere::from_lat_lon(&[(0.0, 0.0), (0.0, 10.0), (10.0, 5.0)]).unwrap();
//! let store: MemoryFeatureStore = [Feature::new("outline")
//!     .with_property(property_names::OUTLINE_OF, GeometryOnSphere::from(outline))]
//! .into_iter()
//! .collect();
//! let rotations = RotationTable::new();
//!
//! let resolver = TopologyResolver::new(&store, &rotations);
//! let sections = [SectionReference::new("outline", property_names::OUTLINE_OF)];
//! let boundary = resolver.resolve_boundary(&sections, 0.0).unwrap();
//!
//! assert_eq!(boundary.vertices().len(), 3);
//! let inside = UnitVector3::from(plate_topology::geom::LatLonPoint::new(3.0, 5.0));
//! assert_eq!(boundary.locate(inside), Membership::Inside);
//! ```

pub mod feature;
pub mod geom;
pub mod topology;

use feature::{FeatureId, FeatureStore, PropertyValue, RotationModel, property_names};
use topology::{
    BoundaryKind, ResolveContext, ResolveDiagnostics, ResolveError, ResolveOptions,
    ResolvedBoundary, ResolvedSection, SectionError, SectionReference, Velocity, assemble,
    resolve_section,
};

pub use topology::{Membership, locate};

/// Entry point tying a feature store and a rotation model together.
///
/// Both collaborators are only read, so one resolver can serve any number of
/// reconstruction times, and [`TopologyResolver::resolve_all`] may share it
/// across threads.
#[derive(Clone, Copy)]
pub struct TopologyResolver<'a> {
    store: &'a dyn FeatureStore,
    rotations: &'a dyn RotationModel,
    options: ResolveOptions,
}

impl<'a> TopologyResolver<'a> {
    #[must_use]
    pub fn new(store: &'a dyn FeatureStore, rotations: &'a dyn RotationModel) -> Self {
        Self {
            store,
            rotations,
            options: ResolveOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &ResolveOptions {
        &self.options
    }

    fn context(&self, time: f64) -> ResolveContext<'a> {
        ResolveContext::new(self.store, self.rotations, time, self.options)
    }

    /// Resolves a single section reference at `time`.
    ///
    /// # Errors
    /// See [`SectionError`].
    pub fn resolve_section(
        &self,
        reference: &SectionReference,
        time: f64,
    ) -> Result<(ResolvedSection, ResolveDiagnostics), SectionError> {
        let mut diagnostics = ResolveDiagnostics::new();
        let section = resolve_section(reference, &self.context(time), &mut diagnostics)?;
        Ok((section, diagnostics))
    }

    /// Resolves `sections` into a closed boundary at `time`.
    ///
    /// # Errors
    /// Only engine invariant violations; unusable sections are skipped and
    /// reported in the boundary's diagnostics.
    pub fn resolve_boundary(
        &self,
        sections: &[SectionReference],
        time: f64,
    ) -> Result<ResolvedBoundary, ResolveError> {
        assemble(sections, BoundaryKind::Closed, &self.context(time))
    }

    /// Resolves `sections` into an open line at `time`.
    ///
    /// # Errors
    /// As [`TopologyResolver::resolve_boundary`].
    pub fn resolve_line(
        &self,
        sections: &[SectionReference],
        time: f64,
    ) -> Result<ResolvedBoundary, ResolveError> {
        assemble(sections, BoundaryKind::Open, &self.context(time))
    }

    /// Resolves a topological feature from the store.
    ///
    /// The section list is read from the feature's
    /// [`property_names::BOUNDARY`] property, or from
    /// [`property_names::TOPOLOGICAL_LINE`] when it has no boundary.
    ///
    /// # Errors
    /// Lookup failures, a feature that is inactive at `time` or has no
    /// section list, and engine invariant violations.
    pub fn resolve_topological_feature(
        &self,
        id: &FeatureId,
        time: f64,
    ) -> Result<ResolvedBoundary, ResolveError> {
        let feature = self.store.resolve_feature(id)?;
        if !feature.is_active_at(time) {
            return Err(ResolveError::Inactive {
                id: id.clone(),
                time,
            });
        }

        let sections = [property_names::BOUNDARY, property_names::TOPOLOGICAL_LINE]
            .iter()
            .find_map(|name| feature.property(name)?.at_time(time))
            .and_then(|value| match value {
                PropertyValue::TopologicalSections { kind, sections } => Some((*kind, sections)),
                _ => None,
            });
        let Some((kind, sections)) = sections else {
            return Err(ResolveError::NotATopology(id.clone()));
        };

        log::debug!(
            "resolving topological feature {id} ({} sections) at {time} Ma",
            sections.len()
        );
        let boundary = assemble(sections, kind, &self.context(time))?;
        Ok(boundary.with_owner(id.clone(), feature.plate_id(time)))
    }

    /// Plate velocities at `points` for a boundary this resolver produced,
    /// differenced over [`ResolveOptions::velocity_delta_time`]. `None` for
    /// points outside the boundary.
    #[must_use]
    pub fn velocities(
        &self,
        boundary: &ResolvedBoundary,
        points: &[geom::UnitVector3],
    ) -> Vec<Option<Velocity>> {
        boundary.velocities(points, self.rotations, self.options.velocity_delta_time)
    }

    /// Resolves several topological features at the same time.
    ///
    /// Results are in input order. With the `parallel` feature the features
    /// are resolved on the rayon thread pool.
    #[must_use]
    pub fn resolve_all(
        &self,
        ids: &[FeatureId],
        time: f64,
    ) -> Vec<Result<ResolvedBoundary, ResolveError>> {
        resolve_each(self, ids, time)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        fn resolve_each(
            resolver: &TopologyResolver<'_>,
            ids: &[FeatureId],
            time: f64,
        ) -> Vec<Result<ResolvedBoundary, ResolveError>> {
            use rayon::prelude::*;
            ids.par_iter()
                .map(|id| resolver.resolve_topological_feature(id, time))
                .collect()
        }
    } else {
        fn resolve_each(
            resolver: &TopologyResolver<'_>,
            ids: &[FeatureId],
            time: f64,
        ) -> Vec<Result<ResolvedBoundary, ResolveError>> {
            ids.iter()
                .map(|id| resolver.resolve_topological_feature(id, time))
                .collect()
        }
    }
}
