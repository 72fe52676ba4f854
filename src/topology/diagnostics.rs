//! Diagnostics collected while resolving one boundary.
//!
//! Section-level problems never abort a boundary. They are logged through the
//! `log` facade and recorded here so callers can judge how far to trust the
//! result.
//!
//! # Example
//!
//! ```ignore
//! let boundary = resolver.resolve_boundary(&sections, 10.0)?;
//! if !boundary.diagnostics().is_clean() {
//!     for warning in &boundary.diagnostics().warnings {
//!         eprintln!("warning: {warning}");
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;

use crate::feature::FeatureId;

/// A section that contributed no vertices, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSection {
    pub feature_id: FeatureId,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveDiagnostics {
    /// Number of section references in the input list.
    pub section_count: usize,

    /// Sections that resolved to a usable point or line.
    pub resolved_section_count: usize,

    /// Sections dropped because their feature was missing, ambiguous,
    /// inactive or had an unusable geometry.
    pub skipped_sections: Vec<SkippedSection>,

    /// Neighbour tests that found exactly one crossing and trimmed a section.
    pub intersections_resolved: usize,

    /// Trims where neither piece was strictly closer to the anchor, so the
    /// head was kept.
    pub ambiguous_choices: usize,

    /// Neighbour tests that found more crossings than expected.
    ///
    /// Each one marks the boundary as degraded.
    pub multiple_intersection_count: usize,

    /// Human-readable warnings, in the order they were raised.
    pub warnings: Vec<String>,
}

impl ResolveDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `warning` at warn level and records it.
    pub fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Records a skipped section and logs why.
    pub fn skip(&mut self, feature_id: &FeatureId, reason: impl fmt::Display) {
        let reason = reason.to_string();
        self.warn(format!("skipping section {feature_id}: {reason}"));
        self.skipped_sections.push(SkippedSection {
            feature_id: feature_id.clone(),
            reason,
        });
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// No section skipped, no ambiguous choice, no unexpected crossings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped_sections.is_empty()
            && self.ambiguous_choices == 0
            && self.multiple_intersection_count == 0
            && self.warnings.is_empty()
    }

    /// Short summary for logging.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "sections:{}/{}",
            self.resolved_section_count, self.section_count
        )];
        if self.intersections_resolved > 0 {
            parts.push(format!("trimmed:{}", self.intersections_resolved));
        }
        if !self.skipped_sections.is_empty() {
            parts.push(format!("skipped:{}", self.skipped_sections.len()));
        }
        if self.ambiguous_choices > 0 {
            parts.push(format!("ambiguous:{}", self.ambiguous_choices));
        }
        if self.multiple_intersection_count > 0 {
            parts.push(format!("multi-crossing:{}", self.multiple_intersection_count));
        }
        parts.join(" ")
    }
}

impl fmt::Display for ResolveDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
