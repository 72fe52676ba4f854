use serde::{Deserialize, Serialize};

use crate::geom::{DEFAULT_PROXIMITY_THRESHOLD, Tolerance};

/// Options for boundary resolution.
///
/// # Example
///
/// ```
/// use plate_topology::topology::ResolveOptions;
///
/// let options = ResolveOptions::new().with_proximity_threshold(0.95);
/// assert_eq!(options.proximity_threshold, 0.95);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Closeness (cosine of angular distance) an anchor needs to a candidate
    /// sub-curve before that candidate can be chosen.
    pub proximity_threshold: f64,
    /// Tolerance for crossings, shared vertices and boundary hits.
    pub tolerance: Tolerance,
    /// Interval in Myr over which velocities are differenced.
    pub velocity_delta_time: f64,
}

impl ResolveOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            tolerance: Tolerance::DEFAULT,
            velocity_delta_time: 1.0,
        }
    }

    #[must_use]
    pub const fn with_proximity_threshold(mut self, threshold: f64) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_velocity_delta_time(mut self, delta_time: f64) -> Self {
        self.velocity_delta_time = delta_time;
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::new()
    }
}
