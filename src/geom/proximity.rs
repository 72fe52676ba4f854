use super::core::UnitVector3;

/// Default closeness inclusion threshold used to pick sub-curves by anchor.
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 0.9;

/// A test point plus the thresholds used to decide whether geometry is
/// "close" to it.
///
/// Closeness is the cosine of an angular distance, so it lies in `[-1, 1]`
/// and larger means nearer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityCriteria {
    test_point: UnitVector3,
    closeness_inclusion_threshold: f64,
    latitude_exclusion_threshold: f64,
}

impl ProximityCriteria {
    /// Builds the criteria, deriving the latitude exclusion threshold as
    /// `sqrt(1 - t²)` from the inclusion threshold `t`.
    #[must_use]
    pub fn new(test_point: UnitVector3, closeness_inclusion_threshold: f64) -> Self {
        let t = closeness_inclusion_threshold.clamp(-1.0, 1.0);
        Self {
            test_point,
            closeness_inclusion_threshold: t,
            latitude_exclusion_threshold: (1.0 - t * t).max(0.0).sqrt(),
        }
    }

    #[must_use]
    pub const fn test_point(&self) -> UnitVector3 {
        self.test_point
    }

    #[must_use]
    pub const fn closeness_inclusion_threshold(&self) -> f64 {
        self.closeness_inclusion_threshold
    }

    /// Sine of the largest angular distance from a great circle that can
    /// still pass the inclusion threshold.
    #[must_use]
    pub const fn latitude_exclusion_threshold(&self) -> f64 {
        self.latitude_exclusion_threshold
    }

    /// Closeness of a single point, if it passes the inclusion threshold.
    #[must_use]
    pub fn point_closeness(&self, point: UnitVector3) -> Option<f64> {
        let closeness = self.test_point.dot(point);
        (closeness >= self.closeness_inclusion_threshold).then_some(closeness)
    }
}
