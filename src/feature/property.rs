use crate::geom::GeometryOnSphere;
use crate::topology::{BoundaryKind, SectionReference};

use super::{PlateId, TimePeriod};

/// Value of one feature property.
///
/// `ConstantValue` and `PiecewiseAggregation` are wrappers: use
/// [`PropertyValue::at_time`] to reach the value that applies at a given
/// reconstruction time.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Geometry(GeometryOnSphere),
    PlateId(PlateId),
    Text(String),
    TimePeriod(TimePeriod),
    /// Ordered section list of a topological boundary or line.
    TopologicalSections {
        kind: BoundaryKind,
        sections: Vec<SectionReference>,
    },
    ConstantValue(Box<PropertyValue>),
    PiecewiseAggregation(Vec<TimeWindow>),
}

/// One piece of a time-dependent property.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub period: TimePeriod,
    pub value: PropertyValue,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(period: TimePeriod, value: PropertyValue) -> Self {
        Self { period, value }
    }
}

impl PropertyValue {
    /// Wraps `value` in a constant-value wrapper.
    #[must_use]
    pub fn constant(value: Self) -> Self {
        Self::ConstantValue(Box::new(value))
    }

    /// Strips wrappers, selecting the time window that contains `time`.
    /// `None` when no window covers `time`.
    #[must_use]
    pub fn at_time(&self, time: f64) -> Option<&Self> {
        match self {
            Self::ConstantValue(inner) => inner.at_time(time),
            Self::PiecewiseAggregation(windows) => windows
                .iter()
                .find(|window| window.period.contains(time))
                .and_then(|window| window.value.at_time(time)),
            other => Some(other),
        }
    }

    #[must_use]
    pub fn as_geometry(&self) -> Option<&GeometryOnSphere> {
        if let Self::Geometry(geometry) = self {
            Some(geometry)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_plate_id(&self) -> Option<PlateId> {
        if let Self::PlateId(id) = self {
            Some(*id)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(text) = self {
            Some(text)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_time_period(&self) -> Option<TimePeriod> {
        if let Self::TimePeriod(period) = self {
            Some(*period)
        } else {
            None
        }
    }
}

impl From<GeometryOnSphere> for PropertyValue {
    fn from(geometry: GeometryOnSphere) -> Self {
        Self::Geometry(geometry)
    }
}

impl From<PlateId> for PropertyValue {
    fn from(id: PlateId) -> Self {
        Self::PlateId(id)
    }
}

impl From<TimePeriod> for PropertyValue {
    fn from(period: TimePeriod) -> Self {
        Self::TimePeriod(period)
    }
}
