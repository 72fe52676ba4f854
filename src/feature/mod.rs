//! The collaborator model the resolver reads from: features, their
//! properties, and the rotation model used to reconstruct them.
//!
//! Storage and file formats belong to the embedding application. This module
//! only fixes the lookup interface ([`FeatureStore`], [`RotationModel`]) and
//! ships in-memory implementations of both.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod property_names;
mod property;
mod rotations;
mod store;

pub use property::{PropertyValue, TimeWindow};
pub use rotations::{RotationModel, RotationTable};
pub use store::{Feature, FeatureStore, LookupError, MemoryFeatureStore};

/// Identifier shared by a feature and every reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(String);

impl FeatureId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FeatureId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Name of a feature property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyName(Cow<'static, str>);

impl PropertyName {
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyName {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_owned()))
    }
}

/// Reconstruction plate identifier. Plate 0 is the fixed reference frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct PlateId(pub u32);

impl PlateId {
    pub const ANCHOR: Self = Self(0);
}

impl fmt::Display for PlateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geological time interval in Ma. `begin` is the older bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub begin: f64,
    pub end: f64,
}

impl TimePeriod {
    /// From the distant past to the distant future.
    pub const ALL_TIME: Self = Self {
        begin: f64::INFINITY,
        end: f64::NEG_INFINITY,
    };

    #[must_use]
    pub const fn new(begin: f64, end: f64) -> Self {
        Self { begin, end }
    }

    /// Whether `time` lies within the period, bounds included.
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time <= self.begin && time >= self.end
    }
}

impl Default for TimePeriod {
    fn default() -> Self {
        Self::ALL_TIME
    }
}
