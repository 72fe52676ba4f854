use std::collections::HashMap;

use super::{FeatureId, PlateId, PropertyName, PropertyValue, TimePeriod, property_names};

/// Lookup failures. Both are treated as "this section is unusable".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("feature {0} not found")]
    Missing(FeatureId),

    #[error("feature id {id} is shared by {count} features")]
    Ambiguous { id: FeatureId, count: usize },
}

/// A feature: an identifier plus named property values.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: FeatureId,
    properties: Vec<(PropertyName, PropertyValue)>,
}

impl Feature {
    #[must_use]
    pub fn new(id: impl Into<FeatureId>) -> Self {
        Self {
            id: id.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a property, replacing any earlier value with the same name.
    #[must_use]
    pub fn with_property(mut self, name: PropertyName, value: impl Into<PropertyValue>) -> Self {
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    #[must_use]
    pub fn property(&self, name: &PropertyName) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    pub fn properties(&self) -> impl Iterator<Item = (&PropertyName, &PropertyValue)> {
        self.properties.iter().map(|(n, v)| (n, v))
    }

    /// Reconstruction plate id at `time`, if the feature has one.
    #[must_use]
    pub fn plate_id(&self, time: f64) -> Option<PlateId> {
        self.property(&property_names::RECONSTRUCTION_PLATE_ID)?
            .at_time(time)?
            .as_plate_id()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.property(&property_names::NAME)?.at_time(0.0)?.as_text()
    }

    /// Valid time; features without one exist at all times.
    #[must_use]
    pub fn valid_time(&self) -> TimePeriod {
        self.property(&property_names::VALID_TIME)
            .and_then(|value| value.at_time(0.0))
            .and_then(PropertyValue::as_time_period)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_active_at(&self, time: f64) -> bool {
        self.valid_time().contains(time)
    }
}

/// Read access to features by identifier.
///
/// Implementations must be safe for concurrent reads when boundaries are
/// resolved in parallel.
pub trait FeatureStore: Sync {
    /// All features carrying `id`, in store order.
    fn find(&self, id: &FeatureId) -> Vec<&Feature>;

    /// The single feature carrying `id`.
    ///
    /// # Errors
    /// [`LookupError::Missing`] when no feature matches and
    /// [`LookupError::Ambiguous`] when several do.
    fn resolve_feature(&self, id: &FeatureId) -> Result<&Feature, LookupError> {
        let matches = self.find(id);
        match matches.as_slice() {
            [] => Err(LookupError::Missing(id.clone())),
            [feature] => Ok(*feature),
            _ => Err(LookupError::Ambiguous {
                id: id.clone(),
                count: matches.len(),
            }),
        }
    }
}

/// Vector-backed store with an identifier index.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeatureStore {
    features: Vec<Feature>,
    index: HashMap<FeatureId, Vec<usize>>,
}

impl MemoryFeatureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature. Duplicate identifiers are kept and make lookups of
    /// that identifier ambiguous.
    pub fn insert(&mut self, feature: Feature) {
        let slot = self.features.len();
        self.index.entry(feature.id().clone()).or_default().push(slot);
        self.features.push(feature);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl FromIterator<Feature> for MemoryFeatureStore {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut store = Self::new();
        for feature in iter {
            store.insert(feature);
        }
        store
    }
}

impl FeatureStore for MemoryFeatureStore {
    fn find(&self, id: &FeatureId) -> Vec<&Feature> {
        self.index
            .get(id)
            .map(|slots| slots.iter().map(|&slot| &self.features[slot]).collect())
            .unwrap_or_default()
    }
}
