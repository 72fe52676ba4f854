use std::collections::HashMap;

use crate::geom::FiniteRotation;

use super::PlateId;

/// Supplies the absolute rotation of a plate at a reconstruction time.
///
/// Must be a pure function of `(plate_id, time)` and safe for concurrent reads.
pub trait RotationModel: Sync {
    fn absolute_rotation(&self, plate_id: PlateId, time: f64) -> FiniteRotation;
}

impl<R: RotationModel + ?Sized> RotationModel for &R {
    fn absolute_rotation(&self, plate_id: PlateId, time: f64) -> FiniteRotation {
        (**self).absolute_rotation(plate_id, time)
    }
}

/// Per-plate total reconstruction samples, interpolated between sample
/// times.
///
/// Plate 0, plates without samples and times outside a plate's sampled range
/// all yield the identity rotation.
#[derive(Debug, Clone, Default)]
pub struct RotationTable {
    samples: HashMap<PlateId, Vec<(f64, FiniteRotation)>>,
}

impl RotationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a total reconstruction pole for `plate_id` at `time` (Ma).
    pub fn insert(&mut self, plate_id: PlateId, time: f64, rotation: FiniteRotation) {
        let samples = self.samples.entry(plate_id).or_default();
        let at = samples.partition_point(|(t, _)| *t < time);
        if samples.get(at).is_some_and(|(t, _)| *t == time) {
            samples[at].1 = rotation;
        } else {
            samples.insert(at, (time, rotation));
        }
    }

    /// Builder variant of [`RotationTable::insert`].
    #[must_use]
    pub fn with_sample(mut self, plate_id: PlateId, time: f64, rotation: FiniteRotation) -> Self {
        self.insert(plate_id, time, rotation);
        self
    }

    #[must_use]
    pub fn plate_ids(&self) -> Vec<PlateId> {
        let mut ids: Vec<_> = self.samples.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl RotationModel for RotationTable {
    fn absolute_rotation(&self, plate_id: PlateId, time: f64) -> FiniteRotation {
        if plate_id == PlateId::ANCHOR {
            return FiniteRotation::identity();
        }
        let Some(samples) = self.samples.get(&plate_id) else {
            log::debug!("no rotation samples for plate {plate_id}; using identity");
            return FiniteRotation::identity();
        };

        let after = samples.partition_point(|(t, _)| *t < time);
        match (after.checked_sub(1).map(|i| samples[i]), samples.get(after)) {
            (_, Some((t, rotation))) if *t == time => *rotation,
            (Some((t0, r0)), Some((t1, r1))) => r0.interpolate(r1, (time - t0) / (t1 - t0)),
            _ => {
                log::debug!(
                    "time {time} Ma outside the samples of plate {plate_id}; using identity"
                );
                FiniteRotation::identity()
            }
        }
    }
}
