//! Surface velocities from plate rotations.

use serde::Serialize;

use crate::feature::{PlateId, RotationModel};
use crate::geom::{UnitVector3, Vec3};

/// Mean Earth radius used to scale unit-sphere displacements.
pub const EARTH_RADIUS_KM: f64 = 6371.009;

/// km/Myr to cm/yr.
const KM_PER_MYR_TO_CM_PER_YR: f64 = 0.1;

/// Horizontal surface velocity in cm/yr.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Velocity {
    pub north: f64,
    pub east: f64,
}

impl Velocity {
    pub const ZERO: Self = Self {
        north: 0.0,
        east: 0.0,
    };

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.north.hypot(self.east)
    }

    /// Direction of motion in degrees clockwise from north, in `[0, 360)`.
    #[must_use]
    pub fn azimuth(&self) -> f64 {
        self.east.atan2(self.north).to_degrees().rem_euclid(360.0)
    }
}

/// Velocity at `point` (its position at `time`) of a point fixed to
/// `plate_id`.
///
/// The plate is moved back by the stage rotation from `time` to
/// `time + delta_time` and the displacement is averaged over that interval.
/// A non-positive `delta_time` yields [`Velocity::ZERO`].
#[must_use]
pub fn velocity_at(
    point: UnitVector3,
    plate_id: PlateId,
    time: f64,
    delta_time: f64,
    rotations: &dyn RotationModel,
) -> Velocity {
    if delta_time <= 0.0 {
        log::warn!("velocity interval must be positive, got {delta_time} Myr");
        return Velocity::ZERO;
    }

    let young = rotations.absolute_rotation(plate_id, time);
    let old = rotations.absolute_rotation(plate_id, time + delta_time);
    let stage = old.compose(&young.inverse());
    let earlier = stage.rotate(point);

    let scale = EARTH_RADIUS_KM / delta_time * KM_PER_MYR_TO_CM_PER_YR;
    let displacement: Vec3 = (point.as_vec3() - earlier.as_vec3()) * scale;

    let position = point.to_lat_lon();
    let (sin_lat, cos_lat) = position.lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = position.lon.to_radians().sin_cos();
    let north = Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let east = Vec3::new(-sin_lon, cos_lon, 0.0);

    Velocity {
        north: displacement.dot(north),
        east: displacement.dot(east),
    }
}
