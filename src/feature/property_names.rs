//! Well-known property names.

use super::PropertyName;

pub const RECONSTRUCTION_PLATE_ID: PropertyName =
    PropertyName::from_static("reconstructionPlateId");
pub const NAME: PropertyName = PropertyName::from_static("name");
pub const VALID_TIME: PropertyName = PropertyName::from_static("validTime");

pub const CENTER_LINE_OF: PropertyName = PropertyName::from_static("centerLineOf");
pub const POSITION: PropertyName = PropertyName::from_static("position");
pub const OUTLINE_OF: PropertyName = PropertyName::from_static("outlineOf");

/// Section list of a topological closed plate boundary.
pub const BOUNDARY: PropertyName = PropertyName::from_static("boundary");
/// Section list of a topological line.
pub const TOPOLOGICAL_LINE: PropertyName = PropertyName::from_static("topologicalLine");
