//! Import boundary: thin collaborators that turn external file formats into
//! the core's owned types. Distance, grade, and heading are derived
//! geometrically; no map-matching or surface classification is attempted
//! beyond a caller-supplied default rolling resistance coefficient.

pub mod gpx;
pub mod physics;
pub mod rider;
