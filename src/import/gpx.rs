//! GPX course import: turns a `.gpx` track into the ordered [`Segment`]
//! chain the core consumes.
//!
//! Grounded on `original_source/src/gpx_loader.py`'s `GpxLoader.load` and
//! `_haversine_distance`/`_calculate_bearing`/`compress_segments`: points
//! closer than 5 m apart are dropped (grade-spike filtering), distance is
//! haversine, heading is initial bearing, and grade is elevation delta over
//! horizontal distance, clamped to `[-0.25, 0.25]` per §3. This crate treats
//! each consecutive trackpoint pair as one atomic segment rather than
//! running the Python loader's adaptive `compress_segments` merge pass —
//! map-matching/segmentation policy is explicitly out of the core's scope
//! (§1), so the import boundary stays the simplest faithful reading of the
//! track.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use gpx::read;

use crate::error::{ImportError, PacerError, Result};
use crate::models::Segment;

/// Earth radius used for the haversine distance, in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Trackpoint pairs closer than this are dropped to avoid GPS-noise grade
/// spikes, matching the reference loader's filter.
const MIN_POINT_SPACING_M: f64 = 5.0;

/// Parse a GPX track file into an ordered, contiguous [`Segment`] chain.
///
/// Every consecutive pair of (filtered) trackpoints becomes one segment.
/// `default_crr` is applied to every segment, since GPX carries no surface
/// classification; a caller with its own surface data should patch
/// `Segment::crr` (and `Segment::surface`) after the fact.
pub fn segments_from_gpx<P: AsRef<Path>>(path: P, default_crr: f64) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| {
        PacerError::Import(ImportError::FileNotFound {
            path: path.to_path_buf(),
        })
    })?;
    let reader = BufReader::new(file);
    let track_data = read(reader).map_err(|e| {
        PacerError::Import(ImportError::MalformedGpx {
            reason: e.to_string(),
        })
    })?;

    let mut points: Vec<(f64, f64, f64, f64)> = Vec::new(); // (lat, lon, ele, dist_from_start)
    let mut cumulative_dist = 0.0_f64;
    let mut prev: Option<(f64, f64, f64)> = None;

    for track in &track_data.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let geo_point = waypoint.point();
                let lon = geo_point.x();
                let lat = geo_point.y();
                let ele = waypoint.elevation.unwrap_or(0.0);

                if let Some((plat, plon, _)) = prev {
                    let d = haversine_distance_m(plat, plon, lat, lon);
                    if d < MIN_POINT_SPACING_M {
                        continue;
                    }
                    cumulative_dist += d;
                }
                points.push((lat, lon, ele, cumulative_dist));
                prev = Some((lat, lon, ele));
            }
        }
    }

    if points.len() < 2 {
        return Err(PacerError::DegenerateInput(
            "GPX track has fewer than two usable trackpoints".to_string(),
        ));
    }

    let mut segments = Vec::with_capacity(points.len() - 1);
    for i in 0..points.len() - 1 {
        let (lat1, lon1, ele1, dist1) = points[i];
        let (lat2, lon2, ele2, dist2) = points[i + 1];
        let length_m = dist2 - dist1;
        if length_m <= 0.0 {
            continue;
        }
        let grade = (ele2 - ele1) / length_m;
        let heading = initial_bearing_deg(lat1, lon1, lat2, lon2);

        let mut seg = Segment::new(segments.len(), length_m, grade, heading, default_crr);
        seg.start_ele_m = ele1;
        seg.end_ele_m = ele2;
        seg.start_coord = Some((lat1, lon1));
        seg.end_coord = Some((lat2, lon2));
        segments.push(seg);
    }

    if segments.is_empty() {
        return Err(PacerError::DegenerateInput(
            "GPX track produced zero usable segments".to_string(),
        ));
    }

    Ok(segments)
}

fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing from point 1 to point 2, in degrees, `[0, 360)`.
fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_file_not_found_error() {
        let err = segments_from_gpx("/nonexistent/path/course.gpx", 0.004);
        assert!(matches!(err, Err(PacerError::Import(ImportError::FileNotFound { .. }))));
    }

    #[test]
    fn haversine_distance_matches_known_value() {
        // Roughly 1 degree of latitude at the equator is ~111.19 km.
        let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 200.0, "haversine distance off: {d}");
    }

    #[test]
    fn bearing_due_north_is_zero() {
        let bearing = initial_bearing_deg(0.0, 0.0, 1.0, 0.0);
        assert!(bearing.abs() < 1e-6);
    }

    #[test]
    fn bearing_due_east_is_ninety() {
        let bearing = initial_bearing_deg(0.0, 0.0, 0.0, 1.0);
        assert!((bearing - 90.0).abs() < 1e-6);
    }
}
