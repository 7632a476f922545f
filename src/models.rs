//! Data model shared by the pacing core: course segments, environment, and
//! the results a simulation pass produces.

use serde::{Deserialize, Serialize};

/// Minimum and maximum grade a segment is clamped to at ingest.
pub const GRADE_CLAMP: f64 = 0.25;

/// A single atomic, immutable stretch of a course.
///
/// Segments form a contiguous ordered chain: `index` increases monotonically
/// and cumulative distance across the sequence strictly increases for any
/// segment with `length_m > 0`. Grade is clamped at construction so
/// downstream physics never sees an unrideable wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position of this segment in the ordered course sequence.
    pub index: usize,
    /// Length of the segment in meters. Must be > 0 to be consumed by the
    /// simulator; zero-length segments are rejected at the boundary.
    pub length_m: f64,
    /// Signed grade (rise over run), clamped to `[-0.25, 0.25]` at ingest.
    pub grade: f64,
    /// Compass heading of travel in degrees, `[0, 360)`.
    pub heading_deg: f64,
    pub start_ele_m: f64,
    pub end_ele_m: f64,
    /// Rolling resistance coefficient inherited from surface classification.
    pub crr: f64,
    /// Opaque endpoint coordinates, never read by the core.
    pub start_coord: Option<(f64, f64)>,
    pub end_coord: Option<(f64, f64)>,
    /// Opaque surface classification label, carried through from import.
    pub surface: Option<String>,
}

impl Segment {
    /// Construct a segment, clamping grade to `[-0.25, 0.25]`.
    pub fn new(index: usize, length_m: f64, grade: f64, heading_deg: f64, crr: f64) -> Self {
        let start_ele_m = 0.0;
        let end_ele_m = start_ele_m + grade.clamp(-GRADE_CLAMP, GRADE_CLAMP) * length_m;
        Segment {
            index,
            length_m,
            grade: grade.clamp(-GRADE_CLAMP, GRADE_CLAMP),
            heading_deg: heading_deg.rem_euclid(360.0),
            start_ele_m,
            end_ele_m,
            crr,
            start_coord: None,
            end_coord: None,
            surface: None,
        }
    }
}

/// Wind vector for a run, or per-segment if a collaborator supplies one per
/// segment. Direction is meteorological: the direction the wind blows *from*.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVector {
    pub wind_speed_mps: f64,
    pub wind_dir_deg: f64,
}

impl EnvironmentVector {
    pub fn calm() -> Self {
        EnvironmentVector {
            wind_speed_mps: 0.0,
            wind_dir_deg: 0.0,
        }
    }

    /// Headwind component along `heading_deg`, in m/s. Positive is a
    /// headwind, negative a tailwind.
    pub fn headwind_component(&self, heading_deg: f64) -> f64 {
        let rel = (self.wind_dir_deg - heading_deg).to_radians();
        self.wind_speed_mps * rel.cos()
    }
}

/// Exhaustive reasons a pacing plan can be reported infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Anaerobic reserve went negative partway through the course.
    Bonk,
    /// The simulation completed but normalized power exceeded the
    /// fatigue-adjusted power-duration limit for the resulting duration.
    OverEnvelope,
    /// Input failed validation before integration began.
    DegenerateInput,
    /// A bisection failed to converge within its iteration budget.
    Numeric,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Bonk => "BONK",
            FailureKind::OverEnvelope => "OVER_ENVELOPE",
            FailureKind::DegenerateInput => "DEGENERATE_INPUT",
            FailureKind::Numeric => "NUMERIC",
        };
        write!(f, "{s}")
    }
}

/// One row of the per-segment trace a simulation produces, in the canonical
/// field shape used by downstream visualizers and exporters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationTracePoint {
    pub dist_km: f64,
    pub ele_m: f64,
    pub grade_pct: f64,
    /// Segment-average speed in km/h.
    pub speed_kmh: f64,
    /// Actually-delivered mechanical power in watts.
    pub power_watts: f64,
    /// Cumulative elapsed time in seconds.
    pub time_sec: f64,
    pub w_prime_bal_joules: f64,
}

/// Output of one simulation pass over a course at a given base power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_time_sec: f64,
    pub avg_speed_kmh: f64,
    pub avg_power_watts: f64,
    pub normalized_power_watts: f64,
    pub work_kj: f64,
    pub w_prime_min_joules: f64,
    pub base_power_watts: f64,
    pub is_feasible: bool,
    pub failure_kind: Option<FailureKind>,
    pub trace: Vec<SimulationTracePoint>,
}

impl SimulationResult {
    /// An empty result stub used before any segment has been processed.
    pub fn empty(base_power_watts: f64) -> Self {
        SimulationResult {
            total_time_sec: 0.0,
            avg_speed_kmh: 0.0,
            avg_power_watts: 0.0,
            normalized_power_watts: 0.0,
            work_kj: 0.0,
            w_prime_min_joules: 0.0,
            base_power_watts,
            is_feasible: false,
            failure_kind: None,
            trace: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_clamps_grade() {
        let seg = Segment::new(0, 100.0, 0.5, 10.0, 0.004);
        assert_eq!(seg.grade, GRADE_CLAMP);
        let seg = Segment::new(1, 100.0, -0.9, 10.0, 0.004);
        assert_eq!(seg.grade, -GRADE_CLAMP);
    }

    #[test]
    fn heading_wraps_to_0_360() {
        let seg = Segment::new(0, 100.0, 0.0, 370.0, 0.004);
        assert_eq!(seg.heading_deg, 10.0);
    }

    #[test]
    fn headwind_component_sign() {
        // Wind blowing from the north (0 deg), heading due north (0 deg):
        // directly in the rider's face.
        let env = EnvironmentVector {
            wind_speed_mps: 5.0,
            wind_dir_deg: 0.0,
        };
        assert!((env.headwind_component(0.0) - 5.0).abs() < 1e-9);
        // Heading due south (180 deg): wind from behind, a tailwind.
        assert!((env.headwind_component(180.0) + 5.0).abs() < 1e-9);
    }
}
