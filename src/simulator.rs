//! Full-course simulator: walks an ordered chain of segments, applying
//! cornering limits, wind projection, and torque-limit fatigue decay around
//! the per-segment [`integrate_segment`] call, and aggregates the result.
//!
//! Grounded on `original_source/src/engines/v2.py`'s `simulate_course`.

use crate::integrator::{integrate_segment, SolverParams};
use crate::models::{
    EnvironmentVector, FailureKind, Segment, SimulationResult, SimulationTracePoint,
};
use crate::pacing::Strategy;
use crate::physics::{PhysicsParams, G};
use crate::rider::{RiderProfile, RiderState};

/// Lateral friction coefficient used to derive the cornering speed limit.
pub const CORNERING_MU: f64 = 0.8;
/// Heading change below which a segment boundary isn't treated as a corner.
pub const CORNERING_MIN_TURN_DEG: f64 = 1.0;
pub const CORNERING_MIN_CURVATURE: f64 = 0.0001;
/// Initial torque-limiting force, expressed as a multiple of rider weight.
pub const INITIAL_FORCE_LIMIT_G: f64 = 1.5;
/// Elapsed time after which the torque limit begins decaying.
pub const FORCE_DECAY_ONSET_SEC: f64 = 3600.0;
pub const FORCE_DECAY_EXPONENT: f64 = 0.05;
/// Starting speed at the top of a course, m/s (near-zero, not exactly zero
/// so the first chunk's average speed is well defined).
pub const START_SPEED_MPS: f64 = 0.1;

/// Simulates one full pass over a course at a fixed base power and pacing
/// strategy. Consumes its own [`RiderState`] from a clean reset each call,
/// so repeated calls (as the outer optimizer bisects on base power) never
/// leak state between passes.
pub struct Simulator<'a> {
    pub rider: &'a RiderProfile,
    pub physics: &'a PhysicsParams,
    pub solver: SolverParams,
}

impl<'a> Simulator<'a> {
    pub fn new(rider: &'a RiderProfile, physics: &'a PhysicsParams) -> Self {
        Simulator {
            rider,
            physics,
            solver: SolverParams::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverParams) -> Self {
        self.solver = solver;
        self
    }

    /// Run one simulation pass. Returns a `SimulationResult` that is always
    /// populated with partial aggregates up to the point of failure, even
    /// when a bonk forces early termination.
    pub fn simulate(
        &self,
        segments: &[Segment],
        strategy: &Strategy,
        p_base: f64,
        p_cap: f64,
        environment: &EnvironmentVector,
    ) -> SimulationResult {
        if segments.is_empty() {
            let mut result = SimulationResult::empty(p_base);
            result.failure_kind = Some(FailureKind::DegenerateInput);
            return result;
        }

        let total_mass = self.rider.mass_kg + self.physics.bike_mass_kg;
        let mut state = RiderState::new(self.rider);

        let mut v_current = START_SPEED_MPS;
        let mut total_time = 0.0_f64;
        let mut total_work_j = 0.0_f64;
        let mut weighted_power_sum = 0.0_f64;
        let mut min_w_prime = self.rider.w_prime_max_joules;
        let mut trace = Vec::with_capacity(segments.len());
        let mut cumulative_dist_m = 0.0_f64;
        let mut prev_heading = segments[0].heading_deg;
        let f_max_initial = self.rider.mass_kg * G * INITIAL_FORCE_LIMIT_G;

        for segment in segments {
            let mut heading_change = (segment.heading_deg - prev_heading).abs();
            if heading_change > 180.0 {
                heading_change = 360.0 - heading_change;
            }
            if segment.length_m > 0.0 && heading_change > CORNERING_MIN_TURN_DEG {
                let theta_rad = heading_change.to_radians();
                let curvature = theta_rad / segment.length_m;
                if curvature > CORNERING_MIN_CURVATURE {
                    let radius = 1.0 / curvature;
                    let v_corner_limit = (CORNERING_MU * G * radius).sqrt();
                    v_current = v_current.min(v_corner_limit);
                }
            }
            prev_heading = segment.heading_deg;

            let v_headwind = environment.headwind_component(segment.heading_deg);

            let decay_factor = if total_time > FORCE_DECAY_ONSET_SEC {
                (FORCE_DECAY_ONSET_SEC / total_time).powf(FORCE_DECAY_EXPONENT)
            } else {
                1.0
            };
            let f_limit = f_max_initial * decay_factor;

            let outcome = integrate_segment(
                segment,
                total_mass,
                strategy,
                p_base,
                p_cap,
                v_current,
                v_headwind,
                f_limit,
                self.physics,
                &self.solver,
            );

            let p_actual = if outcome.walking {
                self.solver.walk_surrogate_power_w
            } else {
                outcome.p_delivered_watts
            };

            state.update(self.rider, p_actual, outcome.dt_sec);

            if state.is_bonked() {
                let mut result = Self::finalize(
                    total_time,
                    total_work_j,
                    weighted_power_sum,
                    cumulative_dist_m,
                    p_base,
                    min_w_prime,
                    trace,
                );
                result.is_feasible = false;
                result.failure_kind = Some(FailureKind::Bonk);
                return result;
            }

            total_time += outcome.dt_sec;
            total_work_j += p_actual * outcome.dt_sec;
            weighted_power_sum += p_actual.powi(4) * outcome.dt_sec;
            min_w_prime = min_w_prime.min(state.w_prime_bal);
            cumulative_dist_m += segment.length_m;

            trace.push(SimulationTracePoint {
                dist_km: cumulative_dist_m / 1000.0,
                ele_m: segment.end_ele_m,
                grade_pct: segment.grade * 100.0,
                speed_kmh: (outcome.v_out_mps + v_current) / 2.0 * 3.6,
                power_watts: p_actual,
                time_sec: total_time,
                w_prime_bal_joules: state.w_prime_bal,
            });

            v_current = outcome.v_out_mps;
        }

        let mut result = Self::finalize(
            total_time,
            total_work_j,
            weighted_power_sum,
            cumulative_dist_m,
            p_base,
            min_w_prime,
            trace,
        );
        result.is_feasible = true;
        result
    }

    fn finalize(
        total_time: f64,
        total_work_j: f64,
        weighted_power_sum: f64,
        total_dist_m: f64,
        p_base: f64,
        min_w_prime: f64,
        trace: Vec<SimulationTracePoint>,
    ) -> SimulationResult {
        let avg_power = if total_time > 0.0 {
            total_work_j / total_time
        } else {
            0.0
        };
        let normalized_power = if total_time > 0.0 {
            (weighted_power_sum / total_time).powf(0.25)
        } else {
            0.0
        };
        let avg_speed_kmh = if total_time > 0.0 {
            (total_dist_m / 1000.0) * 3600.0 / total_time
        } else {
            0.0
        };

        SimulationResult {
            total_time_sec: total_time,
            avg_speed_kmh,
            avg_power_watts: avg_power,
            normalized_power_watts: normalized_power,
            work_kj: total_work_j / 1000.0,
            w_prime_min_joules: min_w_prime,
            base_power_watts: p_base,
            is_feasible: false,
            failure_kind: None,
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn flat_rider() -> RiderProfile {
        let mut pdc = BTreeMap::new();
        pdc.insert(60, 450.0);
        pdc.insert(300, 320.0);
        pdc.insert(1200, 280.0);
        pdc.insert(3600, 250.0);
        RiderProfile::new(250.0, 20_000.0, 75.0, pdc).unwrap()
    }

    fn flat_course(n: usize, length_each_m: f64) -> Vec<Segment> {
        (0..n)
            .map(|i| Segment::new(i, length_each_m, 0.0, 0.0, 0.004))
            .collect()
    }

    #[test]
    fn empty_course_is_degenerate() {
        let rider = flat_rider();
        let physics = PhysicsParams::default();
        let sim = Simulator::new(&rider, &physics);
        let result = sim.simulate(
            &[],
            &Strategy::grade_proportional_default(),
            200.0,
            600.0,
            &EnvironmentVector::calm(),
        );
        assert_eq!(result.failure_kind, Some(FailureKind::DegenerateInput));
    }

    #[test]
    fn moderate_power_on_flat_course_completes_without_bonking() {
        let rider = flat_rider();
        let physics = PhysicsParams::default();
        let sim = Simulator::new(&rider, &physics);
        let segments = flat_course(50, 200.0);
        let result = sim.simulate(
            &segments,
            &Strategy::grade_proportional_default(),
            200.0,
            600.0,
            &EnvironmentVector::calm(),
        );
        assert!(result.is_feasible);
        assert!(result.failure_kind.is_none());
        assert_eq!(result.trace.len(), segments.len());
        assert!(result.total_time_sec > 0.0);
        assert!(result.normalized_power_watts >= result.avg_power_watts);
    }

    #[test]
    fn excessive_power_bonks_and_still_returns_partial_aggregates() {
        let rider = flat_rider();
        let physics = PhysicsParams::default();
        let sim = Simulator::new(&rider, &physics);
        let segments = flat_course(400, 200.0);
        let result = sim.simulate(
            &segments,
            &Strategy::grade_proportional_default(),
            600.0,
            1800.0,
            &EnvironmentVector::calm(),
        );
        assert!(!result.is_feasible);
        assert_eq!(result.failure_kind, Some(FailureKind::Bonk));
        assert!(result.total_time_sec > 0.0);
        assert!(result.trace.len() < segments.len());
    }

    #[test]
    fn sharp_turn_clamps_entry_speed_of_next_segment() {
        let rider = flat_rider();
        let physics = PhysicsParams::default();
        let sim = Simulator::new(&rider, &physics);
        // A near-180-degree hairpin after a long fast segment should clamp
        // speed hard at the corner.
        let segments = vec![
            Segment::new(0, 2000.0, 0.0, 0.0, 0.004),
            Segment::new(1, 20.0, 0.0, 170.0, 0.004),
            Segment::new(2, 200.0, 0.0, 170.0, 0.004),
        ];
        let result = sim.simulate(
            &segments,
            &Strategy::grade_proportional_default(),
            300.0,
            900.0,
            &EnvironmentVector::calm(),
        );
        assert!(result.total_time_sec > 0.0);
    }
}
