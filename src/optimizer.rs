//! Outer pacing optimizer: finds the highest sustainable base power for a
//! course under a rider's physiology and a chosen pacing strategy.
//!
//! Grounded on `original_source/src/engines/v2.py`'s `find_optimal_pacing`
//! and `_get_dynamic_pdc_limit`.

use crate::integrator::{steady_state_flat_speed, SolverParams};
use crate::models::{EnvironmentVector, FailureKind, Segment, SimulationResult};
use crate::pacing::Strategy;
use crate::physics::PhysicsParams;
use crate::rider::RiderProfile;
use crate::simulator::Simulator;

pub const BASE_POWER_MIN_W: f64 = 10.0;
pub const BASE_POWER_MAX_W: f64 = 1500.0;
pub const OPTIMIZER_ITERS: u32 = 15;
/// Power cap passed to each simulation pass, as a multiple of the
/// bisection's current candidate base power.
pub const POWER_CAP_MULTIPLIER: f64 = 3.0;

/// Optimize base power for one course, returning the best feasible result
/// found, or the lowest-tried (infeasible) result if nothing was feasible.
pub struct Optimizer<'a> {
    pub rider: &'a RiderProfile,
    pub physics: &'a PhysicsParams,
    pub solver: SolverParams,
}

impl<'a> Optimizer<'a> {
    pub fn new(rider: &'a RiderProfile, physics: &'a PhysicsParams) -> Self {
        Optimizer {
            rider,
            physics,
            solver: SolverParams::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverParams) -> Self {
        self.solver = solver;
        self
    }

    /// Find the highest base power whose resulting pass neither bonks nor
    /// exceeds the rider's fatigue-adjusted power-duration envelope for the
    /// duration it produces.
    ///
    /// `strategy_for` builds the pacing strategy for a given adaptive
    /// reference speed (m/s); pass a closure that ignores its argument for
    /// grade-proportional strategies, since they have no speed reference.
    pub fn optimize(
        &self,
        segments: &[Segment],
        environment: &EnvironmentVector,
        strategy_for: impl Fn(f64) -> Strategy,
    ) -> SimulationResult {
        let total_mass = self.rider.mass_kg + self.physics.bike_mass_kg;
        let total_length_m: f64 = segments.iter().map(|s| s.length_m).sum();
        let avg_crr = if segments.is_empty() {
            self.physics.crr_default
        } else {
            segments.iter().map(|s| s.crr).sum::<f64>() / segments.len() as f64
        };

        let mut low = BASE_POWER_MIN_W;
        let mut high = BASE_POWER_MAX_W;
        let mut best: Option<SimulationResult> = None;

        for _ in 0..OPTIMIZER_ITERS {
            let mid = (low + high) / 2.0;

            let v_ref = steady_state_flat_speed(mid, total_mass, avg_crr, self.physics, &self.solver);
            let strategy = strategy_for(v_ref);

            let simulator = Simulator::new(self.rider, self.physics).with_solver(self.solver);
            let result = simulator.simulate(segments, &strategy, mid, mid * POWER_CAP_MULTIPLIER, environment);

            let simulated_intensity = if result.normalized_power_watts > 0.0 {
                result.normalized_power_watts
            } else {
                mid
            };
            let pdc_limit = self.dynamic_pdc_limit(result.total_time_sec);

            if !result.is_feasible || simulated_intensity > pdc_limit {
                high = mid;
            } else {
                low = mid;
                best = Some(result);
            }
        }

        if let Some(result) = best {
            return result;
        }

        // Nothing in the search range was feasible; report the lowest tried
        // power's outcome so the caller sees why (bonk vs. over-envelope).
        let v_ref = steady_state_flat_speed(low, total_mass, avg_crr, self.physics, &self.solver);
        let strategy = strategy_for(v_ref);
        let simulator = Simulator::new(self.rider, self.physics).with_solver(self.solver);
        let mut result = simulator.simulate(segments, &strategy, low, low * POWER_CAP_MULTIPLIER, environment);
        if result.is_feasible {
            let simulated_intensity = if result.normalized_power_watts > 0.0 {
                result.normalized_power_watts
            } else {
                low
            };
            if simulated_intensity > self.dynamic_pdc_limit(result.total_time_sec) {
                result.is_feasible = false;
                result.failure_kind = Some(FailureKind::OverEnvelope);
            }
        }
        result
    }

    /// Fatigue-adjusted power-duration limit for a given duration: the
    /// rider's stored PDC value, Riegel-extrapolated past the longest
    /// stored key using the rider's own exponent.
    fn dynamic_pdc_limit(&self, duration_sec: f64) -> f64 {
        self.rider.pdc_power(duration_sec)
    }
}
