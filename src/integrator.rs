//! Segment-level work-energy integrator: the hot loop of the pacing engine.
//!
//! Grounded on `original_source/src/engines/v2.py`'s
//! `_solve_segment_physics`: chunked bisection on exit speed against the
//! work-energy balance, with torque-limited propulsion, a downhill
//! soft-braking wall, and a minimum-speed "walking" clamp. Every tunable
//! constant here is a field of [`SolverParams`] rather than a free-standing
//! literal.

use crate::models::Segment;
use crate::pacing::Strategy;
use crate::physics::{PhysicsParams, G};

/// Tunable solver constants for the segment integrator and the bisection
/// searches elsewhere in the core (flat-speed solve, optimizer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    /// Target sub-chunk length in meters.
    pub chunk_size_m: f64,
    /// Bisection iterations per chunk; 15 converges to < 0.004 km/h.
    pub bisection_iters: u32,
    pub v_min_mps: f64,
    pub v_max_mps: f64,
    /// Speed below which the rider is considered to be walking, km/h.
    pub walk_threshold_kmh: f64,
    /// Metabolic surrogate power substituted while walking, watts.
    pub walk_surrogate_power_w: f64,
    /// Downhill soft-braking engagement speed, km/h.
    pub brake_threshold_kmh: f64,
    pub brake_coeff: f64,
    pub brake_exponent: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            chunk_size_m: 20.0,
            bisection_iters: 15,
            v_min_mps: 0.01,
            v_max_mps: 45.0,
            walk_threshold_kmh: 5.0,
            walk_surrogate_power_w: 30.0,
            brake_threshold_kmh: 50.0,
            brake_coeff: 0.22,
            brake_exponent: 1.2,
        }
    }
}

/// Result of integrating one segment forward from an entry speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationOutcome {
    pub v_out_mps: f64,
    pub dt_sec: f64,
    pub walking: bool,
    /// Time-weighted average delivered mechanical power across the
    /// segment's chunks, watts.
    pub p_delivered_watts: f64,
}

/// Integrate one segment: given a pacing strategy, base/cap power, entry
/// speed, headwind component, and the current torque limit, return the
/// exit speed, elapsed time, walking flag, and delivered power.
///
/// Takes the combined rider+bike mass explicitly, since [`PhysicsParams`]
/// only carries the bike's mass (the rider's mass lives on `RiderProfile`).
#[allow(clippy::too_many_arguments)]
pub fn integrate_segment(
    segment: &Segment,
    total_mass_kg: f64,
    strategy: &Strategy,
    p_base: f64,
    p_cap: f64,
    v_in_mps: f64,
    v_wind_mps: f64,
    f_limit: f64,
    physics: &PhysicsParams,
    solver: &SolverParams,
) -> IntegrationOutcome {
    let eff_cda = physics.effective_cda();
    let f_gravity = total_mass_kg * G * segment.grade;
    let f_roll = total_mass_kg * G * segment.crr;
    let walk_threshold_mps = solver.walk_threshold_kmh / 3.6;
    let brake_threshold_mps = solver.brake_threshold_kmh / 3.6;

    let num_chunks = ((segment.length_m / solver.chunk_size_m).ceil() as usize).max(1);
    let d_chunk = segment.length_m / num_chunks as f64;

    let mut v_current = v_in_mps;
    let mut total_time = 0.0_f64;
    let mut walking_any = false;
    let mut power_time_sum = 0.0_f64;

    for _ in 0..num_chunks {
        let mut low = solver.v_min_mps;
        let mut high = solver.v_max_mps;
        let mut p_final_chunk = p_base;
        let mut torque_bound = false;

        for _ in 0..solver.bisection_iters {
            let mid_v = (low + high) / 2.0;
            let v_avg = ((v_current + mid_v) / 2.0).max(0.1);

            let p_dynamic = strategy.target_power(p_base, segment.grade, p_cap, mid_v);
            let p_avail = p_dynamic * (1.0 - physics.drivetrain_loss);
            let f_required = p_avail / v_avg;
            let f_pedal = f_required.min(f_limit);

            let v_air = v_avg + v_wind_mps;
            let f_drag = 0.5 * physics.air_density * eff_cda * v_air * v_air.abs();

            let f_brake = if mid_v > brake_threshold_mps {
                let v_kmh = mid_v * 3.6;
                let a_brake = solver.brake_coeff
                    * (v_kmh - solver.brake_threshold_kmh).powf(solver.brake_exponent)
                    / 3.6;
                total_mass_kg * a_brake
            } else {
                0.0
            };

            let f_net = f_pedal - f_drag - f_gravity - f_roll - f_brake;
            let work_net = f_net * d_chunk;
            let ke_initial = 0.5 * total_mass_kg * v_current * v_current;
            let ke_final_target = 0.5 * total_mass_kg * mid_v * mid_v;

            if ke_initial + work_net > ke_final_target {
                low = mid_v;
                p_final_chunk = p_dynamic;
                torque_bound = f_required > f_limit;
            } else {
                high = mid_v;
            }
        }

        let converged_v = (low + high) / 2.0;
        let mut v_next = converged_v;
        let mut chunk_walking = false;
        if v_next < walk_threshold_mps {
            v_next = walk_threshold_mps;
            chunk_walking = true;
            walking_any = true;
        }

        let v_avg_chunk = ((v_current + v_next) / 2.0).max(0.1);
        let dt_chunk = d_chunk / v_avg_chunk;

        let p_delivered_chunk = if chunk_walking {
            solver.walk_surrogate_power_w
        } else if torque_bound {
            f_limit * v_avg_chunk / (1.0 - physics.drivetrain_loss)
        } else {
            p_final_chunk
        };

        total_time += dt_chunk;
        power_time_sum += p_delivered_chunk * dt_chunk;
        v_current = v_next;
    }

    let p_delivered_watts = if total_time > 0.0 {
        power_time_sum / total_time
    } else {
        0.0
    };

    IntegrationOutcome {
        v_out_mps: v_current,
        dt_sec: total_time,
        walking: walking_any,
        p_delivered_watts,
    }
}

/// Solve the steady-state flat speed sustainable at `power_watts` with no
/// wind. Used to seed and re-anchor the speed-asymmetric strategy's
/// reference speed. Bisects `v in [0, 55] m/s` against
/// `P·(1 - loss) = (0.5·ρ·A·v^2 + crr·m·g)·v`.
pub fn steady_state_flat_speed(
    power_watts: f64,
    total_mass_kg: f64,
    crr: f64,
    physics: &PhysicsParams,
    solver: &SolverParams,
) -> f64 {
    let eff_cda = physics.effective_cda();
    let p_avail = power_watts * (1.0 - physics.drivetrain_loss);
    let f_roll = total_mass_kg * G * crr;

    let mut low = 0.0_f64;
    let mut high = 55.0_f64;
    for _ in 0..solver.bisection_iters {
        let mid = ((low + high) / 2.0).max(0.1);
        let f_aero = 0.5 * physics.air_density * eff_cda * mid * mid;
        let p_required = (f_aero + f_roll) * mid;
        if p_required > p_avail {
            high = mid;
        } else {
            low = mid;
        }
    }
    (low + high) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::Strategy;

    fn flat_segment(length_m: f64, grade: f64) -> Segment {
        Segment::new(0, length_m, grade, 0.0, 0.003085)
    }

    #[test]
    fn flat_course_converges_to_steady_state_speed_and_time() {
        let physics = PhysicsParams::new(0.314288, 0.003085, 11.0, 0.0414, 1.2291, 0.0).unwrap();
        let solver = SolverParams::default();
        let strategy = Strategy::GradeProportional {
            alpha_climb: 0.0,
            alpha_descent: 10.0,
            g_coast: -0.05,
        };
        let segment = flat_segment(100_000.0, 0.0);
        let total_mass = 80.0 + physics.bike_mass_kg;

        let outcome = integrate_segment(
            &segment,
            total_mass,
            &strategy,
            200.0,
            200.0 * 3.0,
            0.1,
            0.0,
            f64::MAX,
            &physics,
            &solver,
        );

        let exit_kmh = outcome.v_out_mps * 3.6;
        assert!(exit_kmh > 30.0 && exit_kmh < 36.0, "exit speed {exit_kmh} km/h out of range");

        let hours = outcome.dt_sec / 3600.0;
        assert!(hours > 2.7 && hours < 3.1, "total time {hours}h out of range");
    }

    #[test]
    fn steep_climb_triggers_walking() {
        let physics = PhysicsParams::new(0.314288, 0.003085, 11.0, 0.0414, 1.2291, 0.0).unwrap();
        let solver = SolverParams::default();
        let strategy = Strategy::GradeProportional {
            alpha_climb: 0.0,
            alpha_descent: 10.0,
            g_coast: -0.05,
        };
        let segment = flat_segment(10_000.0, 0.08);
        let total_mass = 80.0 + physics.bike_mass_kg;

        let outcome = integrate_segment(
            &segment,
            total_mass,
            &strategy,
            200.0,
            200.0 * 3.0,
            0.1,
            0.0,
            f64::MAX,
            &physics,
            &solver,
        );

        assert!(outcome.walking);
        assert!((outcome.p_delivered_watts - 30.0).abs() < 1e-6);
        let avg_kmh = (segment.length_m / 1000.0) / (outcome.dt_sec / 3600.0);
        assert!(avg_kmh > 4.0 && avg_kmh < 14.0, "avg speed {avg_kmh} km/h out of expected walking range");
    }

    #[test]
    fn downhill_soft_wall_limits_terminal_speed() {
        let physics = PhysicsParams::new(0.30, 0.004, 11.0, 0.0, 1.225, 0.0).unwrap();
        let solver = SolverParams::default();
        let strategy = Strategy::GradeProportional {
            alpha_climb: 0.0,
            alpha_descent: 10.0,
            g_coast: -0.05,
        };
        let segment = flat_segment(1_000.0, -0.10);
        let total_mass = 90.0;

        let outcome = integrate_segment(
            &segment,
            total_mass,
            &strategy,
            0.0,
            0.0,
            0.1,
            0.0,
            f64::MAX,
            &physics,
            &solver,
        );

        let exit_kmh = outcome.v_out_mps * 3.6;
        assert!(exit_kmh < 82.0, "brake failed to cap speed: {exit_kmh} km/h");
    }

    #[test]
    fn tailwind_exceeding_ground_speed_pushes_rather_than_drags() {
        let physics = PhysicsParams::default();
        let solver = SolverParams::default();
        let strategy = Strategy::grade_proportional_default();
        let segment = flat_segment(500.0, 0.0);

        // Strong tailwind: v_wind negative and large in magnitude relative
        // to ground speed, so the signed drag term should go negative (a
        // push) rather than exploding in the retarding direction.
        let outcome = integrate_segment(
            &segment,
            88.0,
            &strategy,
            150.0,
            450.0,
            2.0,
            -20.0,
            f64::MAX,
            &physics,
            &solver,
        );

        assert!(outcome.v_out_mps > 2.0);
    }

    #[test]
    fn single_chunk_for_short_segment() {
        let physics = PhysicsParams::default();
        let solver = SolverParams::default();
        let strategy = Strategy::grade_proportional_default();
        let segment = flat_segment(5.0, 0.0);
        let outcome = integrate_segment(
            &segment, 88.0, &strategy, 150.0, 450.0, 1.0, 0.0, f64::MAX, &physics, &solver,
        );
        assert!(outcome.dt_sec > 0.0);
    }

    #[test]
    fn steady_state_flat_speed_is_higher_for_more_power() {
        let physics = PhysicsParams::default();
        let solver = SolverParams::default();
        let v_low = steady_state_flat_speed(100.0, 88.0, 0.004, &physics, &solver);
        let v_high = steady_state_flat_speed(300.0, 88.0, 0.004, &physics, &solver);
        assert!(v_high > v_low);
    }
}
