//! Pacing strategy: maps base power and local terrain to a target segment
//! power under a hard upper cap.
//!
//! Grounded on `original_source/src/engines/v2.py`'s
//! `_calculate_target_power_dynamic`, which supported several tuning modes
//! behind one function. Narrowed here to the two strategies that matter in
//! practice, represented as a tagged sum type matched by the simulator
//! rather than as trait objects or subclasses — there is no plugin surface
//! for third-party strategies, so the closed enum is the simpler fit.

use serde::{Deserialize, Serialize};

/// Named constants for the grade-proportional strategy's defaults.
pub const DEFAULT_ALPHA_CLIMB: f64 = 2.5;
pub const DEFAULT_ALPHA_DESCENT: f64 = 10.0;
pub const DEFAULT_G_COAST: f64 = -0.05;

/// Pacing strategy, selected by the caller and matched on by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    /// Scales base power by grade alone.
    GradeProportional {
        alpha_climb: f64,
        alpha_descent: f64,
        /// Grade below which the rider coasts (no pedaling).
        g_coast: f64,
    },
    /// Scales base power by how current speed compares to a steady-state
    /// reference speed, with asymmetric sensitivity for climbing vs.
    /// descending.
    SpeedAsymmetric {
        beta_slow: f64,
        beta_fast: f64,
        /// Steady-state flat speed at the current base power, in m/s.
        /// Recomputed once per outer optimizer iteration.
        v_ref_mps: f64,
        g_coast: f64,
    },
}

impl Strategy {
    pub fn grade_proportional_default() -> Self {
        Strategy::GradeProportional {
            alpha_climb: DEFAULT_ALPHA_CLIMB,
            alpha_descent: DEFAULT_ALPHA_DESCENT,
            g_coast: DEFAULT_G_COAST,
        }
    }

    pub fn speed_asymmetric_default(v_ref_mps: f64) -> Self {
        Strategy::SpeedAsymmetric {
            beta_slow: 0.6,
            beta_fast: 1.5,
            v_ref_mps,
            g_coast: DEFAULT_G_COAST,
        }
    }

    /// Replace the adaptive reference speed (speed-relative mode only).
    /// No-op for grade-proportional strategies.
    pub fn with_v_ref(self, v_ref_mps: f64) -> Self {
        match self {
            Strategy::SpeedAsymmetric {
                beta_slow,
                beta_fast,
                g_coast,
                ..
            } => Strategy::SpeedAsymmetric {
                beta_slow,
                beta_fast,
                v_ref_mps,
                g_coast,
            },
            other => other,
        }
    }

    /// Compute the segment target power.
    ///
    /// `current_speed_mps` is only consulted by `SpeedAsymmetric`; pass the
    /// entry speed of the segment (or chunk) being paced.
    pub fn target_power(&self, p_base: f64, grade: f64, p_cap: f64, current_speed_mps: f64) -> f64 {
        match *self {
            Strategy::GradeProportional {
                alpha_climb,
                alpha_descent,
                g_coast,
            } => {
                if grade >= 0.0 {
                    (p_base * (1.0 + alpha_climb * grade)).min(p_cap)
                } else if grade >= g_coast {
                    p_base * (1.0 + alpha_descent * grade).max(0.0)
                } else {
                    0.0
                }
            }
            Strategy::SpeedAsymmetric {
                beta_slow,
                beta_fast,
                v_ref_mps,
                g_coast,
            } => {
                if grade < g_coast {
                    return 0.0;
                }
                let ratio = 1.0 - current_speed_mps / v_ref_mps;
                let beta = if ratio > 0.0 { beta_slow } else { beta_fast };
                let factor = (1.0 + beta * ratio).max(0.1);
                (p_base * factor).min(p_cap)
            }
        }
    }
}
