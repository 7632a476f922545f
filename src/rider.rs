//! Rider physiological model: critical power, anaerobic capacity (W'), and
//! the power-duration envelope used to bound feasible pacing.
//!
//! Grounded on `original_source/archive/streamlit_v1_backup/src/rider.py`
//! (`Rider.update_w_prime`, `Rider.get_pdc_power`), translated from the
//! two-regime Skiba depletion/recovery model into an owned Rust state
//! machine with an explicit `reset` between simulation passes.

use std::collections::BTreeMap;

use crate::error::ImportError;

/// Default Riegel fatigue exponent used when extrapolating beyond the
/// longest duration present in a rider's power-duration curve. Published
/// fits range from roughly 0.07 (elite, short-duration dominant) to 0.10
/// (long-endurance); this crate defaults to the more conservative 0.10 and
/// exposes it as configuration.
pub const DEFAULT_RIEGEL_EXPONENT: f64 = 0.10;

/// Immutable per-run rider physiology and power-duration envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderProfile {
    pub name: Option<String>,
    pub cp_watts: f64,
    pub w_prime_max_joules: f64,
    pub mass_kg: f64,
    /// Power-duration curve: duration in seconds -> sustainable watts.
    /// Keys are strictly positive; at least one entry is required.
    pdc: BTreeMap<u32, f64>,
    /// Fatigue exponent used for Riegel extrapolation beyond the longest
    /// stored PDC duration.
    pub riegel_exponent: f64,
}

impl RiderProfile {
    pub fn new(
        cp_watts: f64,
        w_prime_max_joules: f64,
        mass_kg: f64,
        pdc: BTreeMap<u32, f64>,
    ) -> Result<Self, ImportError> {
        if cp_watts <= 0.0 || w_prime_max_joules <= 0.0 || mass_kg <= 0.0 {
            return Err(ImportError::InvalidPhysicsParameter {
                parameter: "rider physiology".to_string(),
                value: format!("cp={cp_watts}, w_prime={w_prime_max_joules}, mass={mass_kg}"),
            });
        }
        if pdc.is_empty() {
            return Err(ImportError::EmptyPdc);
        }
        Ok(RiderProfile {
            name: None,
            cp_watts,
            w_prime_max_joules,
            mass_kg,
            pdc,
            riegel_exponent: DEFAULT_RIEGEL_EXPONENT,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_riegel_exponent(mut self, exponent: f64) -> Self {
        self.riegel_exponent = exponent;
        self
    }

    /// Sustainable power for a given duration.
    ///
    /// - At or below the shortest stored duration: the value at that key.
    /// - At or above the longest stored duration: Riegel extrapolation.
    /// - In between: linear interpolation between the bracketing keys.
    pub fn pdc_power(&self, duration_sec: f64) -> f64 {
        let min_key = *self.pdc.keys().next().expect("pdc is non-empty");
        let max_key = *self.pdc.keys().next_back().expect("pdc is non-empty");

        if duration_sec <= min_key as f64 {
            return self.pdc[&min_key];
        }
        if duration_sec >= max_key as f64 {
            let p_max = self.pdc[&max_key];
            return p_max * (duration_sec / max_key as f64).powf(-self.riegel_exponent);
        }

        let mut lower = (min_key, self.pdc[&min_key]);
        let mut upper = (max_key, self.pdc[&max_key]);
        for (&k, &v) in self.pdc.iter() {
            if (k as f64) <= duration_sec && k >= lower.0 {
                lower = (k, v);
            }
            if (k as f64) >= duration_sec && k <= upper.0 {
                upper = (k, v);
            }
        }
        if lower.0 == upper.0 {
            return lower.1;
        }
        let t1 = lower.0 as f64;
        let t2 = upper.0 as f64;
        lower.1 + (upper.1 - lower.1) * (duration_sec - t1) / (t2 - t1)
    }
}

/// Mutable anaerobic reserve tracked during one simulation pass.
///
/// Owned exclusively by the simulator for the duration of a pass; never
/// shared across concurrent simulations. Reset at the start of every pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiderState {
    /// Current anaerobic reserve in joules. May transiently go negative
    /// (bonk); intentionally not clamped at zero, so callers can measure how
    /// far a pacing plan overdraws the reserve rather than just that it did.
    pub w_prime_bal: f64,
}

impl RiderState {
    pub fn new(profile: &RiderProfile) -> Self {
        RiderState {
            w_prime_bal: profile.w_prime_max_joules,
        }
    }

    pub fn reset(&mut self, profile: &RiderProfile) {
        self.w_prime_bal = profile.w_prime_max_joules;
    }

    pub fn is_bonked(&self) -> bool {
        self.w_prime_bal < 0.0
    }

    /// Skiba-style two-regime W' update.
    ///
    /// `power > cp`: linear depletion, may drive the balance negative.
    /// `power < cp`: exponential recovery with time constant
    /// `τ = 546·exp(-0.01·(cp - power)) + 316`, strictly increasing toward
    /// `w_prime_max` and never overshooting it.
    /// `power == cp`: no change.
    pub fn update(&mut self, profile: &RiderProfile, power: f64, dt_sec: f64) {
        if power > profile.cp_watts {
            self.w_prime_bal -= (power - profile.cp_watts) * dt_sec;
        } else if power < profile.cp_watts {
            let deficit = profile.cp_watts - power;
            let tau = 546.0 * (-0.01 * deficit).exp() + 316.0;
            let depleted = profile.w_prime_max_joules - self.w_prime_bal;
            self.w_prime_bal =
                profile.w_prime_max_joules - depleted * (-dt_sec / tau).exp();
        }
    }
}
