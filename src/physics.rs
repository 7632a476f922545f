//! Bicycle and environment physics parameters.
//!
//! Grounded on `original_source/src/engines/v2.py`'s `PhysicsParams`
//! dataclass; collapsed here into the single struct the integrator and
//! simulator borrow, so every tunable constant lives on a params struct
//! instead of scattered as module-level literals.

use crate::error::ImportError;

/// Standard gravitational acceleration, m/s^2.
pub const G: f64 = 9.81;

/// Immutable per-run physical parameters of the bike and environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Drag coefficient times frontal area, m^2.
    pub cda: f64,
    /// Default rolling resistance coefficient (segments may override via
    /// their own `crr` field, inherited from surface classification).
    pub crr_default: f64,
    pub bike_mass_kg: f64,
    /// Fraction of pedaled power lost to the drivetrain, in `[0, 1)`.
    pub drivetrain_loss: f64,
    /// Air density, kg/m^3.
    pub air_density: f64,
    /// Fractional reduction in effective CdA from drafting, in `[0, 0.5]`.
    pub drafting_factor: f64,
}

impl PhysicsParams {
    pub fn new(
        cda: f64,
        crr_default: f64,
        bike_mass_kg: f64,
        drivetrain_loss: f64,
        air_density: f64,
        drafting_factor: f64,
    ) -> Result<Self, ImportError> {
        if cda <= 0.0 {
            return Err(ImportError::InvalidPhysicsParameter {
                parameter: "cda".to_string(),
                value: cda.to_string(),
            });
        }
        if bike_mass_kg <= 0.0 {
            return Err(ImportError::InvalidPhysicsParameter {
                parameter: "bike_mass_kg".to_string(),
                value: bike_mass_kg.to_string(),
            });
        }
        if !(0.0..1.0).contains(&drivetrain_loss) {
            return Err(ImportError::InvalidPhysicsParameter {
                parameter: "drivetrain_loss".to_string(),
                value: drivetrain_loss.to_string(),
            });
        }
        if !(0.0..=0.5).contains(&drafting_factor) {
            return Err(ImportError::InvalidPhysicsParameter {
                parameter: "drafting_factor".to_string(),
                value: drafting_factor.to_string(),
            });
        }
        if air_density <= 0.0 || crr_default < 0.0 {
            return Err(ImportError::InvalidPhysicsParameter {
                parameter: "air_density/crr_default".to_string(),
                value: format!("{air_density}/{crr_default}"),
            });
        }
        Ok(PhysicsParams {
            cda,
            crr_default,
            bike_mass_kg,
            drivetrain_loss,
            air_density,
            drafting_factor,
        })
    }

    /// Effective frontal drag area after drafting reduction.
    pub fn effective_cda(&self) -> f64 {
        self.cda * (1.0 - self.drafting_factor)
    }
}

impl Default for PhysicsParams {
    /// A reasonable road-bike default: CdA 0.32 m^2, Crr 0.004, 8 kg bike,
    /// 4% drivetrain loss, sea-level air density, no drafting.
    fn default() -> Self {
        PhysicsParams {
            cda: 0.32,
            crr_default: 0.004,
            bike_mass_kg: 8.0,
            drivetrain_loss: 0.04,
            air_density: 1.225,
            drafting_factor: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let p = PhysicsParams::default();
        assert!(p.cda > 0.0);
        assert!(p.effective_cda() <= p.cda);
    }

    #[test]
    fn rejects_out_of_range_drivetrain_loss() {
        assert!(PhysicsParams::new(0.3, 0.004, 8.0, 1.0, 1.225, 0.0).is_err());
        assert!(PhysicsParams::new(0.3, 0.004, 8.0, -0.1, 1.225, 0.0).is_err());
    }

    #[test]
    fn rejects_out_of_range_drafting_factor() {
        assert!(PhysicsParams::new(0.3, 0.004, 8.0, 0.04, 1.225, 0.6).is_err());
    }

    #[test]
    fn drafting_reduces_effective_cda() {
        let p = PhysicsParams::new(0.3, 0.004, 8.0, 0.04, 1.225, 0.2).unwrap();
        assert!((p.effective_cda() - 0.24).abs() < 1e-9);
    }
}
