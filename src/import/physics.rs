//! Physics and environment import: §6.3's
//! `{cda, crr, bike_weight_kg, drivetrain_loss, air_density,
//! drafting_factor}` plus `{wind_speed_mps, wind_dir_deg}` shapes.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ImportError, PacerError, Result};
use crate::models::EnvironmentVector;
use crate::physics::PhysicsParams;

/// Wire shape for bike/environment physics, matching spec §6.3's field
/// names (`crr`/`bike_weight_kg` rather than the core's
/// `crr_default`/`bike_mass_kg`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PhysicsInput {
    pub cda: f64,
    pub crr: f64,
    pub bike_weight_kg: f64,
    pub drivetrain_loss: f64,
    pub air_density: f64,
    pub drafting_factor: f64,
    #[serde(default)]
    pub wind_speed_mps: f64,
    #[serde(default)]
    pub wind_dir_deg: f64,
}

impl PhysicsInput {
    pub fn into_params(self) -> Result<PhysicsParams> {
        PhysicsParams::new(
            self.cda,
            self.crr,
            self.bike_weight_kg,
            self.drivetrain_loss,
            self.air_density,
            self.drafting_factor,
        )
        .map_err(PacerError::Import)
    }

    pub fn environment(&self) -> EnvironmentVector {
        EnvironmentVector {
            wind_speed_mps: self.wind_speed_mps.max(0.0),
            wind_dir_deg: self.wind_dir_deg.rem_euclid(360.0),
        }
    }
}

/// Load physics parameters and the environment vector from a JSON or TOML
/// file, selecting the parser by extension.
pub fn load_physics<P: AsRef<Path>>(path: P) -> Result<(PhysicsParams, EnvironmentVector)> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let input: PhysicsInput = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            PacerError::Import(ImportError::ParseError {
                format: "toml".to_string(),
                reason: e.to_string(),
            })
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            PacerError::Import(ImportError::ParseError {
                format: "json".to_string(),
                reason: e.to_string(),
            })
        })?,
    };
    let environment = input.environment();
    Ok((input.into_params()?, environment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_wire_shape_to_core_params() {
        let input = PhysicsInput {
            cda: 0.32,
            crr: 0.004,
            bike_weight_kg: 8.0,
            drivetrain_loss: 0.04,
            air_density: 1.225,
            drafting_factor: 0.0,
            wind_speed_mps: 4.0,
            wind_dir_deg: 370.0,
        };
        let env = input.environment();
        assert_eq!(env.wind_dir_deg, 10.0);
        let params = input.into_params().unwrap();
        assert_eq!(params.crr_default, 0.004);
        assert_eq!(params.bike_mass_kg, 8.0);
    }

    #[test]
    fn rejects_invalid_params_at_boundary() {
        let input = PhysicsInput {
            cda: -1.0,
            crr: 0.004,
            bike_weight_kg: 8.0,
            drivetrain_loss: 0.04,
            air_density: 1.225,
            drafting_factor: 0.0,
            wind_speed_mps: 0.0,
            wind_dir_deg: 0.0,
        };
        assert!(input.into_params().is_err());
    }
}
