//! Application configuration: physics, pacing, and solver parameter groups,
//! loadable from a TOML file.
//!
//! Grounded on `trainrs`'s `AppConfig`/`load_from_file`/`default_config_path`
//! pattern, narrowed to this crate's three parameter groups.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::integrator::SolverParams;
use crate::pacing::{DEFAULT_ALPHA_CLIMB, DEFAULT_ALPHA_DESCENT, DEFAULT_G_COAST};
use crate::physics::PhysicsParams;
use crate::rider::DEFAULT_RIEGEL_EXPONENT;

/// Top-level configuration loaded from `~/.cyclepacer/config.toml` or an
/// explicit path passed on the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacerConfig {
    pub physics: PhysicsSettings,
    pub pacing: PacingSettings,
    pub solver: SolverSettings,
}

/// Bike and environment physics, in TOML-friendly plain fields (mirrors
/// [`PhysicsParams`] but without its constructor-time validation, so a
/// malformed file fails at load with a clear message instead of panicking
/// on a field access).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    pub cda: f64,
    pub crr_default: f64,
    pub bike_mass_kg: f64,
    pub drivetrain_loss: f64,
    pub air_density: f64,
    pub drafting_factor: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        let p = PhysicsParams::default();
        PhysicsSettings {
            cda: p.cda,
            crr_default: p.crr_default,
            bike_mass_kg: p.bike_mass_kg,
            drivetrain_loss: p.drivetrain_loss,
            air_density: p.air_density,
            drafting_factor: p.drafting_factor,
        }
    }
}

impl PhysicsSettings {
    pub fn to_params(self) -> Result<PhysicsParams> {
        PhysicsParams::new(
            self.cda,
            self.crr_default,
            self.bike_mass_kg,
            self.drivetrain_loss,
            self.air_density,
            self.drafting_factor,
        )
        .map_err(Into::into)
    }
}

/// Pacing strategy defaults and the Riegel exponent used to extrapolate a
/// rider's power-duration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingSettings {
    pub strategy: PacingStrategyKind,
    pub alpha_climb: f64,
    pub alpha_descent: f64,
    pub beta_slow: f64,
    pub beta_fast: f64,
    pub g_coast: f64,
    pub riegel_exponent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingStrategyKind {
    GradeProportional,
    SpeedAsymmetric,
}

impl Default for PacingSettings {
    fn default() -> Self {
        PacingSettings {
            strategy: PacingStrategyKind::GradeProportional,
            alpha_climb: DEFAULT_ALPHA_CLIMB,
            alpha_descent: DEFAULT_ALPHA_DESCENT,
            beta_slow: 0.6,
            beta_fast: 1.5,
            g_coast: DEFAULT_G_COAST,
            riegel_exponent: DEFAULT_RIEGEL_EXPONENT,
        }
    }
}

/// Bisection iteration counts and chunking for the integrator and optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    pub chunk_size_m: f64,
    pub bisection_iters: u32,
    pub walk_threshold_kmh: f64,
    pub walk_surrogate_power_w: f64,
    pub brake_threshold_kmh: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let s = SolverParams::default();
        SolverSettings {
            chunk_size_m: s.chunk_size_m,
            bisection_iters: s.bisection_iters,
            walk_threshold_kmh: s.walk_threshold_kmh,
            walk_surrogate_power_w: s.walk_surrogate_power_w,
            brake_threshold_kmh: s.brake_threshold_kmh,
        }
    }
}

impl SolverSettings {
    pub fn to_solver_params(self) -> SolverParams {
        let defaults = SolverParams::default();
        SolverParams {
            chunk_size_m: self.chunk_size_m,
            bisection_iters: self.bisection_iters,
            walk_threshold_kmh: self.walk_threshold_kmh,
            walk_surrogate_power_w: self.walk_surrogate_power_w,
            brake_threshold_kmh: self.brake_threshold_kmh,
            ..defaults
        }
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        PacerConfig {
            physics: PhysicsSettings::default(),
            pacing: PacingSettings::default(),
            solver: SolverSettings::default(),
        }
    }
}

impl PacerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.as_ref().display()))?;
        let config: PacerConfig =
            toml::from_str(&content).with_context(|| "failed to parse TOML configuration")?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
        }
        let toml_content =
            toml::to_string_pretty(self).with_context(|| "failed to serialize configuration to TOML")?;
        fs::write(&path, toml_content)
            .with_context(|| format!("failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cyclepacer")
            .join("config.toml")
    }

    /// Load from the default path, falling back to in-memory defaults when
    /// no file is present yet.
    pub fn load_or_default() -> Self {
        let path = Self::default_config_path();
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(_) => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = PacerConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PacerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn default_physics_settings_produce_valid_params() {
        let config = PacerConfig::default();
        assert!(config.physics.to_params().is_ok());
    }

    #[test]
    fn load_from_missing_path_falls_back_without_panicking() {
        let config = PacerConfig::load_or_default();
        assert_eq!(config.pacing.strategy, PacingStrategyKind::GradeProportional);
    }
}
