//! Rider profile import: §6.2's `{cp, w_prime_max, weight_kg, pdc}` shape.
//!
//! Grounded on `original_source/archive/streamlit_v1_backup/src/rider.py`'s
//! `Rider.__post_init__`, which normalizes PDC keys to `int` on load; this
//! module does the same from JSON/TOML string keys into the core's
//! `BTreeMap<u32, f64>`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ImportError, PacerError, Result};
use crate::rider::RiderProfile;

/// Wire shape for a rider profile, matching spec §6.2's field names.
#[derive(Debug, Clone, Deserialize)]
pub struct RiderProfileInput {
    pub name: Option<String>,
    pub cp: f64,
    pub w_prime_max: f64,
    pub weight_kg: f64,
    /// Power-duration curve with string keys (JSON object keys are always
    /// strings); parsed as positive integer seconds here.
    pub pdc: BTreeMap<String, f64>,
    pub riegel_exponent: Option<f64>,
}

impl RiderProfileInput {
    /// Normalize into the core's [`RiderProfile`], parsing and validating
    /// every PDC key as a strictly positive integer duration in seconds.
    pub fn into_profile(self) -> Result<RiderProfile> {
        if self.pdc.is_empty() {
            return Err(PacerError::Import(ImportError::EmptyPdc));
        }

        let mut pdc = BTreeMap::new();
        for (key, watts) in self.pdc {
            let seconds: u32 = key.parse().map_err(|_| {
                PacerError::Import(ImportError::MissingRiderField {
                    field: format!("pdc key '{key}' is not a positive integer"),
                })
            })?;
            if seconds == 0 {
                return Err(PacerError::Import(ImportError::MissingRiderField {
                    field: format!("pdc key '{key}' must be strictly positive"),
                }));
            }
            pdc.insert(seconds, watts);
        }

        let mut profile = RiderProfile::new(self.cp, self.w_prime_max, self.weight_kg, pdc)
            .map_err(PacerError::Import)?;
        if let Some(name) = self.name {
            profile = profile.with_name(name);
        }
        if let Some(exponent) = self.riegel_exponent {
            profile = profile.with_riegel_exponent(exponent);
        }
        Ok(profile)
    }
}

/// Load and normalize a rider profile from a JSON or TOML file, selecting
/// the parser by extension.
pub fn load_rider_profile<P: AsRef<Path>>(path: P) -> Result<RiderProfile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let input: RiderProfileInput = match path.extension().and_then(|e| e.to_str()) {
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
    input.into_profile()
}
