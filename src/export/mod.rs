//! Export boundary: writers for [`crate::models::SimulationResult`] in the
//! persisted trace schema of spec §6.5, for downstream visualizers and
//! reports.
//!
//! Grounded on `trainrs::export`'s split into per-format submodules behind
//! a thin shared `ExportFormat` enum.

pub mod csv;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Export format selector used by the CLI's `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Table,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_str_loose(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ExportFormat::Table),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::Serialization(format!(
                "unsupported export format: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats_case_insensitively() {
        assert_eq!(ExportFormat::from_str_loose("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_str_loose("json").unwrap(), ExportFormat::Json);
        assert!(ExportFormat::from_str_loose("xml").is_err());
    }
}
