//! JSON export of a [`SimulationResult`], grounded on
//! `trainrs::export::json::export_json`'s generic serde writer.

use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::models::SimulationResult;

/// Serialize any `Serialize` value to a pretty-printed JSON file. Used for
/// both `SimulationResult` and ad-hoc intermediate values.
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;
    Ok(())
}

/// Serialize a [`SimulationResult`] to JSON, field names matching the Rust
/// struct (camelCase is not applied; downstream consumers read
/// `total_time_sec` etc. directly per §6.4).
pub fn export_result<P: AsRef<Path>>(result: &SimulationResult, output_path: P) -> Result<(), ExportError> {
    export_json(result, output_path)
}
