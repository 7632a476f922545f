//! CSV export of a [`SimulationResult`]'s trace, in the canonical field
//! names of spec §6.5.
//!
//! Grounded on `trainrs::export::csv`'s per-row `writeln!` style, swapped
//! here for the `csv` crate's writer since the trace schema is flat and
//! fully numeric (no quoting edge cases to hand-roll).

use std::io::Write;
use std::path::Path;

use crate::error::ExportError;
use crate::models::SimulationResult;

/// Write the per-segment trace to a CSV file using the canonical column
/// names: `dist_km,ele,grade_pct,speed_kmh,power,time_sec,w_prime_bal`.
pub fn export_trace<P: AsRef<Path>>(result: &SimulationResult, output_path: P) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record([
        "dist_km",
        "ele",
        "grade_pct",
        "speed_kmh",
        "power",
        "time_sec",
        "w_prime_bal",
    ])?;
    for point in &result.trace {
        writer.write_record([
            point.dist_km.to_string(),
            point.ele_m.to_string(),
            point.grade_pct.to_string(),
            point.speed_kmh.to_string(),
            point.power_watts.to_string(),
            point.time_sec.to_string(),
            point.w_prime_bal_joules.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a one-row summary CSV alongside the trace, using the canonical
/// summary field names from spec §6.5.
pub fn export_summary<P: AsRef<Path>>(result: &SimulationResult, output_path: P) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(
        file,
        "total_time_sec,avg_speed_kmh,avg_power,normalized_power,work_kj,w_prime_min,is_success,fail_reason"
    )?;
    writeln!(
        file,
        "{},{},{},{},{},{},{},{}",
        result.total_time_sec,
        result.avg_speed_kmh,
        result.avg_power_watts,
        result.normalized_power_watts,
        result.work_kj,
        result.w_prime_min_joules,
        result.is_feasible,
        result
            .failure_kind
            .map_or(String::new(), |k| k.to_string()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, SimulationTracePoint};
    use tempfile::NamedTempFile;

    fn sample_result() -> SimulationResult {
        SimulationResult {
            total_time_sec: 120.0,
            avg_speed_kmh: 30.0,
            avg_power_watts: 200.0,
            normalized_power_watts: 210.0,
            work_kj: 24.0,
            w_prime_min_joules: 5_000.0,
            base_power_watts: 200.0,
            is_feasible: true,
            failure_kind: None,
            trace: vec![SimulationTracePoint {
                dist_km: 1.0,
                ele_m: 100.0,
                grade_pct: 2.0,
                speed_kmh: 30.0,
                power_watts: 200.0,
                time_sec: 120.0,
                w_prime_bal_joules: 15_000.0,
            }],
        }
    }

    #[test]
    fn trace_round_trips_header_and_row_count() {
        let result = sample_result();
        let file = NamedTempFile::new().unwrap();
        export_trace(&result, file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "dist_km,ele,grade_pct,speed_kmh,power,time_sec,w_prime_bal");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn summary_reports_feasibility_and_empty_failure_kind_when_successful() {
        let result = sample_result();
        let file = NamedTempFile::new().unwrap();
        export_summary(&result, file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("true"));

        let mut bonked = sample_result();
        bonked.is_feasible = false;
        bonked.failure_kind = Some(FailureKind::Bonk);
        let file2 = NamedTempFile::new().unwrap();
        export_summary(&bonked, file2.path()).unwrap();
        let content2 = std::fs::read_to_string(file2.path()).unwrap();
        assert!(content2.contains("BONK"));
    }
}
