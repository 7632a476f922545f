use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tabled::{Table, Tabled};

use cyclepacer::config::PacerConfig;
use cyclepacer::export::{csv as export_csv, json as export_json, ExportFormat};
use cyclepacer::import::{gpx, physics as physics_import, rider as rider_import};
use cyclepacer::logging::{init_logging, LogConfig, LogLevel};
use cyclepacer::pacing::Strategy;
use cyclepacer::{Optimizer, SimulationResult};

/// cyclepacer - physics-based pacing planner for cycling courses
#[derive(Parser)]
#[command(name = "cyclepacer")]
#[command(author = "cyclepacer contributors")]
#[command(version)]
#[command(about = "Compute a performance-optimal pacing plan for a course", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ~/.cyclepacer/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the optimal pacing plan for a course and write the result
    Plan {
        /// GPX course file
        #[arg(long)]
        course: PathBuf,

        /// Rider profile (JSON or TOML)
        #[arg(long)]
        rider: PathBuf,

        /// Physics and environment parameters (JSON or TOML)
        #[arg(long)]
        physics: PathBuf,

        /// Pacing strategy
        #[arg(long, default_value = "grade")]
        strategy: StrategyArg,

        /// Default rolling resistance coefficient for GPX-derived segments
        #[arg(long, default_value_t = 0.004)]
        crr: f64,

        /// Override wind speed from the physics file, m/s
        #[arg(long)]
        wind_speed: Option<f64>,

        /// Override wind direction from the physics file, degrees, meteorological
        #[arg(long)]
        wind_dir: Option<f64>,

        /// Output format
        #[arg(long, default_value = "table")]
        format: String,

        /// Write the result (trace + summary) to this path instead of stdout.
        /// Ignored for the `table` format, which always prints to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or initialize the on-disk configuration
    Config {
        /// Print the active configuration as TOML
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration to the default path
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum StrategyArg {
    Grade,
    Speed,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 if cli.quiet => LogLevel::Warn,
        0 => LogLevel::Info,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    let mut log_config = LogConfig::default();
    log_config.level = level;
    init_logging(&log_config).context("failed to initialize logging")?;

    match cli.command {
        Commands::Plan {
            course,
            rider,
            physics,
            strategy,
            crr,
            wind_speed,
            wind_dir,
            format,
            output,
        } => run_plan(course, rider, physics, strategy, crr, wind_speed, wind_dir, format, output, cli.quiet),
        Commands::Config { show, init } => run_config(cli.config, show, init),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_plan(
    course: PathBuf,
    rider_path: PathBuf,
    physics_path: PathBuf,
    strategy: StrategyArg,
    crr: f64,
    wind_speed_override: Option<f64>,
    wind_dir_override: Option<f64>,
    format: String,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!("{}", "Loading course, rider, and physics inputs...".green().bold());
    }

    let segments = gpx::segments_from_gpx(&course, crr)
        .with_context(|| format!("failed to load course from {}", course.display()))?;
    let rider = rider_import::load_rider_profile(&rider_path)
        .with_context(|| format!("failed to load rider profile from {}", rider_path.display()))?;
    let (physics_params, mut environment) = physics_import::load_physics(&physics_path)
        .with_context(|| format!("failed to load physics from {}", physics_path.display()))?;

    if let Some(speed) = wind_speed_override {
        environment.wind_speed_mps = speed.max(0.0);
    }
    if let Some(dir) = wind_dir_override {
        environment.wind_dir_deg = dir.rem_euclid(360.0);
    }

    if !quiet {
        println!(
            "  {} segments, {:.1} km total",
            segments.len(),
            segments.iter().map(|s| s.length_m).sum::<f64>() / 1000.0
        );
    }

    let optimizer = Optimizer::new(&rider, &physics_params);
    let result = match strategy {
        StrategyArg::Grade => optimizer.optimize(&segments, &environment, |_v_ref| {
            Strategy::grade_proportional_default()
        }),
        StrategyArg::Speed => optimizer.optimize(&segments, &environment, Strategy::speed_asymmetric_default),
    };

    report(&result, &format, output.as_deref(), quiet)
}

fn report(result: &SimulationResult, format: &str, output: Option<&std::path::Path>, quiet: bool) -> Result<()> {
    let export_format = ExportFormat::from_str_loose(format)?;

    match export_format {
        ExportFormat::Table => print_table(result, quiet),
        ExportFormat::Csv => {
            let out = output.ok_or_else(|| anyhow::anyhow!("--output is required for csv format"))?;
            export_csv::export_trace(result, out)?;
            let summary_path = out.with_extension("summary.csv");
            export_csv::export_summary(result, &summary_path)?;
            if !quiet {
                println!("Wrote trace to {}", out.display());
                println!("Wrote summary to {}", summary_path.display());
            }
        }
        ExportFormat::Json => {
            let out = output.ok_or_else(|| anyhow::anyhow!("--output is required for json format"))?;
            export_json::export_result(result, out)?;
            if !quiet {
                println!("Wrote result to {}", out.display());
            }
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_table(result: &SimulationResult, quiet: bool) -> Result<()> {
    if !quiet {
        if result.is_feasible {
            println!("{}", "Feasible pacing plan found".green().bold());
        } else {
            println!(
                "{}",
                format!(
                    "No feasible plan: {}",
                    result.failure_kind.map_or("unknown".to_string(), |k| k.to_string())
                )
                .red()
                .bold()
            );
        }
    }

    let rows = vec![
        SummaryRow {
            metric: "Base power".to_string(),
            value: format!("{:.0} W", result.base_power_watts),
        },
        SummaryRow {
            metric: "Total time".to_string(),
            value: format_duration(result.total_time_sec),
        },
        SummaryRow {
            metric: "Average speed".to_string(),
            value: format!("{:.1} km/h", result.avg_speed_kmh),
        },
        SummaryRow {
            metric: "Average power".to_string(),
            value: format!("{:.0} W", result.avg_power_watts),
        },
        SummaryRow {
            metric: "Normalized power".to_string(),
            value: format!("{:.0} W", result.normalized_power_watts),
        },
        SummaryRow {
            metric: "Work".to_string(),
            value: format!("{:.0} kJ", result.work_kj),
        },
        SummaryRow {
            metric: "Minimum W' balance".to_string(),
            value: format!("{:.0} J", result.w_prime_min_joules),
        },
    ];

    println!("{}", Table::new(rows));
    Ok(())
}

fn format_duration(total_sec: f64) -> String {
    let total_sec = total_sec.max(0.0) as u64;
    let hours = total_sec / 3600;
    let minutes = (total_sec % 3600) / 60;
    let seconds = total_sec % 60;
    format!("{hours}h {minutes:02}m {seconds:02}s")
}

fn run_config(config_path: Option<PathBuf>, show: bool, init: bool) -> Result<()> {
    let path = config_path.unwrap_or_else(PacerConfig::default_config_path);

    if init {
        let config = PacerConfig::default();
        config.save_to_file(&path)?;
        println!("{}", format!("Wrote default configuration to {}", path.display()).green());
        return Ok(());
    }

    if show {
        let config = PacerConfig::load_from_file(&path).unwrap_or_default();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    bail!("specify --show or --init");
}
