//! Closed-loop PID simulation over star-tracker attitude errors.
//!
//! Loads RA/DEC/Roll errors from a CSV table, feeds them tick by tick to a
//! three-axis PID bank, integrates attitude under the resulting torques and
//! writes corrections, attitude and orbit phase to a CSV table.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use attitude_sim::config::{ConfigFile, SimConfig, IMAGE_CADENCE_DAYS};
use attitude_sim::control::AxisGains;
use attitude_sim::dynamics::state::StepResult;
use attitude_sim::io::{load_errors, stage_results_file, write_results_file};
use attitude_sim::sim::{self, group_scenarios, run_scenarios, Scenario};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run PID simulation on star-tracker errors",
    long_about = "Feeds per-image RA/DEC/Roll errors to three PID controllers and\n\
        propagates a STEREO-A-like spacecraft attitude and orbit phase under the\n\
        resulting torques. Writes one output row per input row."
)]
struct Args {
    /// CSV file containing RA_error, DEC_error and Roll_error columns
    #[arg(long)]
    input: Option<PathBuf>,

    /// CSV file to store the PID correction sequence
    #[arg(long)]
    output: Option<PathBuf>,

    /// YAML file with simulation options (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time step per record
    #[arg(long)]
    dt: Option<f64>,

    /// Proportional gain (all axes)
    #[arg(long)]
    kp: Option<f64>,

    /// Integral gain (all axes)
    #[arg(long)]
    ki: Option<f64>,

    /// Derivative gain (all axes)
    #[arg(long)]
    kd: Option<f64>,

    /// Anti-windup bound on the integral accumulator
    #[arg(long)]
    integral_clamp: Option<f64>,

    /// Advance the orbit by this many days per tick instead of dt
    #[arg(long, conflicts_with = "image_cadence")]
    orbit_step_days: Option<f64>,

    /// Advance the orbit at the 40-minute star-tracker image cadence
    #[arg(long)]
    image_cadence: bool,

    /// Run each (attack, level) as its own simulation, one output file each
    #[arg(long)]
    by_scenario: bool,
}

const DEFAULT_INPUT: &str = "attitude_errors_combined.csv";
const DEFAULT_OUTPUT: &str = "pid_corrections.csv";

fn build_config(args: &Args, file: &ConfigFile) -> SimConfig {
    let mut config = file.apply(SimConfig::default());
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    for axis in [&mut config.gains.ra, &mut config.gains.dec, &mut config.gains.roll] {
        if let Some(kp) = args.kp {
            axis.kp = kp;
        }
        if let Some(ki) = args.ki {
            axis.ki = ki;
        }
        if let Some(kd) = args.kd {
            axis.kd = kd;
        }
    }
    if let Some(clamp) = args.integral_clamp {
        config.integral_clamp = clamp;
    }
    if args.image_cadence {
        config.orbit_step_days = Some(IMAGE_CADENCE_DAYS);
    } else if args.orbit_step_days.is_some() {
        config.orbit_step_days = args.orbit_step_days;
    }
    config
}

/// `out/pid.csv` + `fgsm_2` -> `out/pid_fgsm_2.csv`
fn scenario_path(base: &Path, label: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("pid_corrections");
    let name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{label}.{ext}"),
        None => format!("{stem}_{label}"),
    };
    base.with_file_name(name)
}

/// Stage every scenario file before committing any, so a failure part way
/// leaves no new output behind.
fn write_scenarios(output: &Path, finished: &[(&Scenario, Vec<StepResult>)]) -> Result<()> {
    let mut paths = HashSet::new();
    let mut staged = Vec::with_capacity(finished.len());
    for (scenario, results) in finished {
        let path = scenario_path(output, scenario.label());
        if !paths.insert(path.clone()) {
            bail!("Scenario {} would overwrite {}", scenario.label(), path.display());
        }
        let file = stage_results_file(&path, results, &scenario.records)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        staged.push(file);
    }
    for file in staged {
        let path = file.path().to_path_buf();
        file.commit().with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn describe_gains(gains: &AxisGains) -> String {
    format!(
        "RA(kp={}, ki={}, kd={}) DEC(kp={}, ki={}, kd={}) Roll(kp={}, ki={}, kd={})",
        gains.ra.kp, gains.ra.ki, gains.ra.kd,
        gains.dec.kp, gains.dec.ki, gains.dec.kd,
        gains.roll.kp, gains.roll.ki, gains.roll.kd,
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ConfigFile::default(),
    };
    let input = args
        .input
        .clone()
        .or_else(|| file.input_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let output = args
        .output
        .clone()
        .or_else(|| file.output_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let config = build_config(&args, &file);
    config.validate().context("Invalid simulation configuration")?;
    info!(dt = config.dt, clamp = config.integral_clamp, gains = %describe_gains(&config.gains), "configuration");

    let records = load_errors(&input)
        .with_context(|| format!("Failed to load attitude errors from {}", input.display()))?;
    if records.is_empty() {
        warn!(path = %input.display(), "input table has no rows");
    }

    if args.by_scenario {
        let scenarios = group_scenarios(&records);
        let outcomes = run_scenarios(&scenarios, &config);
        // Validate every run before writing anything
        let mut finished = Vec::with_capacity(outcomes.len());
        for (scenario, outcome) in scenarios.iter().zip(outcomes) {
            let results = outcome
                .result
                .with_context(|| format!("Scenario {} failed", outcome.label))?;
            finished.push((scenario, results));
        }
        write_scenarios(&output, &finished)?;
        info!(scenarios = finished.len(), "all scenarios written");
    } else {
        let results = sim::run(&records, &config).context("Simulation aborted")?;
        write_results_file(&output, &results, &records)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    Ok(())
}
