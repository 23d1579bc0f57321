//! CLI command handlers.
//!
//! Each estimator draws from its own partition of the master seed, so a
//! single-estimator command prints the same numbers as the same estimator
//! inside `all`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{debug, info};

use super::args::{Args, Command, RunOptions, Target};
use super::output::{print_help, print_report, print_version};
use super::report::{AntitheticReport, ConditionalReport, ControlReport, RunReport, StratifiedReport};
use crate::config::ExperimentConfig;
use crate::domains::antithetic::AntitheticEstimator;
use crate::domains::conditional::ConditionalEstimator;
use crate::domains::control::ControlVariateEstimator;
use crate::domains::exponential::Exponential;
use crate::domains::stratified::StratifiedEstimator;
use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};
use crate::visualization::{
    antithetic_chart, conditional_chart, control_chart, stratified_chart, Chart,
};

/// Chart written by the antithetic estimator.
pub const ANTITHETIC_CHART: &str = "antithetic_convergence.svg";
/// Chart written by the control-variate estimator.
pub const CONTROL_CHART: &str = "control_histogram.svg";
/// Chart written by the stratified estimator.
pub const STRATIFIED_CHART: &str = "stratified_histogram.svg";
/// Chart written by the conditional estimator.
pub const CONDITIONAL_CHART: &str = "conditional_product.svg";

const ANTITHETIC_STREAM: usize = 0;
const CONTROL_STREAM: usize = 1;
const STRATIFIED_STREAM: usize = 2;
const CONDITIONAL_STREAM: usize = 3;

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run(opts) => run_estimators(&opts),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
        Command::Invalid { message } => {
            eprintln!("Error: {message}\n");
            print_help();
            ExitCode::from(1)
        }
    }
}

/// Run the requested estimators and print the report.
#[must_use]
pub fn run_estimators(opts: &RunOptions) -> ExitCode {
    match execute(opts) {
        Ok(report) => {
            if opts.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Merge the config file (if any) with command-line overrides.
///
/// # Errors
///
/// Returns configuration loading or validation errors.
pub fn resolve_config(opts: &RunOptions) -> SimResult<ExperimentConfig> {
    let mut config = match &opts.config_path {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }
    if let Some(dir) = &opts.out_dir {
        config.output.dir.clone_from(dir);
    }
    config.check()?;
    Ok(config)
}

/// Run the estimators selected by `opts`, writing one chart each.
///
/// # Errors
///
/// Stops at the first parameter, sampling or I/O error.
pub fn execute(opts: &RunOptions) -> SimResult<RunReport> {
    let config = resolve_config(opts)?;
    run_experiment(&config, opts.target)
}

/// Run `target` against an explicit configuration.
///
/// # Errors
///
/// Stops at the first parameter, sampling or I/O error.
pub fn run_experiment(config: &ExperimentConfig, target: Target) -> SimResult<RunReport> {
    info!(seed = config.seed, rate = config.rate, estimators = target.name(), "starting run");
    std::fs::create_dir_all(&config.output.dir)?;

    let mut master = SimRng::new(config.seed);
    let mut streams = master.partition(4);
    let mut report = RunReport::new(config.seed, config.rate);

    if target.includes(Target::Antithetic) {
        run_antithetic(config, stream(&mut streams, ANTITHETIC_STREAM)?, &mut report)?;
    }
    if target.includes(Target::Control) {
        run_control(config, stream(&mut streams, CONTROL_STREAM)?, &mut report)?;
    }
    if target.includes(Target::Stratified) {
        run_stratified(config, stream(&mut streams, STRATIFIED_STREAM)?, &mut report)?;
    }
    if target.includes(Target::Conditional) {
        run_conditional(config, stream(&mut streams, CONDITIONAL_STREAM)?, &mut report)?;
    }

    Ok(report)
}

fn stream(streams: &mut [SimRng], index: usize) -> SimResult<&mut SimRng> {
    streams
        .get_mut(index)
        .ok_or_else(|| SimError::monte_carlo(format!("missing RNG stream {index}")))
}

fn save_chart(chart: &Chart, dir: &Path, name: &str, report: &mut RunReport) -> SimResult<()> {
    let path: PathBuf = dir.join(name);
    chart.save(&path)?;
    report.charts.push(path);
    Ok(())
}

fn run_antithetic(
    config: &ExperimentConfig,
    rng: &mut SimRng,
    report: &mut RunReport,
) -> SimResult<()> {
    let estimator = AntitheticEstimator::new(config.rate, &config.antithetic.sample_sizes)?;
    let points = estimator.run(rng)?;
    let chart = antithetic_chart(&points, estimator.distribution());
    save_chart(&chart, &config.output.dir, ANTITHETIC_CHART, report)?;

    report.antithetic = Some(AntitheticReport {
        true_mean: estimator.distribution().mean(),
        points,
    });
    Ok(())
}

fn run_control(
    config: &ExperimentConfig,
    rng: &mut SimRng,
    report: &mut RunReport,
) -> SimResult<()> {
    let section = &config.control;
    let estimator = ControlVariateEstimator::new(
        section.sample_count,
        config.rate,
        section.control_rate_factor,
        section.mode,
    )?;
    let run = estimator.run(rng)?;
    save_chart(&control_chart(&run), &config.output.dir, CONTROL_CHART, report)?;

    report.control = Some(ControlReport::from(&run));
    Ok(())
}

fn run_stratified(
    config: &ExperimentConfig,
    rng: &mut SimRng,
    report: &mut RunReport,
) -> SimResult<()> {
    let section = &config.stratified;
    let estimator = StratifiedEstimator::new(section.sample_count, config.rate, &section.boundaries)?
        .with_parallel(section.parallel_strata);
    let run = estimator.run(rng)?;
    let dist: &Exponential = estimator.plan().distribution();
    debug!(strata = run.samples.len(), "stratified samples drawn");
    save_chart(&stratified_chart(&run, dist), &config.output.dir, STRATIFIED_CHART, report)?;

    report.stratified = Some(StratifiedReport::new(&run, dist.mean()));
    Ok(())
}

fn run_conditional(
    config: &ExperimentConfig,
    rng: &mut SimRng,
    report: &mut RunReport,
) -> SimResult<()> {
    let section = &config.conditional;
    let estimator = ConditionalEstimator::new(section.sample_count, section.rate_x, section.threshold)?;
    let run = estimator.run(rng);
    save_chart(&conditional_chart(&run), &config.output.dir, CONDITIONAL_CHART, report)?;

    report.conditional = Some(ConditionalReport::from(&run));
    Ok(())
}
