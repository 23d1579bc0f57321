//! CLI output formatting.
//!
//! Text goes to stdout; everything here is a pure function of a
//! [`RunReport`] so it can be rendered into a string for tests.

use std::fmt::Write as _;

use super::report::{AntitheticReport, ConditionalReport, ControlReport, RunReport, StratifiedReport};

/// Version string including the git revision when known.
#[must_use]
pub fn version_string() -> String {
    match option_env!("EXPVAR_GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            format!("expvar {} ({hash})", env!("CARGO_PKG_VERSION"))
        }
        _ => format!("expvar {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Print help message.
pub fn print_help() {
    println!(
        r"expvar - Variance-reduced Monte Carlo estimators for the exponential distribution

USAGE:
    expvar [COMMAND] [OPTIONS]

COMMANDS:
    antithetic      Antithetic variates, convergence over sample sizes
    control         Control variate estimate of E[X]
    stratified      Stratified sampling estimate of E[X]
    conditional     Estimate P(XY <= t) with Y | X ~ Exp(1/X)
    all             Run all four estimators (default)
    help            Show this help message
    version         Show version information

OPTIONS:
    --seed <N>          Override the master seed (default: 42)
    --config <FILE>     Load parameters from a YAML file
    --out-dir <DIR>     Directory for chart files (default: .)
    --json              Print a JSON report instead of text
    -v, --verbose       Enable debug logging on stderr

EXAMPLES:
    expvar
    expvar stratified --seed 7
    expvar all --config experiment.yaml --out-dir charts --json
"
    );
}

/// Render the text report.
#[must_use]
pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Seed: {}   Rate: {}", report.seed, report.rate);

    if let Some(section) = &report.antithetic {
        format_antithetic(&mut out, section);
    }
    if let Some(section) = &report.control {
        format_control(&mut out, section);
    }
    if let Some(section) = &report.stratified {
        format_stratified(&mut out, section);
    }
    if let Some(section) = &report.conditional {
        format_conditional(&mut out, section);
    }

    if !report.charts.is_empty() {
        let _ = writeln!(out, "\nCharts:");
        for path in &report.charts {
            let _ = writeln!(out, "  {}", path.display());
        }
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "━".repeat(title.chars().count()));
}

fn format_antithetic(out: &mut String, section: &AntitheticReport) {
    heading(out, "Antithetic variates");
    for p in &section.points {
        let _ = writeln!(
            out,
            "Sample size: {}, Estimated expected value: {}",
            p.samples, p.estimate
        );
    }
    let _ = writeln!(out, "Theoretical expected value: {}", section.true_mean);
}

fn format_control(out: &mut String, section: &ControlReport) {
    heading(out, "Control variate");
    let _ = writeln!(out, "True expected value: {}", section.true_mean);
    let _ = writeln!(
        out,
        "Control variate estimate: {}",
        section.result.estimate
    );
    let _ = writeln!(
        out,
        "  mode {:?}, coefficient {:.4}, std error {:.6}",
        section.mode, section.coefficient, section.result.std_error
    );
}

fn format_stratified(out: &mut String, section: &StratifiedReport) {
    heading(out, "Stratified sampling");
    let _ = writeln!(out, "{}", section.result.estimate);
    let _ = writeln!(
        out,
        "  true mean {}, std error {:.6}",
        section.true_mean, section.result.std_error
    );
    for s in &section.strata {
        let upper = s
            .upper
            .map_or_else(|| "inf".to_string(), |u| u.to_string());
        let flag = if s.degenerate { "  (no draws)" } else { "" };
        let _ = writeln!(
            out,
            "  [{}, {upper}): P = {:.6}, n = {}, mean = {:.6}{flag}",
            s.lower, s.probability, s.sample_count, s.mean
        );
    }
}

fn format_conditional(out: &mut String, section: &ConditionalReport) {
    heading(out, "Conditional probability");
    let _ = writeln!(
        out,
        "Estimate of P(XY <= {}): {}",
        section.threshold, section.result.estimate
    );
}

/// Print the text report.
pub fn print_report(report: &RunReport) {
    print!("{}", format_report(report));
}
