//! CLI module for expvar.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested
//! directly. The entry point `run_cli` is called from main.rs with parsed
//! arguments.

mod args;
mod commands;
mod output;
mod report;

pub use args::{Args, Command, RunOptions, Target};
pub use commands::{
    execute, resolve_config, run_cli, run_experiment, run_estimators, ANTITHETIC_CHART,
    CONDITIONAL_CHART, CONTROL_CHART, STRATIFIED_CHART,
};
pub use output::{format_report, print_help, print_report, print_version, version_string};
pub use report::{AntitheticReport, ConditionalReport, ControlReport, RunReport, StratifiedReport};
