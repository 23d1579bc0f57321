//! CLI argument parsing.
//!
//! Hand-rolled parser over any iterator of strings so that every branch is
//! reachable from unit tests.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Which estimators a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Antithetic variates convergence ladder.
    Antithetic,
    /// Control variate.
    Control,
    /// Stratified sampling.
    Stratified,
    /// Conditional probability `P(XY ≤ t)`.
    Conditional,
    /// All four, in the order above.
    All,
}

impl Target {
    /// Command name on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Antithetic => "antithetic",
            Self::Control => "control",
            Self::Stratified => "stratified",
            Self::Conditional => "conditional",
            Self::All => "all",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "antithetic" => Some(Self::Antithetic),
            "control" => Some(Self::Control),
            "stratified" => Some(Self::Stratified),
            "conditional" => Some(Self::Conditional),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Whether this target includes `other`.
    #[must_use]
    pub fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

/// Options shared by every estimator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Estimators to run.
    pub target: Target,
    /// Seed override.
    pub seed: Option<u64>,
    /// YAML configuration file.
    pub config_path: Option<PathBuf>,
    /// Chart directory override.
    pub out_dir: Option<PathBuf>,
    /// Print a JSON report instead of text.
    pub json: bool,
    /// Enable debug logging.
    pub verbose: bool,
}

impl RunOptions {
    /// Default options for `target`.
    #[must_use]
    pub const fn new(target: Target) -> Self {
        Self {
            target,
            seed: None,
            config_path: None,
            out_dir: None,
            json: false,
            verbose: false,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one or all estimators.
    Run(RunOptions),
    /// Show help
    Help,
    /// Show version
    Version,
    /// Arguments could not be parsed.
    Invalid {
        /// What was wrong.
        message: String,
    },
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Whether debug logging was requested.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        matches!(&self.command, Command::Run(opts) if opts.verbose)
    }

    fn parse_from_vec(args: &[String]) -> Self {
        let Some(first) = args.get(1) else {
            return Self {
                command: Command::Run(RunOptions::new(Target::All)),
            };
        };

        let command = match first.as_str() {
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            flag if flag.starts_with('-') => Self::parse_run_command(Target::All, &args[1..]),
            name => match Target::from_name(name) {
                Some(target) => Self::parse_run_command(target, &args[2..]),
                None => Command::Invalid {
                    message: format!("unknown command: {name}"),
                },
            },
        };

        Self { command }
    }

    fn parse_run_command(target: Target, rest: &[String]) -> Command {
        let mut opts = RunOptions::new(target);

        let mut i = 0;
        while i < rest.len() {
            let flag = rest[i].as_str();
            match flag {
                "--seed" | "--config" | "--out-dir" => {
                    let Some(value) = rest.get(i + 1) else {
                        return Command::Invalid {
                            message: format!("{flag} requires a value"),
                        };
                    };
                    match flag {
                        "--seed" => match value.parse() {
                            Ok(seed) => opts.seed = Some(seed),
                            Err(_) => {
                                return Command::Invalid {
                                    message: format!("invalid seed: {value}"),
                                }
                            }
                        },
                        "--config" => opts.config_path = Some(PathBuf::from(value)),
                        _ => opts.out_dir = Some(PathBuf::from(value)),
                    }
                    i += 2;
                }
                "--json" => {
                    opts.json = true;
                    i += 1;
                }
                "-v" | "--verbose" => {
                    opts.verbose = true;
                    i += 1;
                }
                "-h" | "--help" => return Command::Help,
                other => {
                    return Command::Invalid {
                        message: format!("unexpected argument: {other}"),
                    }
                }
            }
        }

        Command::Run(opts)
    }
}
