//! Command-line interface definitions.
//!
//! Defines the CLI structure for bankpeer using `clap`: running the peer
//! analysis, inspecting stored results, loading statements and managing
//! configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "bankpeer.toml";

/// Peer-group analytics for bank financial statements
#[derive(Parser, Debug)]
#[command(name = "bankpeer")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute peer cohorts, averages and rankings for every institution
    Run(RunArgs),

    /// Show the stored peer analysis of one institution
    Show(ShowArgs),

    /// Load institutions and statements from a JSON file
    Import(ImportArgs),

    /// List tracked metrics and their ranking direction
    Metrics,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `bankpeer config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Arguments for `config init`.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the configuration file.
    #[arg(default_value = DEFAULT_CONFIG)]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the database path.
    #[arg(long)]
    pub database: Option<String>,

    /// Override the number of peers selected on each side.
    #[arg(short = 'n', long)]
    pub peer_count: Option<usize>,

    /// Override the number of concurrent workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Restrict the run to these institutions (repeatable).
    #[arg(long = "institution", value_name = "ID")]
    pub institutions: Vec<String>,

    /// Compute everything without writing results.
    #[arg(long)]
    pub dry_run: bool,

    /// Override the log level (e.g. debug, info, warn).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Arguments for the `show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Institution id.
    pub institution: String,

    /// Reporting period (YYYY-MM-DD). Defaults to the latest period.
    #[arg(short, long)]
    pub period: Option<String>,

    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Arguments for the `import` subcommand.
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// JSON file with `institutions` and `statements` arrays.
    pub file: PathBuf,

    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_institutions() {
        let cli = Cli::parse_from([
            "bankpeer",
            "run",
            "--institution",
            "a",
            "--institution",
            "b",
            "-n",
            "5",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.institutions, vec!["a", "b"]);
                assert_eq!(args.peer_count, Some(5));
                assert!(args.dry_run);
                assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["bankpeer", "metrics", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Metrics));
    }

    #[test]
    fn show_takes_optional_period() {
        let cli = Cli::parse_from(["bankpeer", "show", "bank-1", "--period", "2024-03-31"]);
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.institution, "bank-1");
                assert_eq!(args.period.as_deref(), Some("2024-03-31"));
            }
            other => panic!("expected show, got {other:?}"),
        }
    }
}
