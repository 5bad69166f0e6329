//! Command-line argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::directory::DirectoryCommands;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::process::ProcessArgs;
use crate::cli::commands::report::ReportArgs;
use crate::cli::commands::routing::RoutingCommands;
use crate::cli::commands::watch::WatchArgs;

/// jobflow - turn quoted orders into shop jobs
#[derive(Parser, Debug)]
#[command(name = "jobflow", version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file (default: ./jobflow.yaml)
    #[arg(long, global = true, env = "JOBFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// More log output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pick a format for the command
    Auto,
    /// Bordered table
    Table,
    /// Tab-separated values
    Tsv,
    Csv,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a configuration template and create the database
    Init(InitArgs),

    /// Flatten order files into jobs and commit them
    Process(ProcessArgs),

    /// Poll a spool directory for new order files
    Watch(WatchArgs),

    /// Inspect operation routing
    #[command(subcommand)]
    Routing(RoutingCommands),

    /// Manage work centers, vendors and operation codes
    #[command(subcommand)]
    Directory(DirectoryCommands),

    /// Export reference data and jobs as CSV
    Report(ReportArgs),

    /// Check configuration and database connectivity
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
