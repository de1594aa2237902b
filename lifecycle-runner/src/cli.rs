//! CLI argument definitions for lifecycle-runner.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Service lifecycle suite runner.
///
/// Provisions an isolated tenancy (org, space, security group, quota),
/// grants the configured service plans, runs the lifecycle tests on N
/// parallel workers and tears the tenancy down again.
#[derive(Parser, Debug)]
#[command(name = "lifecycle-runner")]
#[command(version, about, long_about = None)]
pub struct RunnerCli {
    /// Path to lifecycle.toml runner configuration.
    ///
    /// Defaults and `LIFECYCLE_*` environment overrides apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the platform credentials JSON document.
    #[arg(long, env = "CONFIG_PATH")]
    pub platform_config: Option<PathBuf>,

    /// Path to the suite JSON document (plans, offering, space).
    #[arg(long, env = "CONFIG_PATH")]
    pub suite_config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full suite: setup once, workers in parallel, teardown once.
    Run {
        /// Number of parallel workers (overrides `[coordinator] workers`).
        #[arg(short, long)]
        workers: Option<usize>,

        /// Record platform calls instead of executing them.
        #[arg(long)]
        dry_run: bool,

        /// Test command each worker runs after setup.
        #[arg(last = true)]
        test_command: Vec<String>,
    },

    /// Provision the suite tenancy and grant plan access, then exit.
    Setup {
        /// Record platform calls instead of executing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Revoke plan access and delete the suite tenancy, then exit.
    Teardown {
        /// Record platform calls instead of executing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate all configuration and print the plan table.
    Validate,
}
