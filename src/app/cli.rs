//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Behavior Gate - Two-trial behavioral verification from cursor and gaze capture
#[derive(Parser, Debug)]
#[command(name = "behavior-gate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a two-trial verification session with synthetic capture
    Verify {
        /// Trial duration in seconds (overrides config)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Actor seed for the first trial
        #[arg(long, default_value = "1")]
        first_seed: u64,

        /// Actor seed for the second trial (differ from the first to
        /// simulate an impostor)
        #[arg(long, default_value = "1")]
        second_seed: u64,

        /// Similarity mode (mse, cosine_motion_plus_mse_eye, motion_only_mse)
        #[arg(short, long)]
        mode: Option<String>,

        /// Write the session report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Label stored in the session report
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print a saved session report
    Inspect {
        /// Path to the report JSON
        report: PathBuf,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the session report directory
    pub fn reports_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".behavior_gate").join("reports"))
            .unwrap_or_else(|| PathBuf::from("reports"))
    }
}
