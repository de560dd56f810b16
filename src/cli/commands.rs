use std::path::PathBuf;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{config::DEFAULT_CONFIG_PATH, utils::parse_date_arg};

#[derive(Parser)]
#[command(name = "claim-resubmit")]
#[command(about = "Find denied insurance claims worth resubmitting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Input overrides shared by commands that run the pipeline
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Alpha CSV export
    #[arg(long)]
    pub alpha: Option<PathBuf>,

    /// Beta JSON feed
    #[arg(long)]
    pub beta: Option<PathBuf>,

    /// Reference date for claim age (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,

    /// Skip records that cannot be normalized instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline, save results and print the summary
    Run {
        #[command(flatten)]
        sources: SourceArgs,

        /// Directory for result files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the summary without writing result files
        #[arg(long)]
        no_save: bool,
    },

    /// Run the pipeline and show a report without saving anything
    Scan {
        #[command(flatten)]
        sources: SourceArgs,

        /// List every candidate and rejected claim
        #[arg(short, long)]
        detailed: bool,
    },

    /// Classify a single claim
    Check {
        /// Claim status, e.g. denied
        #[arg(long)]
        status: String,

        /// Patient identifier
        #[arg(long)]
        patient_id: Option<String>,

        /// Payer denial reason
        #[arg(long)]
        denial_reason: Option<String>,

        /// Submission date (YYYY-MM-DD)
        #[arg(long)]
        submitted_at: String,

        /// Reference date for claim age (defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        as_of: Option<NaiveDate>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
