// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - #[command(flatten)]: Reuse one group of flags in several subcommands
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::checker::ProbeSettings;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "link-triage",
    version,
    about = "Extract links from an HTML table and check which ones still work",
    long_about = "link-triage reads the links out of the first table of an HTML page, sends a HEAD \
                  request to each one and sorts them into valid, broken, redirected and skipped. \
                  The results are written as CSV tables plus a JSON summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the link table from an HTML file into a CSV file
    ///
    /// Example: link-triage extract element.html --csv urls.csv
    Extract {
        /// HTML file containing the link table
        html_file: PathBuf,

        /// Where to write the records
        #[arg(long, default_value = "urls.csv")]
        csv: PathBuf,

        /// Treat the first table row as data instead of a header
        #[arg(long)]
        keep_header: bool,
    },

    /// Check every URL listed in a records CSV file
    ///
    /// Example: link-triage check urls.csv --output url_validation_report
    Check {
        /// CSV file with description,url,category columns
        csv_file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// Extract the link table from an HTML file and check every URL
    ///
    /// Example: link-triage run element.html
    Run {
        /// HTML file containing the link table
        html_file: PathBuf,

        /// Also save the extracted records to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Treat the first table row as data instead of a header
        #[arg(long)]
        keep_header: bool,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        probe: ProbeArgs,
    },
}

/// Where and how results are reported
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Directory for the report files
    #[arg(long, short, default_value = "url_validation_report")]
    pub output: PathBuf,

    /// Print the full report as JSON instead of progress lines
    #[arg(long)]
    pub json: bool,
}

/// How each URL is probed
#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Report redirects as the raw 3xx instead of following them
    #[arg(long, env = "LINK_TRIAGE_NO_REDIRECTS")]
    pub no_redirects: bool,

    /// Extra attempts after a network error
    #[arg(long, env = "LINK_TRIAGE_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, env = "LINK_TRIAGE_RETRY_DELAY_MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, env = "LINK_TRIAGE_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// How many URLs to probe at the same time (1 = one after another)
    #[arg(long, env = "LINK_TRIAGE_CONCURRENCY", default_value_t = 8,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: u32,
}

impl ProbeArgs {
    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            allow_redirects: !self.no_redirects,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            ..ProbeSettings::default()
        }
    }
}
