// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, to stderr)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = broken links, 2 = error)
//
// Rust concepts used:
// - async/await: Because probes run concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker;       // src/checker/ - probing, classification, counting
mod cli;           // src/cli.rs - command-line parsing
mod report;        // src/report/ - console output and report files
mod source;        // src/source/ - HTML table and records CSV

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use checker::{InputRecord, ReqwestTransport};
use cli::{Cli, Commands, OutputArgs, ProbeArgs};
use report::ProgressNumbering;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for progress lines and --json
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = fatal error (bad input file, unwritable report, ...)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { html_file, csv, keep_header } => {
            handle_extract(&html_file, &csv, !keep_header)
        }
        Commands::Check { csv_file, output, probe } => {
            let records = source::read_records_csv(&csv_file)?;
            info!(file = %csv_file.display(), records = records.len(), "loaded records");
            check_and_report(&records, &output, &probe, ProgressNumbering::CsvLine).await
        }
        Commands::Run { html_file, csv, keep_header, output, probe } => {
            let records = load_table(&html_file, !keep_header)?;
            // Number progress lines by CSV line whenever there is a CSV to look at
            let numbering = match csv {
                Some(csv) => {
                    source::write_records_csv(&csv, &records)?;
                    info!(file = %csv.display(), "records saved");
                    ProgressNumbering::CsvLine
                }
                None => ProgressNumbering::Position,
            };
            check_and_report(&records, &output, &probe, numbering).await
        }
    }
}

// Handles the 'extract' subcommand
fn handle_extract(html_file: &Path, csv: &Path, skip_header: bool) -> Result<i32> {
    let records = load_table(html_file, skip_header)?;
    source::write_records_csv(csv, &records)?;
    println!("📄 Wrote {} record(s) to {}", records.len(), csv.display());
    Ok(0)
}

fn load_table(html_file: &Path, skip_header: bool) -> Result<Vec<InputRecord>> {
    let html = fs::read_to_string(html_file)
        .with_context(|| format!("Failed to read {}", html_file.display()))?;
    let records = source::extract_table_records(&html, skip_header)
        .with_context(|| format!("Failed to read the link table in {}", html_file.display()))?;

    if records.is_empty() {
        warn!(file = %html_file.display(), "link table has no usable rows");
    }
    Ok(records)
}

// Probes every record, prints the results and writes the report
async fn check_and_report(
    records: &[InputRecord],
    output: &OutputArgs,
    probe: &ProbeArgs,
    numbering: ProgressNumbering,
) -> Result<i32> {
    let settings = probe.settings();
    let transport = ReqwestTransport::new(&settings);
    let quiet = output.json;

    if !quiet {
        println!("🌐 Checking {} link(s)...\n", records.len());
    }

    let checked = checker::check_records(
        records,
        &transport,
        &settings,
        probe.concurrency as usize,
        |index, result| {
            if !quiet {
                println!("{}", report::format_progress(numbering.number(index), result));
            }
        },
    )
    .await;

    report::write_report(&output.output, &checked)?;

    if quiet {
        report::print_json(&checked)?;
    } else {
        report::print_summary(&checked.summary);
        println!("\n✅ Report written to: {}", output.output.display());
    }

    if checked.summary.has_broken() {
        Ok(1)  // Exit code 1 = broken links found
    } else {
        Ok(0)
    }
}
