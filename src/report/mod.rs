// src/report/mod.rs
// =============================================================================
// This module is where results leave the program.
//
// Submodules:
// - console: Progress lines, the summary block and --json output
// - files: The CSV tables and summary.json written to the report directory
// - workbook: The same tables as sheets of one .xlsx file
// =============================================================================

mod console;
mod files;
mod workbook;

pub use console::{format_progress, print_json, print_summary, ProgressNumbering};
pub use files::write_report;
