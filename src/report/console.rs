// src/report/console.rs
// =============================================================================
// Terminal output: one progress line per checked link, then a summary.
//
// Lines are built by small format_* functions and printed by the caller, so
// the exact text can be tested without capturing stdout.
// =============================================================================

use anyhow::Result;

use crate::checker::{Bucket, ClassifiedResult, Report, Status, Summary};

/// What the number in front of a progress line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressNumbering {
    /// 1 for the first record checked
    Position,
    /// The record's line in the records CSV. Line 1 is the header row.
    CsvLine,
}

impl ProgressNumbering {
    // `position` is 1-based, as handed out by check_records
    pub fn number(self, position: usize) -> usize {
        match self {
            ProgressNumbering::Position => position,
            ProgressNumbering::CsvLine => position + 1,
        }
    }
}

// One line per result, e.g.
//   [3] REDIRECT_TEMPORARY: https://example.com/old
pub fn format_progress(index: usize, result: &ClassifiedResult) -> String {
    if result.status == Status::Skipped {
        format!("[{}] {:<18}: (No URL)", index, result.status)
    } else {
        format!("[{}] {:<18}: {}", index, result.status, result.url)
    }
}

// The summary block. Counters that are zero are left out, except the total.
pub fn format_summary(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        "📊 URL Validation Summary:".to_string(),
        format!("  Total URLs     : {}", summary.total),
    ];

    let rows = [
        ("Valid URLs     ", Bucket::Valid),
        ("Redirected     ", Bucket::Redirected),
        ("Broken URLs    ", Bucket::Broken),
        ("Skipped        ", Bucket::Skipped),
        ("Invalid HTTP   ", Bucket::InvalidHttp),
        ("Redirected HTTP", Bucket::RedirectPermanentHttp),
    ];

    for (label, bucket) in rows {
        let count = summary.count(bucket);
        if count != 0 {
            lines.push(format!("  {}: {}   {:.2}%", label, count, summary.percent(count)));
        }
    }

    lines
}

pub fn print_summary(summary: &Summary) {
    println!();
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// Prints the whole report as pretty JSON on stdout
pub fn print_json(report: &Report) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    println!("{}", json_output);
    Ok(())
}
