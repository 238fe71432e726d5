// src/report/workbook.rs
// =============================================================================
// This module writes the report as one Excel workbook.
//
// Three sheets, same rows as the CSV files:
// - "All URL Results": every result, in input order
// - "Broken URLs": only INVALID / ERROR / REDIRECT_LOOP
// - "Valid URLs": description and URL of every VALID link
//
// HTTP codes and redirect codes are written as numbers so they sort and
// filter in a spreadsheet. Error messages stay text.
// =============================================================================

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use crate::checker::{ClassifiedResult, Report};

use super::files::RESULT_HEADERS;

pub const WORKBOOK_FILE: &str = "url_validation_report.xlsx";

pub const ALL_SHEET: &str = "All URL Results";
pub const BROKEN_SHEET: &str = "Broken URLs";
pub const VALID_SHEET: &str = "Valid URLs";

// Writes the workbook to `path`, replacing any existing file
pub fn write_workbook(path: &Path, report: &Report) -> Result<()> {
    let mut workbook = Workbook::new();

    let all = workbook.add_worksheet().set_name(ALL_SHEET)?;
    write_result_rows(all, report.results.iter())?;

    let broken = workbook.add_worksheet().set_name(BROKEN_SHEET)?;
    write_result_rows(broken, report.broken())?;

    let valid = workbook.add_worksheet().set_name(VALID_SHEET)?;
    valid.write_string(0, 0, "Description")?;
    valid.write_string(0, 1, "URL")?;
    for (row, result) in (1u32..).zip(report.valid()) {
        valid.write_string(row, 0, result.description.as_str())?;
        valid.write_string(row, 1, result.url.as_str())?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_result_rows<'a, I>(sheet: &mut Worksheet, results: I) -> Result<()>
where
    I: Iterator<Item = &'a ClassifiedResult>,
{
    for (col, header) in (0u16..).zip(RESULT_HEADERS) {
        sheet.write_string(0, col, header)?;
    }

    for (row, result) in (1u32..).zip(results) {
        sheet.write_string(row, 0, result.description.as_str())?;
        sheet.write_string(row, 1, result.url.as_str())?;
        sheet.write_string(row, 2, result.status.as_str())?;
        match result.http_code.as_number() {
            Some(code) => sheet.write_number(row, 3, code)?,
            None => sheet.write_string(row, 3, result.http_code.to_string())?,
        };
        sheet.write_string(row, 4, result.final_url.as_str())?;
        if let Some(code) = result.redirect_code {
            sheet.write_number(row, 5, code)?;
        }
    }

    Ok(())
}
