// src/report/files.rs
// =============================================================================
// This module writes the report to disk.
//
// One directory, five files:
// - url_validation_report.xlsx: the three views below as workbook sheets
// - all_url_results.csv: every result, in input order
// - broken_urls.csv: only INVALID / ERROR / REDIRECT_LOOP
// - valid_urls.csv: description and URL of every VALID link
// - summary.json: the counters plus percentages
//
// Any failure here is fatal for the run: the caller gets the error.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::checker::{ClassifiedResult, Report, Summary};

use super::workbook::{write_workbook, WORKBOOK_FILE};

pub const ALL_RESULTS_FILE: &str = "all_url_results.csv";
pub const BROKEN_FILE: &str = "broken_urls.csv";
pub const VALID_FILE: &str = "valid_urls.csv";
pub const SUMMARY_FILE: &str = "summary.json";

pub(super) const RESULT_HEADERS: [&str; 6] = [
    "Description",
    "URL",
    "Status",
    "HTTP Status",
    "Final URL",
    "Redirect Type",
];

// summary.json layout: counts, then the matching percentages
#[derive(Debug, Serialize)]
struct SummaryFile<'a> {
    #[serde(flatten)]
    counts: &'a Summary,
    percentages: Percentages,
}

#[derive(Debug, Serialize)]
struct Percentages {
    valid: f64,
    broken: f64,
    skipped: f64,
    redirected: f64,
    invalid_http: f64,
    redirect_permanent_http: f64,
}

impl<'a> From<&'a Summary> for SummaryFile<'a> {
    fn from(summary: &'a Summary) -> Self {
        SummaryFile {
            counts: summary,
            percentages: Percentages {
                valid: summary.percent(summary.valid),
                broken: summary.percent(summary.broken),
                skipped: summary.percent(summary.skipped),
                redirected: summary.percent(summary.redirected),
                invalid_http: summary.percent(summary.invalid_http),
                redirect_permanent_http: summary.percent(summary.redirect_permanent_http),
            },
        }
    }
}

// Writes the whole report into `dir`, creating it if needed
//
// Returns the paths written, workbook first
pub fn write_report(dir: &Path, report: &Report) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let workbook_path = dir.join(WORKBOOK_FILE);
    write_workbook(&workbook_path, report)?;

    let all_path = dir.join(ALL_RESULTS_FILE);
    write_results(&all_path, report.results.iter())?;

    let broken_path = dir.join(BROKEN_FILE);
    write_results(&broken_path, report.broken())?;

    let valid_path = dir.join(VALID_FILE);
    write_valid(&valid_path, report.valid())?;

    let summary_path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&SummaryFile::from(&report.summary))?;
    fs::write(&summary_path, json)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    info!(dir = %dir.display(), results = report.results.len(), "report written");

    Ok(vec![workbook_path, all_path, broken_path, valid_path, summary_path])
}

fn write_results<'a, I>(path: &Path, results: I) -> Result<()>
where
    I: Iterator<Item = &'a ClassifiedResult>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(RESULT_HEADERS)?;
    for result in results {
        let redirect = result
            .redirect_code
            .map(|code| code.to_string())
            .unwrap_or_default();
        writer.write_record([
            result.description.as_str(),
            result.url.as_str(),
            result.status.as_str(),
            result.http_code.to_string().as_str(),
            result.final_url.as_str(),
            redirect.as_str(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_valid<'a, I>(path: &Path, results: I) -> Result<()>
where
    I: Iterator<Item = &'a ClassifiedResult>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["Description", "URL"])?;
    for result in results {
        writer.write_record([result.description.as_str(), result.url.as_str()])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{HttpCode, Status};

    fn result(description: &str, url: &str, status: Status, code: HttpCode, redirect: Option<u16>) -> ClassifiedResult {
        ClassifiedResult {
            description: description.to_string(),
            url: url.to_string(),
            status,
            http_code: code,
            final_url: url.to_string(),
            redirect_code: redirect,
        }
    }

    fn sample_report() -> Report {
        let results = vec![
            result("Ok", "https://ok.example.com", Status::Valid, HttpCode::Status(200), None),
            result("Gone", "https://gone.example.com", Status::Invalid, HttpCode::Status(404), None),
            result("Moved", "https://moved.example.com", Status::RedirectOther, HttpCode::Status(200), Some(307)),
            result("Blank", "", Status::Skipped, HttpCode::Message("Missing URL".to_string()), None),
        ];
        let summary = Summary::from_results(&results);
        Report { results, summary }
    }

    #[test]
    fn test_writes_workbook_and_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report");

        let paths = write_report(&out, &sample_report()).unwrap();

        assert_eq!(paths.len(), 5);
        assert_eq!(paths[0], out.join("url_validation_report.xlsx"));
        assert!(fs::read(&paths[0]).unwrap().starts_with(b"PK"));
        for path in &paths {
            assert!(path.exists(), "{} missing", path.display());
        }

        let all = fs::read_to_string(out.join(ALL_RESULTS_FILE)).unwrap();
        let lines: Vec<&str> = all.lines().collect();
        assert_eq!(lines[0], "Description,URL,Status,HTTP Status,Final URL,Redirect Type");
        assert_eq!(lines[1], "Ok,https://ok.example.com,VALID,200,https://ok.example.com,");
        assert_eq!(lines[3], "Moved,https://moved.example.com,REDIRECT_OTHER,200,https://moved.example.com,307");
        assert_eq!(lines[4], "Blank,,SKIPPED,Missing URL,,");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_filtered_views() {
        let dir = tempfile::tempdir().unwrap();
        write_report(dir.path(), &sample_report()).unwrap();

        let broken = fs::read_to_string(dir.path().join(BROKEN_FILE)).unwrap();
        assert_eq!(
            broken.lines().collect::<Vec<_>>(),
            vec![
                "Description,URL,Status,HTTP Status,Final URL,Redirect Type",
                "Gone,https://gone.example.com,INVALID,404,https://gone.example.com,",
            ]
        );

        let valid = fs::read_to_string(dir.path().join(VALID_FILE)).unwrap();
        assert_eq!(
            valid.lines().collect::<Vec<_>>(),
            vec!["Description,URL", "Ok,https://ok.example.com"]
        );
    }

    #[test]
    fn test_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        write_report(dir.path(), &sample_report()).unwrap();

        let text = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["total"], 4);
        assert_eq!(json["valid"], 1);
        assert_eq!(json["broken"], 1);
        assert_eq!(json["redirected"], 1);
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["percentages"]["valid"], 25.0);
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        assert!(write_report(&file, &sample_report()).is_err());
    }
}
