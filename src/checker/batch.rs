// src/checker/batch.rs
// =============================================================================
// This module checks a whole list of records.
//
// How it works:
// 1. Rows without a URL are classified as SKIPPED right away (no request)
// 2. Every other row is probed, then classified
// 3. Results come back in input order and are folded into one Summary
//
// Probes run concurrently, but `buffered` hands results back in the same
// order the records went in, and only this loop touches the Summary.
//
// Rust concepts:
// - Streams: stream::iter + buffered for a bounded pool of in-flight probes
// - Generics: check_records works with any Transport (real or fake)
// - Closures: on_result lets the caller print progress as results arrive
// =============================================================================

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classify::{classify, ClassifiedResult, Status};
use super::probe::{probe, ProbeSettings, Transport};
use super::summary::Summary;

/// One row from the link table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub description: String,
    pub url: String,
    pub category: String,
}

/// Everything the report needs: all results in input order plus the counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub results: Vec<ClassifiedResult>,
    pub summary: Summary,
}

impl Report {
    /// Results with status INVALID, ERROR or REDIRECT_LOOP
    pub fn broken(&self) -> impl Iterator<Item = &ClassifiedResult> {
        self.results.iter().filter(|r| r.status.is_broken())
    }

    /// Results with status VALID
    pub fn valid(&self) -> impl Iterator<Item = &ClassifiedResult> {
        self.results.iter().filter(|r| r.status == Status::Valid)
    }
}

// Checks one record
//
// The empty-URL check comes first so a missing URL never costs a request
pub async fn check_record<T>(transport: &T, record: &InputRecord, settings: &ProbeSettings) -> ClassifiedResult
where
    T: Transport + ?Sized,
{
    let url = record.url.trim();
    if url.is_empty() {
        return classify(url, &record.description, None);
    }

    let outcome = probe(transport, url, settings).await;
    classify(url, &record.description, Some(&outcome))
}

// Checks every record and builds the report
//
// Parameters:
//   records: the rows to check, in order
//   transport: sends the HEAD requests
//   settings: retry and redirect policy for each probe
//   concurrency: how many probes may be in flight at once (0 is treated as 1)
//   on_result: called with the 1-based index of each result, in order
pub async fn check_records<T, F>(
    records: &[InputRecord],
    transport: &T,
    settings: &ProbeSettings,
    concurrency: usize,
    mut on_result: F,
) -> Report
where
    T: Transport + ?Sized,
    F: FnMut(usize, &ClassifiedResult),
{
    info!(records = records.len(), concurrency, "checking links");

    let mut results = Vec::with_capacity(records.len());
    let mut summary = Summary::default();

    let mut checks = stream::iter(records)
        .map(|record| check_record(transport, record, settings))
        .buffered(concurrency.max(1));

    while let Some(result) = checks.next().await {
        debug!(url = %result.url, status = %result.status, code = %result.http_code, "classified");
        summary = summary.accumulate(&result);
        debug_assert!(summary.is_consistent(), "summary buckets no longer add up: {:?}", summary);
        on_result(results.len() + 1, &result);
        results.push(result);
    }

    info!(
        total = summary.total,
        valid = summary.valid,
        broken = summary.broken,
        "finished checking links"
    );

    Report { results, summary }
}
