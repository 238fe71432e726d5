// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - probe: Sends HEAD requests, follows redirects, retries network failures
// - classify: Turns a probe outcome into one of the ten statuses
// - summary: Counts the statuses into summary buckets
// - batch: Runs the three above over a whole list of records
//
// This file (mod.rs) is the module root. It re-exports the public API so the
// rest of the app can write `checker::check_records()`.
// =============================================================================

mod batch;
mod classify;
mod probe;
mod summary;

pub use batch::{check_records, InputRecord, Report};
pub use classify::{ClassifiedResult, Status};
#[cfg(test)]
pub use classify::HttpCode;
pub use probe::{ProbeSettings, ReqwestTransport};
pub use summary::{Bucket, Summary};
