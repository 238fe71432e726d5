// src/checker/summary.rs
// =============================================================================
// This module counts classified results.
//
// Every result lands in exactly one bucket, decided once from its final
// status. So the buckets always add up to the total.
//
// Rust concepts:
// - Exhaustive match: Adding a Status variant won't compile until it has a bucket
// - Fold: accumulate() takes a Summary and returns the next one
// =============================================================================

use serde::{Deserialize, Serialize};

use super::classify::{ClassifiedResult, Status};

/// The summary counter a status is counted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Valid,
    Broken,
    Skipped,
    Redirected,
    InvalidHttp,
    RedirectPermanentHttp,
}

impl Bucket {
    pub fn of(status: Status) -> Self {
        match status {
            Status::Valid => Bucket::Valid,
            Status::RedirectPermanent | Status::RedirectTemporary | Status::RedirectOther => {
                Bucket::Redirected
            }
            Status::RedirectPermanentHttp => Bucket::RedirectPermanentHttp,
            Status::Skipped => Bucket::Skipped,
            Status::InvalidHttp => Bucket::InvalidHttp,
            Status::Invalid | Status::Error | Status::RedirectLoop => Bucket::Broken,
        }
    }
}

/// Running counts over a batch of results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub broken: usize,
    pub skipped: usize,
    pub redirected: usize,
    pub invalid_http: usize,
    pub redirect_permanent_http: usize,
}

impl Summary {
    /// Returns the summary with one more result counted
    pub fn accumulate(mut self, result: &ClassifiedResult) -> Self {
        self.total += 1;
        match Bucket::of(result.status) {
            Bucket::Valid => self.valid += 1,
            Bucket::Broken => self.broken += 1,
            Bucket::Skipped => self.skipped += 1,
            Bucket::Redirected => self.redirected += 1,
            Bucket::InvalidHttp => self.invalid_http += 1,
            Bucket::RedirectPermanentHttp => self.redirect_permanent_http += 1,
        }
        self
    }

    #[cfg(test)]
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a ClassifiedResult>,
    {
        results.into_iter().fold(Summary::default(), Summary::accumulate)
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Valid => self.valid,
            Bucket::Broken => self.broken,
            Bucket::Skipped => self.skipped,
            Bucket::Redirected => self.redirected,
            Bucket::InvalidHttp => self.invalid_http,
            Bucket::RedirectPermanentHttp => self.redirect_permanent_http,
        }
    }

    /// Share of the total, 0.0 for an empty summary
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// True when the buckets add up to the total
    pub fn is_consistent(&self) -> bool {
        self.valid
            + self.broken
            + self.skipped
            + self.redirected
            + self.invalid_http
            + self.redirect_permanent_http
            == self.total
    }

    pub fn has_broken(&self) -> bool {
        self.broken > 0
    }
}
