// src/checker/classify.rs
// =============================================================================
// This module turns a raw probe outcome into a semantic status.
//
// Key functionality:
// - Status: the closed set of ten verdicts a link can get
// - HttpCode: either a real HTTP status or a message (for errors/skips)
// - classify(): the decision table, plus the http -> https reclassification
//
// Nothing in here touches the network. Give it the same inputs twice and
// you get the same ClassifiedResult twice.
//
// Rust concepts:
// - Enums: To make the status set closed and match-checkable
// - #[serde(untagged)]: To serialize HttpCode as a bare number or string
// - impl Display: So statuses print as "VALID", "REDIRECT_LOOP", etc.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

use super::probe::ProbeOutcome;

/// HTTP code reported for a redirect loop (not a real HTTP status)
pub const REDIRECT_LOOP_CODE: u16 = 310;

/// Code text for a row with no URL
pub const MISSING_URL: &str = "Missing URL";

/// Code text for a URL that reached the classifier without being probed
pub const NOT_PROBED: &str = "URL was not probed";

// The verdict for one link
//
// The serialized name is the upper-case form used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// 200 with no redirect
    Valid,
    /// Any other status with no redirect
    Invalid,
    /// Invalid, but only because the site moved from http to https
    InvalidHttp,
    /// Last redirect hop was a 301
    RedirectPermanent,
    /// A 301 that is nothing more than an http -> https upgrade
    RedirectPermanentHttp,
    /// Last redirect hop was a 302
    RedirectTemporary,
    /// Last redirect hop was some other 3xx (303, 307, 308, ...)
    RedirectOther,
    /// The transport gave up following redirects
    RedirectLoop,
    /// Network failure after all retries
    Error,
    /// No URL was supplied
    Skipped,
}

#[cfg(test)]
impl Status {
    /// Every status, in report order
    pub const ALL: [Status; 10] = [
        Status::Valid,
        Status::Invalid,
        Status::InvalidHttp,
        Status::RedirectPermanent,
        Status::RedirectPermanentHttp,
        Status::RedirectTemporary,
        Status::RedirectOther,
        Status::RedirectLoop,
        Status::Error,
        Status::Skipped,
    ];
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Valid => "VALID",
            Status::Invalid => "INVALID",
            Status::InvalidHttp => "INVALID_HTTP",
            Status::RedirectPermanent => "REDIRECT_PERMANENT",
            Status::RedirectPermanentHttp => "REDIRECT_PERMANENT_HTTP",
            Status::RedirectTemporary => "REDIRECT_TEMPORARY",
            Status::RedirectOther => "REDIRECT_OTHER",
            Status::RedirectLoop => "REDIRECT_LOOP",
            Status::Error => "ERROR",
            Status::Skipped => "SKIPPED",
        }
    }

    /// Statuses that belong in the "broken" view of the report
    pub fn is_broken(&self) -> bool {
        matches!(self, Status::Invalid | Status::Error | Status::RedirectLoop)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers like {:<18} work
        f.pad(self.as_str())
    }
}

// What goes in the "HTTP Status" column
//
// A real status code for anything that got a response, otherwise a message
// (the network error text, or "Missing URL")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpCode {
    Status(u16),
    Message(String),
}

impl HttpCode {
    /// The numeric status, if there is one
    pub fn as_number(&self) -> Option<u16> {
        match self {
            HttpCode::Status(code) => Some(*code),
            HttpCode::Message(_) => None,
        }
    }
}

impl fmt::Display for HttpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpCode::Status(code) => write!(f, "{}", code),
            HttpCode::Message(message) => f.write_str(message),
        }
    }
}

/// The classified result for one input record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedResult {
    pub description: String,
    pub url: String,
    pub status: Status,
    pub http_code: HttpCode,
    /// Where the probe ended up ("" for skipped rows)
    pub final_url: String,
    /// Status code of the last redirect hop, if any redirect happened
    pub redirect_code: Option<u16>,
}

// Classifies one URL
//
// Parameters:
//   url: the URL from the input record (already trimmed by the caller)
//   description: carried through unchanged
//   outcome: what the prober saw, or None when the URL is empty
//
// The decision table is evaluated top to bottom, first match wins.
pub fn classify(url: &str, description: &str, outcome: Option<&ProbeOutcome>) -> ClassifiedResult {
    let result = |status, http_code, final_url: &str, redirect_code| ClassifiedResult {
        description: description.to_string(),
        url: url.to_string(),
        status,
        http_code,
        final_url: final_url.to_string(),
        redirect_code,
    };

    if url.trim().is_empty() {
        return result(Status::Skipped, HttpCode::Message(MISSING_URL.to_string()), "", None);
    }

    let outcome = match outcome {
        Some(outcome) => outcome,
        None => return result(Status::Error, HttpCode::Message(NOT_PROBED.to_string()), url, None),
    };

    match outcome {
        ProbeOutcome::RedirectLoop => {
            result(Status::RedirectLoop, HttpCode::Status(REDIRECT_LOOP_CODE), url, None)
        }
        ProbeOutcome::NetworkError { message } => {
            result(Status::Error, HttpCode::Message(message.clone()), url, None)
        }
        ProbeOutcome::Success { http_status, final_url, redirect_chain } => {
            match redirect_chain.last() {
                Some(&last_hop) => {
                    let status = match last_hop {
                        301 => Status::RedirectPermanent,
                        302 => Status::RedirectTemporary,
                        _ => Status::RedirectOther,
                    };
                    let status = reclassify(status, url, final_url);
                    result(status, HttpCode::Status(*http_status), final_url.as_str(), Some(last_hop))
                }
                None if *http_status == 200 => {
                    result(Status::Valid, HttpCode::Status(200), url, None)
                }
                None => {
                    // No redirect, so final_url normally equals url. It is still
                    // the one compared, since that is the URL the server answered for.
                    let status = reclassify(Status::Invalid, url, final_url);
                    result(status, HttpCode::Status(*http_status), url, None)
                }
            }
        }
    }
}

// Splits out the results whose only problem is the site enforcing https
fn reclassify(status: Status, url: &str, reached_url: &str) -> Status {
    match status {
        Status::Invalid if is_scheme_upgrade(url, reached_url) => Status::InvalidHttp,
        Status::RedirectPermanent if is_scheme_upgrade(url, reached_url) => {
            Status::RedirectPermanentHttp
        }
        other => other,
    }
}

/// True when `reached` is `original` with the first "http:" swapped for
/// "https:" and nothing else changed
///
/// Exact string comparison: a trailing slash or a reordered query string
/// means it is not a pure upgrade.
pub fn is_scheme_upgrade(original: &str, reached: &str) -> bool {
    original.starts_with("http:")
        && reached.starts_with("https:")
        && original.replacen("http:", "https:", 1) == reached
}
