// src/checker/probe.rs
// =============================================================================
// This module checks if a URL answers by making HTTP HEAD requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Records the status of every redirect hop it follows
// - Detects redirect loops and gives up on them straight away
// - Retries other network failures a fixed number of times
//
// The HTTP part sits behind the Transport trait. ReqwestTransport is the
// real one; tests plug in fakes so the retry logic can be checked without
// a network.
//
// Rust concepts:
// - Traits: A shared interface for "something that can send a HEAD request"
// - async_trait: Lets a trait have async methods
// - Arc + Mutex: To share the redirect history with reqwest's redirect policy
// =============================================================================

use async_trait::async_trait;
use reqwest::{redirect, Client};
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

// The raw outcome of probing one URL (after retries)
//
// This is what the classifier consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Got an HTTP response (any status code)
    Success {
        /// Status of the final response
        http_status: u16,
        /// URL of the final response
        final_url: String,
        /// Status code of each redirect hop followed, in order
        redirect_chain: Vec<u16>,
    },
    /// The transport refused to keep following redirects
    RedirectLoop,
    /// Anything else went wrong, even after retrying
    NetworkError { message: String },
}

/// Settings for a single probe
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Follow redirects (and report them) instead of returning the 3xx
    pub allow_redirects: bool,
    /// Extra attempts after the first one fails
    pub max_retries: u32,
    /// Fixed pause between attempts
    pub retry_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Hops to follow before calling it a loop
    pub max_redirects: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            allow_redirects: true,
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            max_redirects: 30,
        }
    }
}

/// What one HEAD request came back with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub final_url: String,
    pub redirect_chain: Vec<u16>,
}

/// Why one HEAD request failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("redirect loop: {0}")]
    RedirectLoop(String),
    #[error("{0}")]
    Network(String),
}

// Anything that can send a single HEAD request
//
// One call = one attempt. Retrying is the prober's job, not the transport's.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn head(&self, url: &str, follow_redirects: bool) -> Result<HeadResponse, TransportError>;
}

// Probes a URL, retrying network failures
//
// Parameters:
//   transport: sends the actual requests
//   url: the URL to probe (must not be empty, the caller checks that)
//   settings: retry count, retry delay and redirect behaviour
//
// Makes at most settings.max_retries + 1 attempts. A redirect loop ends the
// probe immediately.
pub async fn probe<T>(transport: &T, url: &str, settings: &ProbeSettings) -> ProbeOutcome
where
    T: Transport + ?Sized,
{
    let mut attempt = 0;
    loop {
        match transport.head(url, settings.allow_redirects).await {
            Ok(response) => {
                return ProbeOutcome::Success {
                    http_status: response.status,
                    final_url: response.final_url,
                    redirect_chain: response.redirect_chain,
                };
            }
            Err(TransportError::RedirectLoop(_)) => return ProbeOutcome::RedirectLoop,
            Err(TransportError::Network(message)) => {
                if attempt >= settings.max_retries {
                    return ProbeOutcome::NetworkError { message };
                }
                tokio::time::sleep(settings.retry_delay).await;
                attempt += 1;
            }
        }
    }
}

// The real transport, built on reqwest
//
// A fresh client is built per request. The redirect policy closure needs its
// own place to write the hop statuses, and probes run concurrently.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
    max_redirects: usize,
}

impl ReqwestTransport {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            timeout: settings.timeout,
            max_redirects: settings.max_redirects,
        }
    }

    fn build_client(
        &self,
        follow_redirects: bool,
        hops: Arc<Mutex<Vec<u16>>>,
    ) -> Result<Client, TransportError> {
        let policy = if follow_redirects {
            let max_redirects = self.max_redirects;
            redirect::Policy::custom(move |attempt| {
                if attempt.previous().iter().any(|seen| seen == attempt.url()) {
                    return attempt.error("redirect loop detected");
                }
                // previous() holds the starting URL plus every hop so far
                if attempt.previous().len() > max_redirects {
                    return attempt.error("too many redirects");
                }
                if let Ok(mut hops) = hops.lock() {
                    hops.push(attempt.status().as_u16());
                }
                attempt.follow()
            })
        } else {
            redirect::Policy::none()
        };

        Client::builder()
            .timeout(self.timeout)
            .redirect(policy)
            .build()
            .map_err(|e| TransportError::Network(error_message(&e)))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(&ProbeSettings::default())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn head(&self, url: &str, follow_redirects: bool) -> Result<HeadResponse, TransportError> {
        let parsed = Url::parse(url).map_err(|e| {
            TransportError::Network(format!("Invalid URL '{}': {}", url, e))
        })?;

        let hops = Arc::new(Mutex::new(Vec::new()));
        let client = self.build_client(follow_redirects, hops.clone())?;

        let response = client.head(parsed).send().await.map_err(|e| {
            if e.is_redirect() {
                TransportError::RedirectLoop(error_message(&e))
            } else {
                TransportError::Network(error_message(&e))
            }
        })?;

        let redirect_chain = hops.lock().map(|hops| hops.clone()).unwrap_or_default();

        Ok(HeadResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
            redirect_chain,
        })
    }
}

// reqwest's Display only shows the outer layer ("error sending request"),
// so walk the source chain to keep the useful part (DNS, refused, timeout)
fn error_message(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Transport trait instead of calling reqwest directly?
//    - probe() only cares about "did I get a response, a loop, or an error"
//    - Tests can hand it a fake that fails three times in a row
//    - No network needed to check the retry count
//
// 2. What is T: Transport + ?Sized?
//    - ?Sized lets T be a trait object too, so &dyn Transport works
//
// 3. Why Arc<Mutex<Vec<u16>>> for the hops?
//    - reqwest calls our redirect closure, not the other way round
//    - The closure and head() both need the same Vec
//    - Arc shares it, Mutex makes writing to it safe
//
// 4. Why tokio::time::sleep and not std::thread::sleep?
//    - std sleep would block the whole worker thread
//    - tokio sleep lets other probes keep running while this one waits
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Replays a script of results, one per attempt, and counts the attempts
    struct ScriptedTransport {
        script: Vec<Result<HeadResponse, TransportError>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<HeadResponse, TransportError>>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn head(&self, _url: &str, _follow: bool) -> Result<HeadResponse, TransportError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.script[index.min(self.script.len() - 1)].clone()
        }
    }

    fn fast_settings() -> ProbeSettings {
        ProbeSettings {
            retry_delay: Duration::ZERO,
            ..ProbeSettings::default()
        }
    }

    fn network(message: &str) -> Result<HeadResponse, TransportError> {
        Err(TransportError::Network(message.to_string()))
    }

    fn ok(status: u16) -> Result<HeadResponse, TransportError> {
        Ok(HeadResponse {
            status,
            final_url: "https://example.com/".to_string(),
            redirect_chain: vec![],
        })
    }

    #[test]
    fn test_default_settings() {
        let settings = ProbeSettings::default();
        assert!(settings.allow_redirects);
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.retry_delay, Duration::from_secs(1));
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_three_network_errors_make_three_attempts() {
        let transport = ScriptedTransport::new(vec![
            network("first"),
            network("second"),
            network("third"),
            ok(200),
        ]);

        let outcome = probe(&transport, "https://example.com", &fast_settings()).await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(
            outcome,
            ProbeOutcome::NetworkError {
                message: "third".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_success_stops_retrying() {
        let transport = ScriptedTransport::new(vec![network("blip"), ok(404)]);

        let outcome = probe(&transport, "https://example.com", &fast_settings()).await;

        assert_eq!(transport.calls(), 2);
        assert!(matches!(outcome, ProbeOutcome::Success { http_status: 404, .. }));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_not_retried() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::RedirectLoop("loop".to_string())),
            ok(200),
        ]);

        let outcome = probe(&transport, "https://example.com", &fast_settings()).await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(outcome, ProbeOutcome::RedirectLoop);
    }

    #[tokio::test]
    async fn test_zero_retries_means_one_attempt() {
        let transport = ScriptedTransport::new(vec![network("down")]);
        let settings = ProbeSettings {
            max_retries: 0,
            ..fast_settings()
        };

        let outcome = probe(&transport, "https://example.com", &settings).await;

        assert_eq!(transport.calls(), 1);
        assert!(matches!(outcome, ProbeOutcome::NetworkError { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_delay_is_fixed() {
        let transport = ScriptedTransport::new(vec![network("a"), network("b"), network("c")]);
        let settings = ProbeSettings::default();

        let started = tokio::time::Instant::now();
        probe(&transport, "https://example.com", &settings).await;

        // two sleeps of one second each, no backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_reqwest_head_ok() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let outcome = probe(&ReqwestTransport::default(), &url, &fast_settings()).await;

        assert_eq!(
            outcome,
            ProbeOutcome::Success {
                http_status: 200,
                final_url: url,
                redirect_chain: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_reqwest_records_redirect_hops() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/middle", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/middle"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/new", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = format!("{}/old", server.uri());
        let outcome = probe(&ReqwestTransport::default(), &url, &fast_settings()).await;

        assert_eq!(
            outcome,
            ProbeOutcome::Success {
                http_status: 200,
                final_url: format!("{}/new", server.uri()),
                redirect_chain: vec![301, 302],
            }
        );
    }

    #[tokio::test]
    async fn test_reqwest_without_redirects_returns_the_3xx() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri()).as_str()),
            )
            .mount(&server)
            .await;

        let url = format!("{}/old", server.uri());
        let settings = ProbeSettings {
            allow_redirects: false,
            ..fast_settings()
        };
        let outcome = probe(&ReqwestTransport::new(&settings), &url, &settings).await;

        assert_eq!(
            outcome,
            ProbeOutcome::Success {
                http_status: 301,
                final_url: url,
                redirect_chain: vec![],
            }
        );
    }

    // Mounts /hop/0 -> /hop/1 -> ... -> /hop/<hops> as 301s, the last one answering 200
    async fn mount_redirect_chain(server: &MockServer, hops: usize) {
        for hop in 0..hops {
            Mock::given(method("HEAD"))
                .and(path(format!("/hop/{}", hop)))
                .respond_with(
                    ResponseTemplate::new(301)
                        .insert_header("Location", format!("{}/hop/{}", server.uri(), hop + 1).as_str()),
                )
                .mount(server)
                .await;
        }
        Mock::given(method("HEAD"))
            .and(path(format!("/hop/{}", hops)))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_reqwest_follows_exactly_max_redirects() {
        let server = MockServer::start().await;
        mount_redirect_chain(&server, 30).await;

        let url = format!("{}/hop/0", server.uri());
        let outcome = probe(&ReqwestTransport::default(), &url, &fast_settings()).await;

        assert_eq!(
            outcome,
            ProbeOutcome::Success {
                http_status: 200,
                final_url: format!("{}/hop/30", server.uri()),
                redirect_chain: vec![301; 30],
            }
        );
    }

    #[tokio::test]
    async fn test_reqwest_one_hop_past_the_limit_is_a_loop() {
        let server = MockServer::start().await;
        mount_redirect_chain(&server, 31).await;

        let url = format!("{}/hop/0", server.uri());
        let outcome = probe(&ReqwestTransport::default(), &url, &fast_settings()).await;

        assert_eq!(outcome, ProbeOutcome::RedirectLoop);
    }

    #[tokio::test]
    async fn test_reqwest_detects_redirect_loop() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ping"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/pong", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/pong"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/ping", server.uri()).as_str()),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::default();
        let url = format!("{}/ping", server.uri());
        let outcome = probe(&transport, &url, &fast_settings()).await;

        assert_eq!(outcome, ProbeOutcome::RedirectLoop);
    }

    #[tokio::test]
    async fn test_reqwest_connection_refused_is_network_error() {
        // Bind and drop a listener to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{}/", port);

        let outcome = probe(&ReqwestTransport::default(), &url, &fast_settings()).await;

        assert!(matches!(outcome, ProbeOutcome::NetworkError { .. }));
    }

    #[tokio::test]
    async fn test_reqwest_invalid_url_is_network_error() {
        let outcome = probe(&ReqwestTransport::default(), "not a url", &fast_settings()).await;

        match outcome {
            ProbeOutcome::NetworkError { message } => assert!(message.contains("Invalid URL")),
            other => panic!("expected a network error, got {:?}", other),
        }
    }
}
