pub mod error;

pub use error::{FetchError, Result};

use std::time::Duration;

use tracing::{debug, info, warn};

const USER_AGENT: &str = "nanopub-batch/0.1";

/// Combined accept header for the bare-URL attempt, most specific first.
const COMBINED_ACCEPT: &str =
    "application/trig, application/n-quads, text/turtle, application/rdf+xml";

/// Tokens that indicate RDF-like content rather than an error page.
const CONTENT_MARKERS: [&str; 5] = ["@prefix", "subject", "predicate", "object", "<http"];

/// Raw content accepted from a remote source, plus the accept header that
/// produced it.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub raw_text: String,
    pub declared_format: String,
}

/// One URL-variant/accept-header pairing in the fixed fallback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub url: String,
    pub accept: &'static str,
}

/// The fixed attempt order: known serialization suffixes first, then the bare
/// URL with a combined accept header, then a wildcard as last resort.
pub fn fetch_attempts(url: &str) -> Vec<FetchAttempt> {
    vec![
        FetchAttempt { url: format!("{url}.trig"), accept: "application/trig" },
        FetchAttempt { url: format!("{url}.nq"), accept: "application/n-quads" },
        FetchAttempt { url: format!("{url}.ttl"), accept: "text/turtle" },
        FetchAttempt { url: format!("{url}.rdf"), accept: "application/rdf+xml" },
        FetchAttempt { url: url.to_string(), accept: COMBINED_ACCEPT },
        FetchAttempt { url: url.to_string(), accept: "*/*" },
    ]
}

/// Whether a response body looks like actual graph serialization content.
/// Rejects empty bodies and HTML error pages served with a 200 status.
pub fn acceptable(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return false;
    }
    if starts_with_ignore_ascii_case(trimmed, "<!DOCTYPE")
        || starts_with_ignore_ascii_case(trimmed, "<html")
    {
        return false;
    }
    CONTENT_MARKERS.iter().any(|marker| trimmed.contains(marker))
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

enum LastFailure {
    Timeout,
    Transport(String),
}

pub struct NanopubClient {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl NanopubClient {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            timeout_secs: timeout.as_secs(),
        }
    }

    /// Fetch nanopub content, walking the fixed attempt list and stopping at
    /// the first response that passes the acceptance checks. No retries beyond
    /// the list itself.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        let attempts = fetch_attempts(url);
        let total_attempts = attempts.len();
        let mut last_failure: Option<LastFailure> = None;

        for attempt in attempts {
            debug!(url = attempt.url.as_str(), accept = attempt.accept, "Fetch attempt");

            let response = match self
                .client
                .get(&attempt.url)
                .header(reqwest::header::ACCEPT, attempt.accept)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    warn!(url = attempt.url.as_str(), "Fetch attempt timed out");
                    last_failure = Some(LastFailure::Timeout);
                    continue;
                }
                Err(e) => {
                    warn!(url = attempt.url.as_str(), error = %e, "Fetch attempt failed");
                    last_failure = Some(LastFailure::Transport(e.to_string()));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                debug!(
                    url = attempt.url.as_str(),
                    status = status.as_u16(),
                    "Non-success status, trying next format"
                );
                continue;
            }

            let body = match response.text().await {
                Ok(b) => b,
                Err(e) if e.is_timeout() => {
                    warn!(url = attempt.url.as_str(), "Timed out reading response body");
                    last_failure = Some(LastFailure::Timeout);
                    continue;
                }
                Err(e) => {
                    warn!(url = attempt.url.as_str(), error = %e, "Failed to read response body");
                    last_failure = Some(LastFailure::Transport(e.to_string()));
                    continue;
                }
            };

            if acceptable(&body) {
                info!(
                    url = attempt.url.as_str(),
                    accept = attempt.accept,
                    bytes = body.trim().len(),
                    "Fetched nanopub content"
                );
                return Ok(FetchOutcome {
                    raw_text: body.trim().to_string(),
                    declared_format: attempt.accept.to_string(),
                });
            }

            debug!(
                url = attempt.url.as_str(),
                "Response body failed content checks, trying next format"
            );
        }

        Err(match last_failure {
            Some(LastFailure::Timeout) => FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout_secs,
            },
            Some(LastFailure::Transport(message)) => FetchError::Transport {
                url: url.to_string(),
                message,
            },
            None => FetchError::Exhausted {
                url: url.to_string(),
                attempts: total_attempts,
            },
        })
    }
}
