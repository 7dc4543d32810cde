//! Resilient Upstream API Client
//!
//! HTTP client for the DramaBox catalog API with per-attempt timeout and
//! linear-backoff retry. Every logical call resolves to a tagged outcome:
//! either the parsed JSON body or a terminal [`FetchFailure`] carrying the
//! failure kind and how many attempts were made. Retryability is decided
//! once per attempt from the tagged result, so a 4xx always fails fast
//! while timeouts, network errors and 5xx responses burn through the
//! attempt budget.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry/timeout budget for one logical upstream call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Per-attempt timeout; an attempt exceeding it is cancelled and
    /// counted as one retryable failure
    pub timeout: Duration,
    /// Total attempts including the first (minimum 1)
    pub max_attempts: u32,
    /// Linear backoff base: the sleep before attempt `i+1` is
    /// `backoff_base * (i + 1)`
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(9),
            max_attempts: 3,
            backoff_base: Duration::from_millis(350),
        }
    }
}

impl RetryPolicy {
    pub fn new(timeout: Duration, max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            timeout,
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }
}

/// What ultimately went wrong with an upstream call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Attempt exceeded the policy timeout
    #[error("upstream request timed out")]
    Timeout,
    /// Connection-level failure (DNS, refused, reset, bad body)
    #[error("upstream network error: {0}")]
    Network(String),
    /// Non-2xx HTTP status
    #[error("upstream returned HTTP {0}")]
    Http(u16),
}

impl FetchErrorKind {
    /// Only transient conditions are worth another attempt. Client errors
    /// (4xx) fail fast: the upstream understood the request and rejected it.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchErrorKind::Timeout | FetchErrorKind::Network(_) => true,
            FetchErrorKind::Http(status) => *status >= 500,
        }
    }
}

/// Terminal failure of a logical call, after the attempt budget is spent
/// (or spent early on a non-retryable status)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} (after {attempts} attempt(s))")]
pub struct FetchFailure {
    pub kind: FetchErrorKind,
    pub attempts: u32,
}

/// Outcome of one logical upstream call
pub type FetchOutcome = Result<Value, FetchFailure>;

/// Upstream API Client
///
/// The base URL and default policy are injected at construction so tests
/// and multi-target deployments can override them per instance.
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl UpstreamClient {
    /// Create a new client for the given upstream base URL
    pub fn new(base_url: &str, user_agent: &str, policy: RetryPolicy) -> Self {
        // No global client timeout: the per-attempt budget in `fetch`
        // owns cancellation.
        let http = Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch `base_url + path` with the client's default policy
    pub async fn fetch(&self, path: &str) -> FetchOutcome {
        self.fetch_with_policy(path, &self.policy).await
    }

    /// Fetch with an explicit per-call policy
    pub async fn fetch_with_policy(&self, path: &str, policy: &RetryPolicy) -> FetchOutcome {
        let url = format!("{}{}", self.base_url, path);
        let max_attempts = policy.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 0..max_attempts {
            debug!("path" = path, "attempt" = attempt + 1, "upstream request");

            match self.attempt(&url, policy.timeout).await {
                Ok(body) => return Ok(body),
                Err(kind) => {
                    let attempts = attempt + 1;
                    if !kind.is_retryable() {
                        return Err(FetchFailure { kind, attempts });
                    }

                    if attempts < max_attempts {
                        // Linear pacing, not exponential
                        let backoff = policy.backoff_base * attempts;
                        warn!(
                            "path" = path,
                            "attempt" = attempts,
                            "error" = %kind,
                            "backoff_ms" = backoff.as_millis() as u64,
                            "retrying upstream request"
                        );
                        last_failure = Some(kind);
                        sleep(backoff).await;
                    } else {
                        last_failure = Some(kind);
                    }
                }
            }
        }

        Err(FetchFailure {
            // Loop always records a failure before falling through
            kind: last_failure.unwrap_or(FetchErrorKind::Network("no attempt made".into())),
            attempts: max_attempts,
        })
    }

    /// One bounded attempt: GET, check status, parse JSON
    async fn attempt(&self, url: &str, timeout: Duration) -> Result<Value, FetchErrorKind> {
        let response = self
            .http
            .get(url)
            .header("Accept", "*/*")
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchErrorKind::Http(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(classify_reqwest_error)
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> FetchErrorKind {
    if err.is_timeout() {
        FetchErrorKind::Timeout
    } else {
        FetchErrorKind::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(250),
            max_attempts,
            Duration::from_millis(5),
        )
    }

    fn client_for(server: &MockServer, policy: RetryPolicy) -> UpstreamClient {
        UpstreamClient::new(&server.uri(), "PanStream/1.0", policy)
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = UpstreamClient::new(
            "http://example.com/api/",
            "PanStream/1.0",
            RetryPolicy::default(),
        );
        assert_eq!(client.base_url(), "http://example.com/api");
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(9));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_base, Duration::from_millis(350));
    }

    #[test]
    fn test_retryability_is_a_property_of_the_kind() {
        assert!(FetchErrorKind::Timeout.is_retryable());
        assert!(FetchErrorKind::Network("reset".into()).is_retryable());
        assert!(FetchErrorKind::Http(500).is_retryable());
        assert!(FetchErrorKind::Http(503).is_retryable());
        assert!(!FetchErrorKind::Http(404).is_retryable());
        assert!(!FetchErrorKind::Http(429).is_retryable());
    }

    #[tokio::test]
    async fn test_success_returns_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"bookId": "b1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let body = client.fetch("/vip").await.unwrap();
        assert_eq!(body[0]["bookId"], "b1");
    }

    #[tokio::test]
    async fn test_server_error_burns_full_attempt_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let failure = client.fetch("/latest").await.unwrap_err();
        assert_eq!(failure.kind, FetchErrorKind::Http(500));
        assert_eq!(failure.attempts, 3);
    }

    #[tokio::test]
    async fn test_client_error_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/detail"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let failure = client.fetch("/detail").await.unwrap_err();
        assert_eq!(failure.kind, FetchErrorKind::Http(404));
        assert_eq!(failure.attempts, 1);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failed_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let policy = RetryPolicy::new(
            Duration::from_millis(50),
            2,
            Duration::from_millis(5),
        );
        let client = client_for(&server, policy);
        let failure = client.fetch("/trending").await.unwrap_err();
        assert_eq!(failure.kind, FetchErrorKind::Timeout);
        assert_eq!(failure.attempts, 2);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foryou"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/foryou"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, fast_policy(3));
        let body = client.fetch("/foryou").await.unwrap();
        assert!(body["data"].is_array());
    }
}
