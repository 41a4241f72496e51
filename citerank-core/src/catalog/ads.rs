//! NASA ADS catalog.
//!
//! Talks to the ADS search and library (biblib) APIs with a bearer token.
//! Handles per-call timeouts, retries with exponential backoff, response
//! parsing, and the circuit breaker.

use super::circuit_breaker::CircuitBreaker;
use super::rate_limit::RateLimitStatus;
use super::{Catalog, CatalogError, MonthQuery};
use crate::domain::{CitationRecord, DocumentRecord};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.adsabs.harvard.edu/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const LOOKUP_FIELDS: &str = "title,bibcode,citation_count,property,pubdate,author";
const PAGE_FIELDS: &str = "bibcode,citation_count";

/// An ADS API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// Read a token from the named environment variable, if set and non-empty.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(Self::new)
            .filter(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Transport settings for the ADS client.
#[derive(Debug, Clone)]
pub struct AdsSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for AdsSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// `/search/query` response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    bibcode: Option<String>,
    #[serde(default)]
    citation_count: Option<u32>,
    #[serde(default)]
    pubdate: Option<String>,
    #[serde(default)]
    author: Vec<String>,
}

/// `/biblib/libraries/<id>` response.
#[derive(Debug, Deserialize)]
struct LibraryResponse {
    solr: LibrarySolr,
}

#[derive(Debug, Deserialize)]
struct LibrarySolr {
    response: LibraryBody,
}

#[derive(Debug, Deserialize)]
struct LibraryBody {
    #[serde(default)]
    docs: Vec<LibraryDoc>,
}

#[derive(Debug, Deserialize)]
struct LibraryDoc {
    bibcode: String,
}

/// ADS catalog over the blocking HTTP client.
pub struct AdsCatalog {
    client: Client,
    credential: Credential,
    settings: AdsSettings,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl AdsCatalog {
    pub fn new(
        credential: Credential,
        settings: AdsSettings,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, CatalogError> {
        if credential.is_empty() {
            return Err(CatalogError::AuthenticationRequired(
                "an ADS API token is required".into(),
            ));
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("citerank/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credential,
            settings,
            circuit_breaker,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Issue a GET with retry and circuit breaker logic.
    ///
    /// `not_found` builds the error returned for HTTP 404.
    fn get_with_retry(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: impl Fn() -> CatalogError,
    ) -> Result<Response, CatalogError> {
        let url = self.url(path);
        retry_request(&self.settings, &self.circuit_breaker, path, not_found, || {
            self.client
                .get(&url)
                .header(reqwest::header::AUTHORIZATION, self.credential.bearer())
                .query(query)
                .send()
                .map_err(|e| SendFailure::from_reqwest(path, self.settings.timeout, e))
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: impl Fn() -> CatalogError,
    ) -> Result<T, CatalogError> {
        let resp = self.get_with_retry(path, query, not_found)?;
        resp.json::<T>().map_err(|e| {
            CatalogError::ResponseFormatChanged(format!("failed to parse {path} response: {e}"))
        })
    }

    /// Report the token's remaining daily quota.
    pub fn check_rate_limit(&self) -> Result<RateLimitStatus, CatalogError> {
        let query = [("q", "star".to_string()), ("rows", "1".to_string())];
        let resp = self.get_with_retry("search/query", &query, || {
            CatalogError::Other("search endpoint not found".into())
        })?;
        Ok(RateLimitStatus::from_headers(resp.headers()))
    }
}

/// Longest server-requested wait honored before giving up on a 429.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);
/// Ceiling for the exponential backoff between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential backoff for the given retry attempt (1-based), saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_BACKOFF)
}

/// The parts of an HTTP reply the retry loop inspects.
trait Reply {
    fn status(&self) -> StatusCode;
    fn retry_after(&self) -> Option<Duration>;
}

impl Reply for Response {
    fn status(&self) -> StatusCode {
        Response::status(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        self.headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

/// A request that never produced a reply.
struct SendFailure {
    error: CatalogError,
    retryable: bool,
}

impl SendFailure {
    fn from_reqwest(path: &str, timeout: Duration, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self {
                error: CatalogError::Timeout(format!("{path} after {timeout:?}: {e}")),
                retryable: true,
            }
        } else if e.is_connect() {
            Self {
                error: CatalogError::NetworkUnreachable(e.to_string()),
                retryable: true,
            }
        } else {
            Self {
                error: CatalogError::NetworkUnreachable(e.to_string()),
                retryable: false,
            }
        }
    }
}

/// Run `send` until it succeeds, fails permanently, or retries run out.
///
/// The breaker sees one outcome per request, not per attempt: a request that
/// recovers on retry counts as a success, and one that exhausts its retries
/// records a single failure and returns the last HTTP or transport error.
fn retry_request<R: Reply>(
    settings: &AdsSettings,
    breaker: &CircuitBreaker,
    path: &str,
    not_found: impl Fn() -> CatalogError,
    mut send: impl FnMut() -> Result<R, SendFailure>,
) -> Result<R, CatalogError> {
    let mut last_error = None;
    let mut server_wait = None;

    for attempt in 0..=settings.max_retries {
        if !breaker.is_allowed() {
            return Err(CatalogError::CircuitBreakerTripped);
        }
        if attempt > 0 {
            let delay = server_wait
                .take()
                .unwrap_or_else(|| backoff_delay(settings.base_delay, attempt));
            tracing::debug!(attempt, ?delay, path, "retrying catalog request");
            std::thread::sleep(delay);
        }

        let reply = match send() {
            Ok(reply) => reply,
            Err(SendFailure {
                error,
                retryable: true,
            }) => {
                last_error = Some(error);
                continue;
            }
            Err(SendFailure { error, .. }) => return Err(error),
        };

        let status = reply.status();
        if status.is_success() {
            breaker.record_success();
            return Ok(reply);
        }
        match status {
            StatusCode::FORBIDDEN => {
                breaker.trip();
                return Err(CatalogError::CircuitBreakerTripped);
            }
            StatusCode::UNAUTHORIZED => {
                return Err(CatalogError::AuthenticationRequired(
                    "ADS rejected the API token".into(),
                ));
            }
            StatusCode::NOT_FOUND => return Err(not_found()),
            StatusCode::TOO_MANY_REQUESTS => {
                let wait = reply.retry_after();
                let error = CatalogError::RateLimited {
                    retry_after_secs: wait.map_or(0, |w| w.as_secs()),
                };
                if wait.is_some_and(|w| w > MAX_RETRY_AFTER) {
                    breaker.record_failure();
                    return Err(error);
                }
                server_wait = wait;
                last_error = Some(error);
            }
            s if s.is_server_error() => {
                last_error = Some(CatalogError::Other(format!("HTTP {s} for {path}")));
            }
            s => return Err(CatalogError::Other(format!("HTTP {s} for {path}"))),
        }
    }

    breaker.record_failure();
    Err(last_error.unwrap_or_else(|| CatalogError::Other("max retries exceeded".into())))
}

impl Catalog for AdsCatalog {
    fn name(&self) -> &str {
        "ads"
    }

    fn lookup_document(&self, bib_code: &str) -> Result<DocumentRecord, CatalogError> {
        let query = [
            ("q", format!("bibcode:{bib_code}")),
            ("fl", LOOKUP_FIELDS.to_string()),
            ("rows", "1".to_string()),
        ];
        let not_found = || CatalogError::NotFound {
            bib_code: bib_code.to_string(),
        };
        let parsed: SearchResponse = self.get_json("search/query", &query, not_found)?;

        let doc = parsed.response.docs.into_iter().next().ok_or_else(not_found)?;
        let pubdate = doc.pubdate.ok_or_else(|| {
            CatalogError::ResponseFormatChanged(format!("no pubdate for {bib_code}"))
        })?;

        Ok(DocumentRecord {
            citation_count: doc.citation_count.unwrap_or(0),
            pubdate,
            authors: doc.author,
        })
    }

    fn fetch_page(&self, query: &MonthQuery) -> Result<Vec<CitationRecord>, CatalogError> {
        let params = [
            ("q", query.query_string()),
            ("fl", PAGE_FIELDS.to_string()),
            ("rows", query.page_cap.to_string()),
        ];
        let parsed: SearchResponse = self.get_json("search/query", &params, || {
            CatalogError::Other("search endpoint not found".into())
        })?;

        tracing::debug!(
            month = %query.pub_month,
            range = %query.range,
            num_found = parsed.response.num_found,
            returned = parsed.response.docs.len(),
            "fetched month page"
        );

        parsed
            .response
            .docs
            .into_iter()
            .map(|doc| {
                doc.citation_count
                    .map(|citation_count| CitationRecord { citation_count })
                    .ok_or_else(|| {
                        CatalogError::ResponseFormatChanged(format!(
                            "missing citation_count for {}",
                            doc.bibcode.as_deref().unwrap_or("<unknown>")
                        ))
                    })
            })
            .collect()
    }

    fn resolve_bib_codes(
        &self,
        collection_id: &str,
        page_cap: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let path = format!("biblib/libraries/{collection_id}");
        let query = [("rows", page_cap.to_string())];
        let parsed: LibraryResponse = self.get_json(&path, &query, || {
            CatalogError::LibraryNotFound {
                collection_id: collection_id.to_string(),
            }
        })?;

        Ok(parsed
            .solr
            .response
            .docs
            .into_iter()
            .map(|d| d.bibcode)
            .collect())
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::new("  secret-token \n");
        assert_eq!(format!("{c:?}"), "Credential(***)");
        assert_eq!(c.bearer(), "Bearer secret-token");
    }

    #[test]
    fn empty_credential_is_rejected() {
        let err = AdsCatalog::new(
            Credential::new("   "),
            AdsSettings::default(),
            Arc::new(CircuitBreaker::default_catalog()),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CatalogError::AuthenticationRequired(_)));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let catalog = AdsCatalog::new(
            Credential::new("t"),
            AdsSettings {
                base_url: "https://example.org/v1/".into(),
                ..AdsSettings::default()
            },
            Arc::new(CircuitBreaker::default_catalog()),
        )
        .unwrap();
        assert_eq!(
            catalog.url("/search/query"),
            "https://example.org/v1/search/query"
        );
    }

    #[test]
    fn tripped_breaker_short_circuits_without_network() {
        let breaker = Arc::new(CircuitBreaker::default_catalog());
        breaker.trip();
        let catalog =
            AdsCatalog::new(Credential::new("t"), AdsSettings::default(), breaker).unwrap();
        assert!(!catalog.is_available());
        let err = catalog.lookup_document("2022MNRAS.517.6035T").unwrap_err();
        assert!(matches!(err, CatalogError::CircuitBreakerTripped));
    }

    #[test]
    fn search_response_parses_ads_shape() {
        let body = r#"{
            "responseHeader": {"status": 0},
            "response": {"numFound": 1, "start": 0, "docs": [
                {"bibcode": "2022MNRAS.517.6035T", "citation_count": 42,
                 "pubdate": "2022-12-00", "author": ["Thorne, Jessica E.", "Robotham, A."]}
            ]}
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.response.num_found, 1);
        let doc = &parsed.response.docs[0];
        assert_eq!(doc.citation_count, Some(42));
        assert_eq!(doc.author.len(), 2);
    }

    #[test]
    fn library_response_parses_solr_docs() {
        let body = r#"{
            "metadata": {"name": "mine", "num_documents": 2},
            "solr": {"response": {"numFound": 2, "docs": [
                {"bibcode": "2020A&A...640A..47B"}, {"bibcode": "2021MNRAS.503.3309B"}
            ]}}
        }"#;
        let parsed: LibraryResponse = serde_json::from_str(body).unwrap();
        let codes: Vec<_> = parsed.solr.response.docs.into_iter().map(|d| d.bibcode).collect();
        assert_eq!(codes, vec!["2020A&A...640A..47B", "2021MNRAS.503.3309B"]);
    }

    struct FakeReply {
        status: u16,
        retry_after: Option<u64>,
    }

    impl Reply for FakeReply {
        fn status(&self) -> StatusCode {
            StatusCode::from_u16(self.status).unwrap()
        }

        fn retry_after(&self) -> Option<Duration> {
            self.retry_after.map(Duration::from_secs)
        }
    }

    fn reply(status: u16) -> FakeReply {
        FakeReply {
            status,
            retry_after: None,
        }
    }

    fn quick(max_retries: u32) -> AdsSettings {
        AdsSettings {
            max_retries,
            base_delay: Duration::ZERO,
            ..AdsSettings::default()
        }
    }

    /// Replay `replies` in order; returns the result and the number of sends.
    fn replay(
        settings: &AdsSettings,
        breaker: &CircuitBreaker,
        replies: Vec<FakeReply>,
    ) -> (Result<FakeReply, CatalogError>, usize) {
        let mut replies = replies.into_iter();
        let mut calls = 0;
        let result = retry_request(
            settings,
            breaker,
            "search/query",
            || CatalogError::Other("404".into()),
            || {
                calls += 1;
                Ok(replies.next().expect("ran out of replies"))
            },
        );
        (result, calls)
    }

    #[test]
    fn transient_server_errors_recover_without_tripping() {
        let breaker = CircuitBreaker::default_catalog();
        let (result, calls) = replay(
            &quick(3),
            &breaker,
            vec![reply(503), reply(502), reply(500), reply(200)],
        );
        assert_eq!(result.unwrap().status, 200);
        assert_eq!(calls, 4);
        assert!(breaker.is_allowed());
    }

    #[test]
    fn exhausted_retries_return_http_error_and_count_once() {
        let breaker = CircuitBreaker::default_catalog();
        for _ in 0..2 {
            let (result, calls) = replay(&quick(3), &breaker, (0..4).map(|_| reply(503)).collect());
            assert_eq!(calls, 4);
            match result {
                Err(CatalogError::Other(msg)) => assert!(msg.contains("503"), "{msg}"),
                Err(other) => panic!("expected HTTP error, got {other:?}"),
                Ok(_) => panic!("expected failure"),
            }
            assert!(breaker.is_allowed());
        }
        // Third failed request reaches the threshold.
        let (result, _) = replay(&quick(3), &breaker, (0..4).map(|_| reply(503)).collect());
        assert!(result.is_err());
        assert!(!breaker.is_allowed());
    }

    #[test]
    fn client_errors_are_not_retried() {
        let breaker = CircuitBreaker::default_catalog();
        let (result, calls) = replay(&quick(3), &breaker, vec![reply(400)]);
        assert!(matches!(result, Err(CatalogError::Other(_))));
        assert_eq!(calls, 1);

        let (result, calls) = replay(&quick(3), &breaker, vec![reply(404)]);
        assert!(matches!(result, Err(CatalogError::Other(m)) if m == "404"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn long_retry_after_gives_up_immediately() {
        let breaker = CircuitBreaker::default_catalog();
        let limited = FakeReply {
            status: 429,
            retry_after: Some(3600),
        };
        let (result, calls) = replay(&quick(3), &breaker, vec![limited]);
        assert!(matches!(
            result,
            Err(CatalogError::RateLimited {
                retry_after_secs: 3600
            })
        ));
        assert_eq!(calls, 1);
    }

    #[test]
    fn short_retry_after_is_retried() {
        let breaker = CircuitBreaker::default_catalog();
        let limited = FakeReply {
            status: 429,
            retry_after: Some(0),
        };
        let (result, calls) = replay(&quick(2), &breaker, vec![limited, reply(200)]);
        assert!(result.is_ok());
        assert_eq!(calls, 2);
    }

    #[test]
    fn forbidden_trips_breaker_at_once() {
        let breaker = CircuitBreaker::default_catalog();
        let (result, calls) = replay(&quick(3), &breaker, vec![reply(403)]);
        assert!(matches!(result, Err(CatalogError::CircuitBreakerTripped)));
        assert_eq!(calls, 1);
        assert!(breaker.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn backoff_saturates_for_large_attempts() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 40), MAX_BACKOFF);
        assert_eq!(backoff_delay(base, u32::MAX), MAX_BACKOFF);
    }
}
