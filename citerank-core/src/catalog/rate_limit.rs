//! API quota introspection from `X-RateLimit-*` response headers.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Daily call quota as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// When the quota resets (header carries a Unix timestamp).
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitStatus {
    pub fn from_header_values(
        limit: Option<&str>,
        remaining: Option<&str>,
        reset: Option<&str>,
    ) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u64>().ok());
        let reset = reset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .and_then(|ts| DateTime::from_timestamp(ts, 0));
        Self {
            limit: parse(limit),
            remaining: parse(remaining),
            reset,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self::from_header_values(get(LIMIT_HEADER), get(REMAINING_HEADER), get(RESET_HEADER))
    }
}

impl fmt::Display for RateLimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<u64>| v.map_or_else(|| "unknown".to_string(), |n| n.to_string());
        writeln!(f, "API Call Limit:     {}", show(self.limit))?;
        writeln!(f, "Calls Remaining:    {}", show(self.remaining))?;
        match self.reset {
            Some(reset) => write!(
                f,
                "Limit Resets At:    {}",
                reset.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => write!(f, "Reset time not provided in headers."),
        }
    }
}
