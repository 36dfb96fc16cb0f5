use std::collections::HashMap;

use account_scan_core::{IdPage, QuotaStatus, UserId};
use chrono::DateTime;
use serde::Deserialize;

use crate::error::{Result, TwitterError};

/// Body of `followers/ids` and `friends/ids`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdsResponse {
    pub ids: Vec<u64>,
    pub next_cursor: i64,
}

impl From<IdsResponse> for IdPage {
    fn from(response: IdsResponse) -> Self {
        IdPage {
            ids: response.ids.into_iter().map(UserId).collect(),
            next_cursor: response.next_cursor,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitEntry {
    pub limit: u32,
    pub remaining: u32,
    /// Epoch seconds
    pub reset: i64,
}

impl TryFrom<RateLimitEntry> for QuotaStatus {
    type Error = TwitterError;

    fn try_from(entry: RateLimitEntry) -> Result<Self> {
        let reset = DateTime::from_timestamp(entry.reset, 0).ok_or_else(|| {
            TwitterError::InvalidResponse(format!("reset out of range: {}", entry.reset))
        })?;

        Ok(QuotaStatus {
            limit: entry.limit,
            remaining: entry.remaining,
            reset,
        })
    }
}

/// Body of `application/rate_limit_status`, keyed by resource family then resource path.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitStatusResponse {
    pub resources: HashMap<String, HashMap<String, RateLimitEntry>>,
}

impl RateLimitStatusResponse {
    pub fn entry(&self, family: &str, path: &str) -> Option<RateLimitEntry> {
        self.resources.get(family)?.get(path).copied()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorRaw {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorsResponse {
    pub errors: Vec<ApiErrorRaw>,
}
