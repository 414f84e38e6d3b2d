use std::sync::Mutex;

use serde::Deserialize;
use time::{Duration, OffsetDateTime};

/// Longest lifetime the cache will honour, whatever the provider claims.
const MAX_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Body of a successful client-credentials exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: OffsetDateTime,
}

/// Single-slot cache for the provider's bearer token.
///
/// The lock is only taken for the read or the write, never across a network
/// call, so two requests that both see a stale token will both refresh and
/// the later write wins.
#[derive(Debug)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    margin: Duration,
}

impl TokenCache {
    pub fn new(margin_secs: i64) -> Self {
        Self {
            slot: Mutex::new(None),
            margin: Duration::seconds(margin_secs.clamp(0, MAX_LIFETIME_SECS)),
        }
    }

    /// Cached token if `now` is still before its (margin-adjusted) expiry.
    pub fn get(&self, now: OffsetDateTime) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.access_token.clone())
    }

    /// Records a freshly issued token and returns the instant it goes stale.
    /// `expires_in` is clamped to `0..=MAX_LIFETIME_SECS`.
    pub fn store(&self, token: TokenResponse, now: OffsetDateTime) -> OffsetDateTime {
        let lifetime = Duration::seconds(token.expires_in.clamp(0, MAX_LIFETIME_SECS));
        let expires_at = now + lifetime - self.margin;
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CachedToken {
            access_token: token.access_token,
            expires_at,
        });
        expires_at
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}
