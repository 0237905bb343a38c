//! Durable sliding-window rate limiting
//!
//! Counts exact request timestamps inside a trailing window, persisted
//! in SQLite so limits survive restarts. A store failure never blocks
//! traffic: the limiter fails open and reports an unknown remainder.
//!
//! The read-modify-write on a key is not guarded by a transaction.
//! Two requests from the same actor in the same instant can both read
//! the pre-update count and both be admitted; the limiter is advisory,
//! not a security boundary.

use std::time::Duration;

use axum::http::HeaderMap;
use sqlx::SqlitePool;

use plantarium_common::{Error, Result};

/// Default trailing window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Per-user request budget for write endpoints
pub const WRITE_LIMIT: u32 = 10;
/// Per-IP request budget for the search proxy endpoints
pub const SEARCH_LIMIT: u32 = 60;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the window; -1 when the store was unreachable
    pub remaining: i64,
    /// Epoch milliseconds at which the window frees up
    pub reset_at_ms: i64,
}

/// Sliding-window request counter backed by the service database
#[derive(Clone)]
pub struct RateLimiter {
    db: SqlitePool,
    window: Duration,
}

impl RateLimiter {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            window: DEFAULT_WINDOW,
        }
    }

    /// Override the window length (tests use short windows)
    pub fn with_window(db: SqlitePool, window: Duration) -> Self {
        Self { db, window }
    }

    /// Check and record one request for `key`
    pub async fn check(&self, key: &str, max_requests: u32) -> RateLimitDecision {
        match self.try_check(key, max_requests).await {
            Ok(decision) => decision,
            Err(e) => {
                // Fail open: a storage outage must not block traffic
                tracing::warn!(key = %key, error = %e, "Rate limit check failed; allowing request");
                RateLimitDecision {
                    allowed: true,
                    remaining: -1,
                    reset_at_ms: 0,
                }
            }
        }
    }

    /// Rate limit a public endpoint by client address
    pub async fn check_ip(&self, headers: &HeaderMap, max_requests: u32) -> RateLimitDecision {
        let key = format!("ip:{}", client_ip(headers));
        self.check(&key, max_requests).await
    }

    /// Rate limit an authenticated endpoint by user identity
    pub async fn check_user(&self, user_id: &str, max_requests: u32) -> RateLimitDecision {
        let key = format!("user:{}", user_id);
        self.check(&key, max_requests).await
    }

    /// Drop rows whose entire window has lapsed. Live keys rewrite
    /// their own row on every check, so one startup sweep bounds the
    /// table to active keys.
    pub async fn purge_expired(&self) -> Result<u64> {
        let cutoff = now_ms() - self.window.as_millis() as i64;

        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, timestamps FROM rate_limits")
            .fetch_all(&self.db)
            .await?;

        let mut purged = 0u64;
        for (key, raw) in rows {
            let requests: Vec<i64> = serde_json::from_str(&raw).unwrap_or_default();
            if requests.iter().all(|&t| t <= cutoff) {
                sqlx::query("DELETE FROM rate_limits WHERE key = ?")
                    .bind(&key)
                    .execute(&self.db)
                    .await?;
                purged += 1;
            }
        }

        if purged > 0 {
            tracing::info!(purged, "Purged expired rate limit windows");
        }

        Ok(purged)
    }

    async fn try_check(&self, key: &str, max_requests: u32) -> Result<RateLimitDecision> {
        let now = now_ms();
        let window_ms = self.window.as_millis() as i64;
        let window_start = now - window_ms;

        let stored: Option<(String,)> =
            sqlx::query_as("SELECT timestamps FROM rate_limits WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.db)
                .await?;

        // Keep only requests inside the trailing window
        let mut requests: Vec<i64> = stored
            .and_then(|(raw,)| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        requests.retain(|&t| t > window_start);

        if requests.len() as u32 >= max_requests {
            let oldest = requests.iter().copied().min().unwrap_or(now);
            return Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at_ms: oldest + window_ms,
            });
        }

        requests.push(now);
        let serialized = serde_json::to_string(&requests)
            .map_err(|e| Error::Internal(format!("Failed to serialize window: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO rate_limits (key, timestamps) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET timestamps = excluded.timestamps
            "#,
        )
        .bind(key)
        .bind(&serialized)
        .execute(&self.db)
        .await?;

        Ok(RateLimitDecision {
            allowed: true,
            remaining: max_requests as i64 - requests.len() as i64,
            reset_at_ms: now + window_ms,
        })
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Client address from the forwarded-for chain, falling back to the
/// real-ip header, then a literal "unknown".
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        // First entry is the original client
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
