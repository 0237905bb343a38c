//! HTTP API handlers
//!
//! Write endpoints run auth, then the per-user rate limit, then
//! validation before touching storage. Public search proxies run the
//! per-IP rate limit and query sanitization before going upstream.

pub mod health;
pub mod photos;
pub mod plants;
pub mod search;

pub use health::health_routes;
pub use photos::photo_routes;
pub use plants::plant_routes;
pub use search::search_routes;

use axum::http::HeaderMap;

use crate::error::{ApiError, ApiResult};
use crate::rate_limit::{SEARCH_LIMIT, WRITE_LIMIT};
use crate::AppState;

/// Resolve the authenticated user or reject the request
pub(crate) async fn require_user(state: &AppState, headers: &HeaderMap) -> ApiResult<String> {
    match state.auth.verify(headers) {
        Ok(Some(user_id)) => Ok(user_id),
        Ok(None) => Err(ApiError::Unauthorized),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// Enforce the per-user write budget
pub(crate) async fn check_write_limit(state: &AppState, user_id: &str) -> ApiResult<()> {
    let decision = state.limiter.check_user(user_id, WRITE_LIMIT).await;
    if decision.allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests)
    }
}

/// Enforce the per-IP search budget
pub(crate) async fn check_search_limit(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let decision = state.limiter.check_ip(headers, SEARCH_LIMIT).await;
    if decision.allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests)
    }
}
