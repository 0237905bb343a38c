//! Search proxy API handlers
//!
//! GET /api/trefle, GET /api/perenual, GET /api/perenual-care
//!
//! Queries are sanitized before being forwarded upstream. Upstream
//! failures surface as generic server errors; no provider payload or
//! key detail reaches the client.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use plantarium_common::records::{CareGuide, PlantRecord};
use plantarium_common::validate::{validate_id, validate_search_query, MAX_QUERY_LEN};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Normalized search response, identical for both sources
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<PlantRecord>,
}

/// Care-guide query parameters
#[derive(Debug, Deserialize)]
pub struct CareParams {
    pub species_id: Option<String>,
}

/// GET /api/perenual-care response
#[derive(Debug, Serialize)]
pub struct CareResponse {
    pub care_guide: Option<CareGuide>,
}

/// GET /api/trefle?q=
pub async fn trefle_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    super::check_search_limit(&state, &headers).await?;

    let query = validate_search_query(params.q.as_deref(), MAX_QUERY_LEN);
    let data = state
        .trefle
        .search(&query)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(SearchResponse { data }))
}

/// GET /api/perenual?q=
pub async fn perenual_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    super::check_search_limit(&state, &headers).await?;

    let query = validate_search_query(params.q.as_deref(), MAX_QUERY_LEN);
    let data = state
        .perenual
        .search(&query)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(SearchResponse { data }))
}

/// GET /api/perenual-care?species_id=
pub async fn perenual_care(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CareParams>,
) -> ApiResult<Json<CareResponse>> {
    super::check_search_limit(&state, &headers).await?;

    let raw = params
        .species_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("species_id parameter required".to_string()))?;
    let species_id = validate_id(raw)
        .ok_or_else(|| ApiError::BadRequest("Invalid species_id".to_string()))?;

    let care_guide = state
        .perenual
        .fetch_care_guide(species_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(CareResponse { care_guide }))
}

/// Build search proxy routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/trefle", get(trefle_search))
        .route("/api/perenual", get(perenual_search))
        .route("/api/perenual-care", get(perenual_care))
}
