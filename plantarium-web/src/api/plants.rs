//! Plant catalogue API handlers
//!
//! POST /api/plants, PUT|PATCH /api/plants/update,
//! GET /api/plants/get, GET /api/plants/list

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use plantarium_common::validate::{
    sanitize_metadata, validate_id, validate_required, validate_string, MAX_METADATA_BYTES,
    MAX_NOTES_LEN, MAX_STRING_LEN, MAX_URL_LEN,
};

use crate::db::plants::{self, InsertedPlant, Plant, PlantInput, PlantListEntry, UpdatedPlant};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/plants response
#[derive(Debug, Serialize)]
pub struct CreatePlantResponse {
    pub success: bool,
    pub plant: InsertedPlant,
}

/// PUT|PATCH /api/plants/update response
#[derive(Debug, Serialize)]
pub struct UpdatePlantResponse {
    pub success: bool,
    pub plant: UpdatedPlant,
}

/// GET /api/plants/get query parameters
#[derive(Debug, Deserialize)]
pub struct GetPlantParams {
    pub id: Option<String>,
}

/// GET /api/plants/get response
#[derive(Debug, Serialize)]
pub struct GetPlantResponse {
    pub plant: Plant,
}

/// GET /api/plants/list response
#[derive(Debug, Serialize)]
pub struct ListPlantsResponse {
    pub plants: Vec<PlantListEntry>,
}

/// POST /api/plants
///
/// Save a plant to the catalogue. Requires authentication and counts
/// against the per-user write budget.
pub async fn create_plant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatePlantResponse>)> {
    let user_id = super::require_user(&state, &headers).await?;
    super::check_write_limit(&state, &user_id).await?;

    let input = validated_input(&body)?;
    let plant = plants::insert_plant(&state.db, &input).await?;

    tracing::info!(
        user = %user_id,
        plant_id = plant.id,
        scientific_name = %plant.scientific_name,
        "Plant added"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePlantResponse {
            success: true,
            plant,
        }),
    ))
}

/// PUT|PATCH /api/plants/update
///
/// Rewrite an existing catalogue entry. The body carries the full
/// field set plus the row id.
pub async fn update_plant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<Json<UpdatePlantResponse>> {
    let user_id = super::require_user(&state, &headers).await?;
    super::check_write_limit(&state, &user_id).await?;

    let id = match body.get("id") {
        None | Some(Value::Null) => {
            return Err(ApiError::BadRequest("Plant ID required".to_string()))
        }
        Some(value) => value
            .as_i64()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::BadRequest("Invalid plant ID".to_string()))?,
    };

    let input = validated_input(&body)?;
    let plant = plants::update_plant(&state.db, id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plant".to_string()))?;

    tracing::info!(user = %user_id, plant_id = id, "Plant updated");

    Ok(Json(UpdatePlantResponse {
        success: true,
        plant,
    }))
}

/// GET /api/plants/get?id=
pub async fn get_plant(
    State(state): State<AppState>,
    Query(params): Query<GetPlantParams>,
) -> ApiResult<Json<GetPlantResponse>> {
    let raw = params
        .id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Plant ID required".to_string()))?;
    let id =
        validate_id(raw).ok_or_else(|| ApiError::BadRequest("Invalid plant ID".to_string()))?;

    let plant = plants::get_plant(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plant".to_string()))?;

    Ok(Json(GetPlantResponse { plant }))
}

/// GET /api/plants/list
pub async fn list_plants(State(state): State<AppState>) -> ApiResult<Json<ListPlantsResponse>> {
    let plants = plants::list_plants(&state.db).await?;
    Ok(Json(ListPlantsResponse { plants }))
}

/// Validate the request body into column values. Strings are trimmed
/// and capped, metadata is round-trip sanitized, and anything that
/// fails validation becomes a client-facing 400.
fn validated_input(body: &Value) -> ApiResult<PlantInput> {
    let required = validate_required(body, &["scientific_name"]);
    if !required.valid {
        return Err(ApiError::BadRequest(format!(
            "Missing required fields: {}",
            required.missing.join(", ")
        )));
    }

    // Guaranteed present by the required-field check; still validated
    // for emptiness after trimming
    let scientific_name = body
        .get("scientific_name")
        .and_then(Value::as_str)
        .and_then(|raw| validate_string(raw, MAX_STRING_LEN))
        .ok_or_else(|| ApiError::BadRequest("scientific_name is required".to_string()))?;

    let metadata = match body.get("metadata") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            sanitize_metadata(raw, MAX_METADATA_BYTES)
                .ok_or_else(|| ApiError::BadRequest("Invalid metadata".to_string()))?,
        ),
    };

    let synonyms = body.get("synonyms").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|raw| validate_string(raw, MAX_STRING_LEN))
            .collect::<Vec<String>>()
    });

    Ok(PlantInput {
        scientific_name,
        common_name: string_field(body, "common_name", MAX_STRING_LEN),
        family: string_field(body, "family", MAX_STRING_LEN),
        family_common_name: string_field(body, "family_common_name", MAX_STRING_LEN),
        genus: string_field(body, "genus", MAX_STRING_LEN),
        image_url: string_field(body, "image_url", MAX_URL_LEN),
        author: string_field(body, "author", MAX_STRING_LEN),
        bibliography: string_field(body, "bibliography", MAX_STRING_LEN),
        year: body
            .get("year")
            .and_then(Value::as_i64)
            .and_then(|year| i32::try_from(year).ok()),
        synonyms: synonyms.filter(|list| !list.is_empty()),
        slug: string_field(body, "slug", MAX_STRING_LEN),
        trefle_id: id_field(body, "trefle_id"),
        perenual_id: id_field(body, "perenual_id"),
        metadata,
        notes: string_field(body, "notes", MAX_NOTES_LEN),
        nickname: string_field(body, "nickname", MAX_STRING_LEN),
        location: string_field(body, "location", MAX_STRING_LEN),
        acquired_date: string_field(body, "acquired_date", MAX_STRING_LEN),
        status: string_field(body, "status", MAX_STRING_LEN),
    })
}

fn string_field(body: &Value, field: &str, max_len: usize) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| validate_string(raw, max_len))
}

fn id_field(body: &Value, field: &str) -> Option<i64> {
    body.get(field).and_then(Value::as_i64).filter(|id| *id > 0)
}

/// Build plant catalogue routes
pub fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plants", post(create_plant))
        .route("/api/plants/update", put(update_plant).patch(update_plant))
        .route("/api/plants/get", get(get_plant))
        .route("/api/plants/list", get(list_plants))
}
