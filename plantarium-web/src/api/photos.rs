//! Photo upload and serving
//!
//! POST /api/plants/upload-photo, GET /api/photos/{key}
//!
//! Uploads are validated for type and size before they reach the
//! store. A stored photo and its catalogue row are written in
//! separate steps with no cross-resource transaction, so a failed row
//! write after a successful upload leaves an orphaned object behind.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use plantarium_common::validate::validate_id;

use crate::error::{ApiError, ApiResult};
use crate::photos::{self, MAX_PHOTO_BYTES};
use crate::AppState;

/// POST /api/plants/upload-photo response
#[derive(Debug, Serialize)]
pub struct UploadPhotoResponse {
    pub success: bool,
    pub photo_url: String,
    pub photo_key: String,
}

/// POST /api/plants/upload-photo
///
/// Multipart form with a `photo` image part and a `plantId` field.
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadPhotoResponse>> {
    let user_id = super::require_user(&state, &headers).await?;
    super::check_write_limit(&state, &user_id).await?;

    let mut photo: Option<(String, Vec<u8>)> = None;
    let mut plant_id_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?;
                photo = Some((content_type, bytes.to_vec()));
            }
            "plantId" => {
                plant_id_raw = field.text().await.ok();
            }
            _ => {}
        }
    }

    let (content_type, bytes) =
        photo.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let plant_id = plant_id_raw
        .as_deref()
        .and_then(validate_id)
        .ok_or_else(|| ApiError::BadRequest("Plant ID required".to_string()))?;

    let extension = photos::extension_for(&content_type).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed.".to_string(),
        )
    })?;

    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(ApiError::BadRequest(
            "File too large. Maximum size is 5MB.".to_string(),
        ));
    }

    let photo_key = state.photos.put(plant_id, extension, &bytes).await?;
    let photo_url = format!("{}/api/photos/{}", state.config.public_base_url, photo_key);

    tracing::info!(
        user = %user_id,
        plant_id,
        key = %photo_key,
        size = bytes.len(),
        "Photo stored"
    );

    Ok(Json(UploadPhotoResponse {
        success: true,
        photo_url,
        photo_key,
    }))
}

/// GET /api/photos/{key}
///
/// Streams a stored photo. Keys are immutable, so responses carry a
/// year-long cache lifetime.
pub async fn serve_photo(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let bytes = state
        .photos
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, photos::content_type_for(&key)),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    )
        .into_response())
}

/// Build photo routes. The upload route gets a raised body limit to
/// fit the photo cap plus multipart framing.
pub fn photo_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plants/upload-photo", post(upload_photo))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + 1024 * 1024))
        .route("/api/photos/:key", get(serve_photo))
}
