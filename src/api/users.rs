use axum::extract::{Multipart, State};
use axum::{routing::patch, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::AvatarResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me/avatar", patch(upload_avatar))
}

/// Store a new avatar through the asset store. Upload failures never
/// fail the request: the profile falls back to the deterministic
/// placeholder URL instead.
async fn upload_avatar(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| ApiError::BadRequest("Image file is required".to_string()))?;

    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
    if !matches!(content_type.as_str(), "image/jpeg" | "image/jpg" | "image/png") {
        return Err(ApiError::BadRequest(format!("Unsupported image type '{content_type}'")));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?
        .to_vec();

    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;
    if bytes.len() as u64 > max_bytes {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds the {} MB limit",
            state.settings().storage().max_upload_size_mb
        )));
    }

    let placeholder = state.settings().storage().avatar_placeholder_url.clone();
    let (image_url, used_placeholder) = match state.storage() {
        Some(storage) => match storage.upload_avatar(&user.id, &content_type, bytes).await {
            Ok(url) => (url, false),
            Err(err) => {
                tracing::warn!(
                    user_id = %user.id,
                    error = %err,
                    "Avatar upload failed; using placeholder URL"
                );
                (placeholder, true)
            }
        },
        None => (placeholder, true),
    };

    repositories::users::update_image_url(state.db(), &user.id, &image_url, primitive_now_utc())
        .await
        .map_err(|e| ApiError::store(e, "Failed to update avatar"))?;

    Ok(Json(AvatarResponse { image_url, placeholder: used_placeholder }))
}
