use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{
    routing::{delete, get, patch},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::{resolve_window, total_pages, PaginatedResponse};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::notification::{
    MarkAllReadResponse, NotificationListQuery, NotificationResponse, UnreadCountResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", patch(mark_all_read))
        .route("/:notification_id/read", patch(mark_read))
        .route("/:notification_id", delete(delete_notification))
}

async fn list_notifications(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<PaginatedResponse<NotificationResponse>>, ApiError> {
    let window = resolve_window(query.page, query.page_size, state.settings());

    let filter = repositories::notifications::NotificationFilter {
        ntype: query.ntype,
        is_read: query.is_read,
        skip: window.skip,
        limit: window.limit,
    };

    let (items, total) = repositories::notifications::list_for_user(state.db(), &user.id, &filter)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list notifications"))?;

    Ok(Json(PaginatedResponse {
        items: items.into_iter().map(NotificationResponse::from_db).collect(),
        total,
        page: window.page,
        total_pages: total_pages(total, window.page_size),
    }))
}

async fn unread_count(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = repositories::notifications::unread_count(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to count unread notifications"))?;
    Ok(Json(UnreadCountResponse { unread }))
}

async fn mark_read(
    Path(notification_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let updated = repositories::notifications::mark_read(state.db(), &notification_id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to mark notification read"))?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Notification not found".to_string()))
    }
}

async fn mark_all_read(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let marked = repositories::notifications::mark_all_read(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to mark notifications read"))?;
    Ok(Json(MarkAllReadResponse { marked }))
}

async fn delete_notification(
    Path(notification_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let removed = repositories::notifications::delete(state.db(), &notification_id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to delete notification"))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Notification not found".to_string()))
    }
}
