use axum::extract::{Query, State};
use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::api::courses::fetch_course;
use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::NotificationType;
use crate::repositories;
use crate::schemas::progress::{
    MarkCompletedRequest, MarkCompletedResponse, ProgressQuery, ProgressResponse,
};
use crate::services::fanout::{self, EventPayload};
use crate::services::progress::completion_reached;

#[cfg(test)]
mod tests;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(get_progress)).route("/complete", post(mark_completed))
}

async fn mark_completed(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<MarkCompletedRequest>,
) -> Result<Json<MarkCompletedResponse>, ApiError> {
    let course = fetch_course(&state, &payload.course_id).await?;

    let enrolled = repositories::enrollments::is_enrolled(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to check enrollment"))?;
    if !enrolled {
        return Err(ApiError::Forbidden("Enrollment required to track progress"));
    }

    let belongs =
        repositories::courses::lecture_belongs_to_course(state.db(), &payload.lecture_id, &course.id)
            .await
            .map_err(|e| ApiError::store(e, "Failed to load lecture"))?;
    if !belongs {
        return Err(ApiError::NotFound("Lecture not found in this course".to_string()));
    }

    let now = primitive_now_utc();
    repositories::progress::ensure_progress_row(state.db(), &user.id, &course.id, now)
        .await
        .map_err(|e| ApiError::store(e, "Failed to initialize progress"))?;

    let newly_completed =
        repositories::progress::mark_completed(state.db(), &user.id, &course.id, &payload.lecture_id, now)
            .await
            .map_err(|e| ApiError::store(e, "Failed to record completion"))?;

    let completed_count = repositories::progress::completed_count(state.db(), &user.id, &course.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to count completions"))?;
    let total_lectures = repositories::courses::total_lectures(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to count lectures"))?;

    let course_completed = completion_reached(completed_count, total_lectures);

    if course_completed {
        // The flag flip succeeds for exactly one caller, so concurrent
        // marks of the final lectures produce a single achievement row.
        let claimed = repositories::progress::claim_completion_notification(
            state.db(),
            &user.id,
            &course.id,
            primitive_now_utc(),
        )
        .await
        .map_err(|e| ApiError::store(e, "Failed to update progress"))?;

        if claimed {
            let _ = fanout::notify(
                state.db(),
                &user.id,
                &EventPayload {
                    ntype: NotificationType::CourseCompleted,
                    title: "Course completed".to_string(),
                    message: format!("Congratulations, you finished \"{}\"", course.title),
                    course_id: Some(course.id.clone()),
                    course_title: Some(course.title.clone()),
                    metadata: serde_json::json!({}),
                },
            )
            .await
            .map_err(|e| tracing::warn!(error = %e, "Completion notice not delivered"));

            tracing::info!(user_id = %user.id, course_id = %course.id, "Course completed");
        }
    }

    Ok(Json(MarkCompletedResponse {
        newly_completed,
        completed_count,
        total_lectures,
        course_completed,
    }))
}

async fn get_progress(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<ProgressResponse>, ApiError> {
    fetch_course(&state, &query.course_id).await?;

    // A student with no completions gets an empty list, not an error.
    let lecture_completed =
        repositories::progress::completed_lectures(state.db(), &user.id, &query.course_id)
            .await
            .map_err(|e| ApiError::store(e, "Failed to load progress"))?;

    Ok(Json(ProgressResponse { course_id: query.course_id, lecture_completed }))
}
