use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::courses::fetch_course;
use crate::api::errors::ApiError;
use crate::api::guards::{require_reviewer, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::testimonial::{
    PinRequest, PinnedTestimonialResponse, TestimonialCreate, TestimonialResponse,
};
use crate::services::content_policy::WordListPolicy;
use crate::services::testimonials::{
    validate_pin, validate_submission, PinRejection, SubmissionContext, TestimonialRejection,
};

#[cfg(test)]
mod tests;

#[derive(Debug, serde::Deserialize)]
pub(crate) struct CourseQuery {
    pub(crate) course_id: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_testimonials).post(submit_testimonial))
        .route("/pinned", get(list_pinned))
        .route("/pin", post(pin_testimonial))
        .route("/unpin", post(unpin_testimonial))
}

async fn list_testimonials(
    Query(query): Query<CourseQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TestimonialResponse>>, ApiError> {
    fetch_course(&state, &query.course_id).await?;

    let items = repositories::testimonials::list_for_course(state.db(), &query.course_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list testimonials"))?;

    Ok(Json(items.into_iter().map(TestimonialResponse::from_db).collect()))
}

async fn list_pinned(
    Query(query): Query<CourseQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PinnedTestimonialResponse>>, ApiError> {
    fetch_course(&state, &query.course_id).await?;

    let pinned = repositories::testimonials::list_pinned(state.db(), &query.course_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list pinned testimonials"))?;

    Ok(Json(pinned.into_iter().map(PinnedTestimonialResponse::from_db).collect()))
}

async fn submit_testimonial(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TestimonialCreate>,
) -> Result<(StatusCode, Json<TestimonialResponse>), ApiError> {
    let course = fetch_course(&state, &payload.course_id).await?;
    let comment = payload.comment.trim();

    let enrolled = repositories::enrollments::is_enrolled(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to check enrollment"))?;
    let rating = repositories::testimonials::find_rating(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to load rating"))?;
    let existing_count =
        repositories::testimonials::count_for_user_course(state.db(), &user.id, &course.id)
            .await
            .map_err(|e| ApiError::store(e, "Failed to count testimonials"))?;

    let ctx = SubmissionContext { enrolled, rating, existing_count, comment };
    validate_submission(&ctx, &WordListPolicy).map_err(reject_submission)?;

    // The author's name and avatar are copied onto the row; later
    // profile edits leave published testimonials as they were.
    let testimonial = repositories::testimonials::create(
        state.db(),
        repositories::testimonials::CreateTestimonial {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            user_id: &user.id,
            user_name: &user.full_name,
            user_image_url: user.image_url.as_deref(),
            rating: rating.unwrap_or_default(),
            comment,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to store testimonial"))?;

    Ok((StatusCode::CREATED, Json(TestimonialResponse::from_db(testimonial))))
}

async fn pin_testimonial(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PinRequest>,
) -> Result<(StatusCode, Json<PinnedTestimonialResponse>), ApiError> {
    let course = fetch_course(&state, &payload.course_id).await?;
    require_reviewer(&user, &course.educator_id)?;

    let testimonials = repositories::testimonials::list_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list testimonials"))?;
    let pinned = repositories::testimonials::list_pinned(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list pinned testimonials"))?;

    let candidate = testimonials.get(payload.index);
    let snapshot: Vec<(String, String)> =
        pinned.iter().map(|p| (p.user_id.clone(), p.comment.clone())).collect();

    validate_pin(
        payload.index,
        testimonials.len(),
        &snapshot,
        candidate.map(|t| (t.user_id.as_str(), t.comment.as_str())).unwrap_or(("", "")),
    )
    .map_err(reject_pin)?;

    // validate_pin guarantees the index is in range here.
    let source = candidate.ok_or_else(|| {
        ApiError::Internal("Testimonial index resolved out of range".to_string())
    })?;

    let order_index = pinned.iter().map(|p| p.order_index + 1).max().unwrap_or(0);
    let pinned_at = primitive_now_utc();

    repositories::testimonials::pin(state.db(), &course.id, order_index, source, pinned_at)
        .await
        .map_err(|e| ApiError::store(e, "Failed to pin testimonial"))?;

    Ok((
        StatusCode::CREATED,
        Json(PinnedTestimonialResponse {
            order_index,
            user_id: source.user_id.clone(),
            user_name: source.user_name.clone(),
            user_image_url: source.user_image_url.clone(),
            rating: source.rating,
            comment: source.comment.clone(),
            pinned_at: crate::core::time::format_primitive(pinned_at),
        }),
    ))
}

async fn unpin_testimonial(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PinRequest>,
) -> Result<StatusCode, ApiError> {
    let course = fetch_course(&state, &payload.course_id).await?;
    require_reviewer(&user, &course.educator_id)?;

    let index = i32::try_from(payload.index)
        .map_err(|_| ApiError::BadRequest("Index out of range".to_string()))?;

    let removed = repositories::testimonials::unpin(state.db(), &course.id, index)
        .await
        .map_err(|e| ApiError::store(e, "Failed to unpin testimonial"))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("No pinned testimonial at that position".to_string()))
    }
}

fn reject_submission(rejection: TestimonialRejection) -> ApiError {
    match rejection {
        TestimonialRejection::CommentTooShort | TestimonialRejection::CommentTooLong => {
            ApiError::BadRequest(rejection.to_string())
        }
        other => ApiError::UnprocessableEntity(other.to_string()),
    }
}

fn reject_pin(rejection: PinRejection) -> ApiError {
    match rejection {
        PinRejection::SourceIndexOutOfRange(_) => ApiError::NotFound(rejection.to_string()),
        PinRejection::PinnedFull | PinRejection::AlreadyPinned => {
            ApiError::Conflict(rejection.to_string())
        }
    }
}
