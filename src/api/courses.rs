use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_author, CurrentEducator, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Course;
use crate::db::types::NotificationType;
use crate::repositories;
use crate::schemas::course::{
    ChapterCreate, ChapterResponse, CourseCreate, CourseResponse, CourseUpdate,
    EnrolledStudentsResponse, LectureCreate, LectureResponse, RateCourseRequest,
};
use crate::services::fanout::{self, EventPayload};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course))
        .route("/:course_id", get(get_course).patch(update_course))
        .route("/:course_id/chapters", post(add_chapter))
        .route("/:course_id/chapters/:chapter_id/lectures", post(add_lecture))
        .route("/:course_id/students", get(list_students))
        .route("/:course_id/rate", post(rate_course))
}

async fn create_course(
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            price_cents: payload.price_cents,
            discount_percent: payload.discount_percent,
            educator_id: &educator.id,
            is_published: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to create course"))?;

    // Announce to the whole user base; best-effort, never blocks the
    // course from being created.
    let report = fanout::broadcast_to_all(
        state.db(),
        EventPayload {
            ntype: NotificationType::NewCourse,
            title: "New course available".to_string(),
            message: format!("\"{}\" has just been published", course.title),
            course_id: Some(course.id.clone()),
            course_title: Some(course.title.clone()),
            metadata: serde_json::json!({}),
        },
        state.settings().engagement().fanout_concurrency as usize,
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to resolve broadcast audience"))?;

    tracing::info!(
        course_id = %course.id,
        attempted = report.attempted,
        delivered = report.delivered,
        failed = report.failed,
        "New-course announcement fanned out"
    );

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn get_course(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = fetch_course(&state, &course_id).await?;
    Ok(Json(CourseResponse::from_db(course)))
}

async fn update_course(
    Path(course_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = fetch_course(&state, &course_id).await?;
    require_course_author(&educator, &course.educator_id)?;

    if let Some(discount) = payload.discount_percent {
        if !(0..=100).contains(&discount) {
            return Err(ApiError::BadRequest("Discount must be between 0 and 100".to_string()));
        }
    }
    if payload.price_cents.is_some_and(|price| price < 0) {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }

    let updated = repositories::courses::update(
        state.db(),
        &course_id,
        repositories::courses::UpdateCourse {
            title: payload.title,
            description: payload.description,
            price_cents: payload.price_cents,
            discount_percent: payload.discount_percent,
            is_published: payload.is_published,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to update course"))?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let report = fanout::broadcast_to_enrolled(
        state.db(),
        &course_id,
        EventPayload {
            ntype: NotificationType::CourseUpdate,
            title: "Course updated".to_string(),
            message: format!("\"{}\" has been updated", updated.title),
            course_id: Some(updated.id.clone()),
            course_title: Some(updated.title.clone()),
            metadata: serde_json::json!({}),
        },
        state.settings().engagement().fanout_concurrency as usize,
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to resolve broadcast audience"))?;

    tracing::info!(
        course_id = %course_id,
        delivered = report.delivered,
        failed = report.failed,
        "Course-update notice fanned out"
    );

    Ok(Json(CourseResponse::from_db(updated)))
}

async fn add_chapter(
    Path(course_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<ChapterCreate>,
) -> Result<(StatusCode, Json<ChapterResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = fetch_course(&state, &course_id).await?;
    require_course_author(&educator, &course.educator_id)?;

    let chapter = repositories::courses::create_chapter(
        state.db(),
        repositories::courses::CreateChapter {
            id: &Uuid::new_v4().to_string(),
            course_id: &course_id,
            title: payload.title.trim(),
            order_index: payload.order_index,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to create chapter"))?;

    Ok((StatusCode::CREATED, Json(ChapterResponse::from_db(chapter))))
}

async fn add_lecture(
    Path((course_id, chapter_id)): Path<(String, String)>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
    Json(payload): Json<LectureCreate>,
) -> Result<(StatusCode, Json<LectureResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = fetch_course(&state, &course_id).await?;
    require_course_author(&educator, &course.educator_id)?;

    let chapter = repositories::courses::find_chapter(state.db(), &chapter_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to load chapter"))?
        .ok_or_else(|| ApiError::NotFound("Chapter not found".to_string()))?;

    if chapter.course_id != course_id {
        return Err(ApiError::NotFound("Chapter not found".to_string()));
    }

    let lecture = repositories::courses::create_lecture(
        state.db(),
        repositories::courses::CreateLecture {
            id: &Uuid::new_v4().to_string(),
            chapter_id: &chapter_id,
            course_id: &course_id,
            title: payload.title.trim(),
            order_index: payload.order_index,
            duration_minutes: payload.duration_minutes,
            video_url: payload.video_url.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to create lecture"))?;

    let report = fanout::broadcast_to_enrolled(
        state.db(),
        &course_id,
        EventPayload {
            ntype: NotificationType::NewLecture,
            title: "New lecture".to_string(),
            message: format!("\"{}\" was added to \"{}\"", lecture.title, course.title),
            course_id: Some(course.id.clone()),
            course_title: Some(course.title.clone()),
            metadata: serde_json::json!({ "lecture_id": lecture.id }),
        },
        state.settings().engagement().fanout_concurrency as usize,
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to resolve broadcast audience"))?;

    tracing::info!(
        course_id = %course_id,
        lecture_id = %lecture.id,
        delivered = report.delivered,
        failed = report.failed,
        "New-lecture notice fanned out"
    );

    Ok((StatusCode::CREATED, Json(LectureResponse::from_db(lecture))))
}

async fn list_students(
    Path(course_id): Path<String>,
    CurrentEducator(educator): CurrentEducator,
    State(state): State<AppState>,
) -> Result<Json<EnrolledStudentsResponse>, ApiError> {
    let course = fetch_course(&state, &course_id).await?;
    require_course_author(&educator, &course.educator_id)?;

    let students = repositories::enrollments::list_enrolled(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to list enrolled students"))?;

    Ok(Json(EnrolledStudentsResponse { course_id, students }))
}

async fn rate_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<RateCourseRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    fetch_course(&state, &course_id).await?;

    let enrolled = repositories::enrollments::is_enrolled(state.db(), &course_id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to check enrollment"))?;
    if !enrolled {
        return Err(ApiError::UnprocessableEntity(
            "Only enrolled students can rate a course".to_string(),
        ));
    }

    repositories::testimonials::upsert_rating(
        state.db(),
        &course_id,
        &user.id,
        payload.rating,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to store rating"))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn fetch_course(state: &AppState, course_id: &str) -> Result<Course, ApiError> {
    repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}
