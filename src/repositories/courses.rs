use sqlx::PgPool;

use crate::db::models::{Chapter, Course, Lecture};

const COURSE_COLUMNS: &str = "id, title, description, price_cents, discount_percent, \
     educator_id, is_published, created_at, updated_at";

const LECTURE_COLUMNS: &str =
    "id, chapter_id, course_id, title, order_index, duration_minutes, video_url, created_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) price_cents: i64,
    pub(crate) discount_percent: i32,
    pub(crate) educator_id: &'a str,
    pub(crate) is_published: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateCourse {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) price_cents: Option<i64>,
    pub(crate) discount_percent: Option<i32>,
    pub(crate) is_published: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, title, description, price_cents, discount_percent, educator_id,
            is_published, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.price_cents)
    .bind(params.discount_percent)
    .bind(params.educator_id)
    .bind(params.is_published)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            price_cents = COALESCE($3, price_cents),
            discount_percent = COALESCE($4, discount_percent),
            is_published = COALESCE($5, is_published),
            updated_at = $6
         WHERE id = $7
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.price_cents)
    .bind(params.discount_percent)
    .bind(params.is_published)
    .bind(params.updated_at)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateChapter<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) order_index: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_chapter(
    pool: &PgPool,
    params: CreateChapter<'_>,
) -> Result<Chapter, sqlx::Error> {
    sqlx::query_as::<_, Chapter>(
        "INSERT INTO chapters (id, course_id, title, order_index, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING id, course_id, title, order_index, created_at",
    )
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.order_index)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_chapter(
    pool: &PgPool,
    chapter_id: &str,
) -> Result<Option<Chapter>, sqlx::Error> {
    sqlx::query_as::<_, Chapter>(
        "SELECT id, course_id, title, order_index, created_at FROM chapters WHERE id = $1",
    )
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateLecture<'a> {
    pub(crate) id: &'a str,
    pub(crate) chapter_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) order_index: i32,
    pub(crate) duration_minutes: i32,
    pub(crate) video_url: Option<&'a str>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_lecture(
    pool: &PgPool,
    params: CreateLecture<'_>,
) -> Result<Lecture, sqlx::Error> {
    sqlx::query_as::<_, Lecture>(&format!(
        "INSERT INTO lectures (
            id, chapter_id, course_id, title, order_index, duration_minutes,
            video_url, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {LECTURE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.chapter_id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.order_index)
    .bind(params.duration_minutes)
    .bind(params.video_url)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// True when the lecture exists and belongs to the given course.
pub(crate) async fn lecture_belongs_to_course(
    pool: &PgPool,
    lecture_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM lectures WHERE id = $1 AND course_id = $2")
            .bind(lecture_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Total lecture count for the course across every chapter.
pub(crate) async fn total_lectures(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lectures WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
}
