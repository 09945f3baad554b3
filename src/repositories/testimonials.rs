use sqlx::PgPool;

use crate::db::models::{PinnedTestimonial, Testimonial};

const TESTIMONIAL_COLUMNS: &str =
    "id, course_id, user_id, user_name, user_image_url, rating, comment, created_at";

const PINNED_COLUMNS: &str =
    "course_id, order_index, user_id, user_name, user_image_url, rating, comment, pinned_at";

pub(crate) struct CreateTestimonial<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) user_name: &'a str,
    pub(crate) user_image_url: Option<&'a str>,
    pub(crate) rating: i32,
    pub(crate) comment: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateTestimonial<'_>,
) -> Result<Testimonial, sqlx::Error> {
    sqlx::query_as::<_, Testimonial>(&format!(
        "INSERT INTO testimonials (
            id, course_id, user_id, user_name, user_image_url, rating, comment, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {TESTIMONIAL_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.user_id)
    .bind(params.user_name)
    .bind(params.user_image_url)
    .bind(params.rating)
    .bind(params.comment)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Insertion order; pin requests index into this list.
pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Testimonial>, sqlx::Error> {
    sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {TESTIMONIAL_COLUMNS}
         FROM testimonials
         WHERE course_id = $1
         ORDER BY created_at ASC",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_user_course(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM testimonials WHERE user_id = $1 AND course_id = $2",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn upsert_rating(
    pool: &PgPool,
    course_id: &str,
    user_id: &str,
    rating: i32,
    rated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO course_ratings (course_id, user_id, rating, rated_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (course_id, user_id)
         DO UPDATE SET rating = EXCLUDED.rating, rated_at = EXCLUDED.rated_at",
    )
    .bind(course_id)
    .bind(user_id)
    .bind(rating)
    .bind(rated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn find_rating(
    pool: &PgPool,
    course_id: &str,
    user_id: &str,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT rating FROM course_ratings WHERE course_id = $1 AND user_id = $2",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_pinned(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<PinnedTestimonial>, sqlx::Error> {
    sqlx::query_as::<_, PinnedTestimonial>(&format!(
        "SELECT {PINNED_COLUMNS}
         FROM pinned_testimonials
         WHERE course_id = $1
         ORDER BY order_index",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

/// Append a snapshot copy to the pinned list. The copy stays even if the
/// source testimonial is later removed.
pub(crate) async fn pin(
    pool: &PgPool,
    course_id: &str,
    order_index: i32,
    source: &Testimonial,
    pinned_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO pinned_testimonials (
            course_id, order_index, user_id, user_name, user_image_url, rating,
            comment, pinned_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(course_id)
    .bind(order_index)
    .bind(&source.user_id)
    .bind(&source.user_name)
    .bind(&source.user_image_url)
    .bind(source.rating)
    .bind(&source.comment)
    .bind(pinned_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove the pinned entry at `order_index` and compact the indexes of
/// the entries behind it. Returns false when the index does not exist.
pub(crate) async fn unpin(
    pool: &PgPool,
    course_id: &str,
    order_index: i32,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        "DELETE FROM pinned_testimonials WHERE course_id = $1 AND order_index = $2",
    )
    .bind(course_id)
    .bind(order_index)
    .execute(&mut *tx)
    .await?;

    if removed.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE pinned_testimonials
         SET order_index = order_index - 1
         WHERE course_id = $1 AND order_index > $2",
    )
    .bind(course_id)
    .bind(order_index)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}
