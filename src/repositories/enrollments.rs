use sqlx::PgPool;

/// Add a student to the course's enrolled set. Idempotent: re-enrolling
/// an existing member is a no-op, not an error. The Ledger's success
/// transitions are the only callers that write here.
pub(crate) async fn enroll(
    pool: &PgPool,
    course_id: &str,
    user_id: &str,
    enrolled_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO enrollments (course_id, user_id, enrolled_at)
         VALUES ($1,$2,$3)
         ON CONFLICT (course_id, user_id) DO NOTHING",
    )
    .bind(course_id)
    .bind(user_id)
    .bind(enrolled_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn is_enrolled(
    pool: &PgPool,
    course_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM enrollments WHERE course_id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub(crate) async fn list_enrolled(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT user_id FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
