use sqlx::PgPool;

/// Record a lecture completion. The composite primary key plus
/// ON CONFLICT makes this an atomic set-add: duplicate marks are no-ops
/// and concurrent marks for the same pair never lose writes. Returns
/// whether a new row was inserted.
pub(crate) async fn mark_completed(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    lecture_id: &str,
    completed_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO lecture_completions (user_id, course_id, lecture_id, completed_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (user_id, course_id, lecture_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(lecture_id)
    .bind(completed_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn completed_lectures(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT lecture_id FROM lecture_completions
         WHERE user_id = $1 AND course_id = $2
         ORDER BY completed_at",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn completed_count(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM lecture_completions WHERE user_id = $1 AND course_id = $2",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn ensure_progress_row(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO course_progress (user_id, course_id, completed_notified, updated_at)
         VALUES ($1,$2,FALSE,$3)
         ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Flip the completion-notified flag false→true. Returns true only for
/// the call that performed the flip, so the completion crossing emits
/// exactly one notification even under concurrent marks.
pub(crate) async fn claim_completion_notification(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE course_progress
         SET completed_notified = TRUE, updated_at = $1
         WHERE user_id = $2 AND course_id = $3 AND NOT completed_notified",
    )
    .bind(updated_at)
    .bind(user_id)
    .bind(course_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
