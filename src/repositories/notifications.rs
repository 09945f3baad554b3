use sqlx::PgPool;

use crate::db::models::Notification;
use crate::db::types::NotificationType;

const NOTIFICATION_COLUMNS: &str = "id, user_id, ntype, title, message, course_id, \
     course_title, is_read, metadata, created_at";

pub(crate) struct CreateNotification<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) ntype: NotificationType,
    pub(crate) title: &'a str,
    pub(crate) message: &'a str,
    pub(crate) course_id: Option<&'a str>,
    pub(crate) course_title: Option<&'a str>,
    pub(crate) metadata: serde_json::Value,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateNotification<'_>,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (
            id, user_id, ntype, title, message, course_id, course_title,
            is_read, metadata, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,FALSE,$8,$9)
         RETURNING {NOTIFICATION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.ntype)
    .bind(params.title)
    .bind(params.message)
    .bind(params.course_id)
    .bind(params.course_title)
    .bind(params.metadata)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct NotificationFilter {
    pub(crate) ntype: Option<NotificationType>,
    pub(crate) is_read: Option<bool>,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

/// Page of the caller's notifications, newest first, plus the filtered
/// total for page-count math.
pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
    filter: &NotificationFilter,
) -> Result<(Vec<Notification>, i64), sqlx::Error> {
    let items = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS}
         FROM notifications
         WHERE user_id = $1
           AND ($2::notificationtype IS NULL OR ntype = $2)
           AND ($3::boolean IS NULL OR is_read = $3)
         ORDER BY created_at DESC
         OFFSET $4 LIMIT $5",
    ))
    .bind(user_id)
    .bind(filter.ntype)
    .bind(filter.is_read)
    .bind(filter.skip)
    .bind(filter.limit)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM notifications
         WHERE user_id = $1
           AND ($2::notificationtype IS NULL OR ntype = $2)
           AND ($3::boolean IS NULL OR is_read = $3)",
    )
    .bind(user_id)
    .bind(filter.ntype)
    .bind(filter.is_read)
    .fetch_one(pool)
    .await?;

    Ok((items, total))
}

pub(crate) async fn unread_count(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Ownership is part of the predicate: marking another user's row
/// reports not-found rather than forbidden.
pub(crate) async fn mark_read(
    pool: &PgPool,
    notification_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn mark_all_read(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete(
    pool: &PgPool,
    notification_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
