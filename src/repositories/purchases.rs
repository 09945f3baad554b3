use sqlx::PgPool;

use crate::db::models::Purchase;
use crate::db::types::{CardPaymentStatus, ManualPaymentStatus, PaymentMethod};

const PURCHASE_COLUMNS: &str = "id, course_id, user_id, amount_cents, payment_method, \
     card_status, manual_status, contact_email, contact_phone, location, payment_channel, \
     proof_reference, reviewed_by, reviewed_at, created_at, updated_at";

pub(crate) struct CreateManualPurchase<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) amount_cents: i64,
    pub(crate) contact_email: &'a str,
    pub(crate) contact_phone: &'a str,
    pub(crate) location: &'a str,
    pub(crate) payment_channel: &'a str,
    pub(crate) proof_reference: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_manual(
    pool: &PgPool,
    params: CreateManualPurchase<'_>,
) -> Result<Purchase, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(&format!(
        "INSERT INTO purchases (
            id, course_id, user_id, amount_cents, payment_method, manual_status,
            contact_email, contact_phone, location, payment_channel, proof_reference,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$12)
         RETURNING {PURCHASE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.user_id)
    .bind(params.amount_cents)
    .bind(PaymentMethod::Manual)
    .bind(ManualPaymentStatus::Pending)
    .bind(params.contact_email)
    .bind(params.contact_phone)
    .bind(params.location)
    .bind(params.payment_channel)
    .bind(params.proof_reference)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn create_card(
    pool: &PgPool,
    id: &str,
    course_id: &str,
    user_id: &str,
    amount_cents: i64,
    created_at: time::PrimitiveDateTime,
) -> Result<Purchase, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(&format!(
        "INSERT INTO purchases (
            id, course_id, user_id, amount_cents, payment_method, card_status,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
         RETURNING {PURCHASE_COLUMNS}",
    ))
    .bind(id)
    .bind(course_id)
    .bind(user_id)
    .bind(amount_cents)
    .bind(PaymentMethod::Card)
    .bind(CardPaymentStatus::Pending)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    purchase_id: &str,
) -> Result<Option<Purchase>, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(&format!(
        "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1",
    ))
    .bind(purchase_id)
    .fetch_optional(pool)
    .await
}

/// Compare-and-swap review of a pending manual purchase. Returns the
/// updated row, or `None` when the purchase is not currently `pending`
/// (already reviewed, or not a manual purchase); the caller maps that
/// to a conflict. A single guarded UPDATE keeps concurrent reviewers
/// mutually exclusive without a transaction.
pub(crate) async fn review_manual(
    pool: &PgPool,
    purchase_id: &str,
    decision: ManualPaymentStatus,
    reviewer_id: &str,
    reviewed_at: time::PrimitiveDateTime,
) -> Result<Option<Purchase>, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(&format!(
        "UPDATE purchases
         SET manual_status = $1, reviewed_by = $2, reviewed_at = $3, updated_at = $3
         WHERE id = $4 AND manual_status = $5
         RETURNING {PURCHASE_COLUMNS}",
    ))
    .bind(decision)
    .bind(reviewer_id)
    .bind(reviewed_at)
    .bind(purchase_id)
    .bind(ManualPaymentStatus::Pending)
    .fetch_optional(pool)
    .await
}

/// Same CAS shape for the card path: only a pending card purchase can be
/// settled by the provider callback.
pub(crate) async fn settle_card(
    pool: &PgPool,
    purchase_id: &str,
    outcome: CardPaymentStatus,
    settled_at: time::PrimitiveDateTime,
) -> Result<Option<Purchase>, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(&format!(
        "UPDATE purchases
         SET card_status = $1, updated_at = $2
         WHERE id = $3 AND card_status = $4
         RETURNING {PURCHASE_COLUMNS}",
    ))
    .bind(outcome)
    .bind(settled_at)
    .bind(purchase_id)
    .bind(CardPaymentStatus::Pending)
    .fetch_optional(pool)
    .await
}
