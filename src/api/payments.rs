use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{routing::post, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::courses::fetch_course;
use crate::api::errors::ApiError;
use crate::api::guards::{require_reviewer, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Purchase;
use crate::db::types::NotificationType;
use crate::repositories;
use crate::schemas::payment::{
    CheckoutRequest, CheckoutResponse, ManualPaymentRequest, PurchaseResponse,
    ReviewPaymentRequest, WebhookEvent,
};
use crate::services::fanout::{self, EventPayload};
use crate::services::payments::{review_transition, TransitionError};
use crate::services::{checkout, pricing};

#[cfg(test)]
mod tests;

const SIGNATURE_HEADER: &str = "x-webhook-signature";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/manual", post(submit_manual))
        .route("/:purchase_id/review", post(review_manual))
        .route("/checkout", post(start_checkout))
        .route("/webhook", post(provider_webhook))
}

async fn submit_manual(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ManualPaymentRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = fetch_course(&state, &payload.course_id).await?;

    let enrolled = repositories::enrollments::is_enrolled(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to check enrollment"))?;
    if enrolled {
        return Err(ApiError::Conflict("Already enrolled in this course".to_string()));
    }

    // Amount is fixed at submission time; later discount edits do not
    // reprice a pending purchase.
    let amount_cents = pricing::final_amount_cents(course.price_cents, course.discount_percent);

    let purchase = repositories::purchases::create_manual(
        state.db(),
        repositories::purchases::CreateManualPurchase {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            user_id: &user.id,
            amount_cents,
            contact_email: payload.contact_email.trim(),
            contact_phone: payload.contact_phone.trim(),
            location: payload.location.trim(),
            payment_channel: payload.payment_channel.trim(),
            proof_reference: payload.proof_reference.trim(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to record manual payment"))?;

    tracing::info!(
        purchase_id = %purchase.id,
        course_id = %course.id,
        amount_cents,
        "Manual payment submitted for review"
    );

    Ok((StatusCode::CREATED, Json(PurchaseResponse::from_db(purchase))))
}

async fn review_manual(
    Path(purchase_id): Path<String>,
    CurrentUser(reviewer): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ReviewPaymentRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let purchase = repositories::purchases::find_by_id(state.db(), &purchase_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to load purchase"))?
        .ok_or_else(|| ApiError::NotFound("Purchase not found".to_string()))?;

    let course = fetch_course(&state, &purchase.course_id).await?;
    require_reviewer(&reviewer, &course.educator_id)?;

    let updated = repositories::purchases::review_manual(
        state.db(),
        &purchase_id,
        payload.decision.target_status(),
        &reviewer.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to review purchase"))?;

    let Some(updated) = updated else {
        // Lost the race or the purchase was never reviewable; re-read
        // and classify.
        let current = repositories::purchases::find_by_id(state.db(), &purchase_id)
            .await
            .map_err(|e| ApiError::store(e, "Failed to load purchase"))?
            .ok_or_else(|| ApiError::NotFound("Purchase not found".to_string()))?;

        return match review_transition(current.manual_status, payload.decision) {
            Err(TransitionError::NotManual) => {
                Err(ApiError::BadRequest("Purchase is not a manual payment".to_string()))
            }
            Err(TransitionError::AlreadyTerminal(_)) | Ok(_) => {
                Err(ApiError::Conflict("Purchase has already been reviewed".to_string()))
            }
        };
    };

    if payload.decision.target_status() == crate::db::types::ManualPaymentStatus::Verified {
        grant_enrollment(&state, &updated, &course.title).await?;
    } else {
        tracing::info!(purchase_id = %purchase_id, "Manual payment rejected");
    }

    Ok(Json(PurchaseResponse::from_db(updated)))
}

async fn start_checkout(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let Some(client) = state.checkout() else {
        return Err(ApiError::ServiceUnavailable(
            "Card payments are not configured".to_string(),
        ));
    };

    let course = fetch_course(&state, &payload.course_id).await?;

    let enrolled = repositories::enrollments::is_enrolled(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to check enrollment"))?;
    if enrolled {
        return Err(ApiError::Conflict("Already enrolled in this course".to_string()));
    }

    let amount_cents = pricing::final_amount_cents(course.price_cents, course.discount_percent);

    let purchase = repositories::purchases::create_card(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course.id,
        &user.id,
        amount_cents,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to record card payment"))?;

    let checkout_url = client
        .create_session(&purchase.id, amount_cents, &course.title)
        .await
        .map_err(|e| {
            tracing::error!(purchase_id = %purchase.id, error = %e, "Checkout session failed");
            ApiError::ServiceUnavailable("Payment provider is unavailable".to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse { purchase_id: purchase.id, checkout_url }),
    ))
}

async fn provider_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Missing webhook signature"))?;

    let secret = &state.settings().payments().webhook_secret;
    if !checkout::verify_webhook_signature(secret, &body, provided) {
        return Err(ApiError::Unauthorized("Invalid webhook signature"));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    let settled = repositories::purchases::settle_card(
        state.db(),
        &event.reference,
        event.outcome.target_status(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to settle card payment"))?;

    let Some(purchase) = settled else {
        // Unknown reference, a replayed event, or a purchase that was
        // not in the pending card state. The provider treats 200 as
        // acknowledged, so replays stay silent.
        tracing::info!(reference = %event.reference, "Webhook ignored, no pending card purchase");
        return Ok(StatusCode::OK);
    };

    let course = fetch_course(&state, &purchase.course_id).await?;

    if event.outcome.grants_enrollment() {
        grant_enrollment(&state, &purchase, &course.title).await?;
    } else {
        let _ = fanout::notify(
            state.db(),
            &purchase.user_id,
            &EventPayload {
                ntype: NotificationType::PaymentFailed,
                title: "Payment failed".to_string(),
                message: format!("Your card payment for \"{}\" did not go through", course.title),
                course_id: Some(course.id.clone()),
                course_title: Some(course.title.clone()),
                metadata: serde_json::json!({ "purchase_id": purchase.id }),
            },
        )
        .await
        .map_err(|e| tracing::warn!(error = %e, "Payment-failed notice not delivered"));
    }

    Ok(StatusCode::OK)
}

/// Successful payment side effects shared by the manual and card paths:
/// idempotent enrollment followed by a best-effort success notice.
async fn grant_enrollment(
    state: &AppState,
    purchase: &Purchase,
    course_title: &str,
) -> Result<(), ApiError> {
    repositories::enrollments::enroll(
        state.db(),
        &purchase.course_id,
        &purchase.user_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to enroll student"))?;

    let _ = fanout::notify(
        state.db(),
        &purchase.user_id,
        &EventPayload {
            ntype: NotificationType::PaymentSuccess,
            title: "Payment confirmed".to_string(),
            message: format!("You are now enrolled in \"{course_title}\""),
            course_id: Some(purchase.course_id.clone()),
            course_title: Some(course_title.to_string()),
            metadata: serde_json::json!({ "purchase_id": purchase.id }),
        },
    )
    .await
    .map_err(|e| tracing::warn!(error = %e, "Payment-success notice not delivered"));

    tracing::info!(
        purchase_id = %purchase.id,
        course_id = %purchase.course_id,
        user_id = %purchase.user_id,
        "Enrollment granted"
    );

    Ok(())
}
