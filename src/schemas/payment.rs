use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Purchase;
use crate::db::types::{CardPaymentStatus, ManualPaymentStatus, PaymentMethod};
use crate::services::payments::{ReviewDecision, WebhookOutcome};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ManualPaymentRequest {
    pub(crate) course_id: String,
    #[validate(email)]
    pub(crate) contact_email: String,
    #[validate(length(min = 5, max = 32))]
    pub(crate) contact_phone: String,
    #[validate(length(min = 1, max = 120))]
    pub(crate) location: String,
    #[validate(length(min = 1, max = 60))]
    pub(crate) payment_channel: String,
    #[validate(length(min = 1, max = 120))]
    pub(crate) proof_reference: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewPaymentRequest {
    pub(crate) decision: ReviewDecision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutRequest {
    pub(crate) course_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutResponse {
    pub(crate) purchase_id: String,
    pub(crate) checkout_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookEvent {
    pub(crate) reference: String,
    pub(crate) outcome: WebhookOutcome,
}

#[derive(Debug, Serialize)]
pub(crate) struct PurchaseResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) user_id: String,
    pub(crate) amount_cents: i64,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) card_status: Option<CardPaymentStatus>,
    pub(crate) manual_status: Option<ManualPaymentStatus>,
    pub(crate) created_at: String,
}

impl PurchaseResponse {
    pub(crate) fn from_db(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            course_id: purchase.course_id,
            user_id: purchase.user_id,
            amount_cents: purchase.amount_cents,
            payment_method: purchase.payment_method,
            card_status: purchase.card_status,
            manual_status: purchase.manual_status,
            created_at: format_primitive(purchase.created_at),
        }
    }
}
