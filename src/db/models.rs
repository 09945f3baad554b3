use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{
    CardPaymentStatus, ManualPaymentStatus, NotificationType, PaymentMethod, UserRole,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) image_url: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) price_cents: i64,
    pub(crate) discount_percent: i32,
    pub(crate) educator_id: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Chapter {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Lecture {
    pub(crate) id: String,
    pub(crate) chapter_id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) duration_minutes: i32,
    pub(crate) video_url: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

/// A single monetization attempt. Terminal rows are never mutated again
/// outside the audit columns (`reviewed_by`, `reviewed_at`, `updated_at`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Purchase {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) user_id: String,
    pub(crate) amount_cents: i64,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) card_status: Option<CardPaymentStatus>,
    pub(crate) manual_status: Option<ManualPaymentStatus>,
    pub(crate) contact_email: Option<String>,
    pub(crate) contact_phone: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) payment_channel: Option<String>,
    pub(crate) proof_reference: Option<String>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) reviewed_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) ntype: NotificationType,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) course_id: Option<String>,
    pub(crate) course_title: Option<String>,
    pub(crate) is_read: bool,
    pub(crate) metadata: Json<serde_json::Value>,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Snapshot of the author's name/image at posting time, not a live
/// reference to the user row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Testimonial {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) user_id: String,
    pub(crate) user_name: String,
    pub(crate) user_image_url: Option<String>,
    pub(crate) rating: i32,
    pub(crate) comment: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct PinnedTestimonial {
    pub(crate) course_id: String,
    pub(crate) order_index: i32,
    pub(crate) user_id: String,
    pub(crate) user_name: String,
    pub(crate) user_image_url: Option<String>,
    pub(crate) rating: i32,
    pub(crate) comment: String,
    pub(crate) pinned_at: PrimitiveDateTime,
}
