use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{PinnedTestimonial, Testimonial};

#[derive(Debug, Deserialize)]
pub(crate) struct TestimonialCreate {
    pub(crate) course_id: String,
    pub(crate) comment: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PinRequest {
    pub(crate) course_id: String,
    pub(crate) index: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct TestimonialResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) user_id: String,
    pub(crate) user_name: String,
    pub(crate) user_image_url: Option<String>,
    pub(crate) rating: i32,
    pub(crate) comment: String,
    pub(crate) created_at: String,
}

impl TestimonialResponse {
    pub(crate) fn from_db(testimonial: Testimonial) -> Self {
        Self {
            id: testimonial.id,
            course_id: testimonial.course_id,
            user_id: testimonial.user_id,
            user_name: testimonial.user_name,
            user_image_url: testimonial.user_image_url,
            rating: testimonial.rating,
            comment: testimonial.comment,
            created_at: format_primitive(testimonial.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PinnedTestimonialResponse {
    pub(crate) order_index: i32,
    pub(crate) user_id: String,
    pub(crate) user_name: String,
    pub(crate) user_image_url: Option<String>,
    pub(crate) rating: i32,
    pub(crate) comment: String,
    pub(crate) pinned_at: String,
}

impl PinnedTestimonialResponse {
    pub(crate) fn from_db(pinned: PinnedTestimonial) -> Self {
        Self {
            order_index: pinned.order_index,
            user_id: pinned.user_id,
            user_name: pinned.user_name,
            user_image_url: pinned.user_image_url,
            rating: pinned.rating,
            comment: pinned.comment,
            pinned_at: format_primitive(pinned.pinned_at),
        }
    }
}
