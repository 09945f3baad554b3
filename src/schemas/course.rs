use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Chapter, Course, Lecture};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[validate(range(min = 0))]
    pub(crate) price_cents: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub(crate) discount_percent: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseUpdate {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) price_cents: Option<i64>,
    #[serde(default)]
    pub(crate) discount_percent: Option<i32>,
    #[serde(default)]
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) price_cents: i64,
    pub(crate) discount_percent: i32,
    pub(crate) educator_id: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            price_cents: course.price_cents,
            discount_percent: course.discount_percent,
            educator_id: course.educator_id,
            is_published: course.is_published,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ChapterCreate {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    pub(crate) order_index: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChapterResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
}

impl ChapterResponse {
    pub(crate) fn from_db(chapter: Chapter) -> Self {
        Self {
            id: chapter.id,
            course_id: chapter.course_id,
            title: chapter.title,
            order_index: chapter.order_index,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LectureCreate {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    pub(crate) order_index: i32,
    #[serde(default)]
    pub(crate) duration_minutes: i32,
    #[serde(default)]
    pub(crate) video_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LectureResponse {
    pub(crate) id: String,
    pub(crate) chapter_id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) duration_minutes: i32,
    pub(crate) video_url: Option<String>,
}

impl LectureResponse {
    pub(crate) fn from_db(lecture: Lecture) -> Self {
        Self {
            id: lecture.id,
            chapter_id: lecture.chapter_id,
            course_id: lecture.course_id,
            title: lecture.title,
            order_index: lecture.order_index,
            duration_minutes: lecture.duration_minutes,
            video_url: lecture.video_url,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RateCourseRequest {
    #[validate(range(min = 1, max = 5))]
    pub(crate) rating: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrolledStudentsResponse {
    pub(crate) course_id: String,
    pub(crate) students: Vec<String>,
}
