use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct MarkCompletedRequest {
    pub(crate) course_id: String,
    pub(crate) lecture_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkCompletedResponse {
    pub(crate) newly_completed: bool,
    pub(crate) completed_count: i64,
    pub(crate) total_lectures: i64,
    pub(crate) course_completed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressQuery {
    pub(crate) course_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) course_id: String,
    pub(crate) lecture_completed: Vec<String>,
}
