use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::NotificationType;
use crate::repositories;
use crate::test_support;

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn finishing_every_lecture_notifies_exactly_once() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "pedu1@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Short Course", 1_000, 0, &educator.id).await;
    let chapter = test_support::insert_chapter(ctx.state.db(), &course.id, "Chapter 1").await;
    let first =
        test_support::insert_lecture(ctx.state.db(), &course.id, &chapter, "Lecture 1", 0).await;
    let second =
        test_support::insert_lecture(ctx.state.db(), &course.id, &chapter, "Lecture 2", 1).await;

    let student =
        test_support::insert_user(ctx.state.db(), "pstu1@example.com", "Stu", "stu-pass").await;
    test_support::enroll(ctx.state.db(), &course.id, &student.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/progress/complete",
            Some(&token),
            Some(json!({ "course_id": course.id, "lecture_id": first.id })),
        ))
        .await
        .expect("complete first lecture");
    let body = test_support::read_json(response).await;
    assert_eq!(body["newly_completed"], true);
    assert_eq!(body["completed_count"], 1);
    assert_eq!(body["total_lectures"], 2);
    assert_eq!(body["course_completed"], false);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/progress/complete",
            Some(&token),
            Some(json!({ "course_id": course.id, "lecture_id": second.id })),
        ))
        .await
        .expect("complete second lecture");
    let body = test_support::read_json(response).await;
    assert_eq!(body["course_completed"], true);

    // Re-marking the final lecture is a no-op and must not notify again
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/progress/complete",
            Some(&token),
            Some(json!({ "course_id": course.id, "lecture_id": second.id })),
        ))
        .await
        .expect("re-complete second lecture");
    let body = test_support::read_json(response).await;
    assert_eq!(body["newly_completed"], false);
    assert_eq!(body["completed_count"], 2);

    let filter = repositories::notifications::NotificationFilter {
        ntype: Some(NotificationType::CourseCompleted),
        is_read: None,
        skip: 0,
        limit: 10,
    };
    let (_, total) =
        repositories::notifications::list_for_user(ctx.state.db(), &student.id, &filter)
            .await
            .expect("list notifications");
    assert_eq!(total, 1);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn foreign_lecture_is_not_found() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "pedu2@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Course A", 1_000, 0, &educator.id).await;
    let other =
        test_support::insert_course(ctx.state.db(), "Course B", 1_000, 0, &educator.id).await;
    let other_chapter = test_support::insert_chapter(ctx.state.db(), &other.id, "Chapter").await;
    let foreign =
        test_support::insert_lecture(ctx.state.db(), &other.id, &other_chapter, "Elsewhere", 0)
            .await;

    let student =
        test_support::insert_user(ctx.state.db(), "pstu2@example.com", "Stu", "stu-pass").await;
    test_support::enroll(ctx.state.db(), &course.id, &student.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/progress/complete",
            Some(&token),
            Some(json!({ "course_id": course.id, "lecture_id": foreign.id })),
        ))
        .await
        .expect("complete foreign lecture");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Progress for the untouched course reads back empty
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/progress?course_id={}", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("read progress");
    let body = test_support::read_json(response).await;
    assert_eq!(body["lecture_completed"].as_array().map(Vec::len), Some(0));
}
