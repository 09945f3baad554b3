use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::User;
use crate::test_support::{self, TestContext};

const GOOD_COMMENT: &str = "Wonderful course with clear and helpful explanations.";

async fn rate_five_stars(ctx: &TestContext, course_id: &str, user: &User) {
    test_support::enroll(ctx.state.db(), course_id, &user.id).await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{course_id}/rate"),
            Some(&token),
            Some(json!({ "rating": 5 })),
        ))
        .await
        .expect("rate course");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn eligible_student_can_post_testimonial() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "tedu1@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Reviewed Course", 1_000, 0, &educator.id)
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "tstu1@example.com", "Stu One", "stu-pass")
            .await;
    rate_five_stars(&ctx, &course.id, &student).await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials",
            Some(&token),
            Some(json!({ "course_id": course.id, "comment": GOOD_COMMENT })),
        ))
        .await
        .expect("post testimonial");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["user_name"], "Stu One");
    assert_eq!(created["rating"], 5);

    let listed = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/testimonials?course_id={}", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list testimonials");
    let items = test_support::read_json(listed).await;
    assert_eq!(items.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn unrated_student_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "tedu2@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Unrated Course", 1_000, 0, &educator.id)
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "tstu2@example.com", "Stu", "stu-pass").await;
    test_support::enroll(ctx.state.db(), &course.id, &student.id).await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials",
            Some(&token),
            Some(json!({ "course_id": course.id, "comment": GOOD_COMMENT })),
        ))
        .await
        .expect("post testimonial");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn fourth_testimonial_hits_quota() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "tedu3@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Quota Course", 1_000, 0, &educator.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "tstu3@example.com", "Stu", "stu-pass").await;
    rate_five_stars(&ctx, &course.id, &student).await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    for n in 0..3 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/testimonials",
                Some(&token),
                Some(json!({
                    "course_id": course.id,
                    "comment": format!("{GOOD_COMMENT} Take number {n}."),
                })),
            ))
            .await
            .expect("post testimonial");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials",
            Some(&token),
            Some(json!({ "course_id": course.id, "comment": GOOD_COMMENT })),
        ))
        .await
        .expect("post testimonial");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn pin_and_unpin_lifecycle() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "tedu4@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Pinned Course", 1_000, 0, &educator.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "tstu4@example.com", "Stu", "stu-pass").await;
    rate_five_stars(&ctx, &course.id, &student).await;

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials",
            Some(&student_token),
            Some(json!({ "course_id": course.id, "comment": GOOD_COMMENT })),
        ))
        .await
        .expect("post testimonial");
    assert_eq!(response.status(), StatusCode::CREATED);

    let educator_token = test_support::bearer_token(&educator.id, ctx.state.settings());
    let pin = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials/pin",
            Some(&educator_token),
            Some(json!({ "course_id": course.id, "index": 0 })),
        ))
        .await
        .expect("pin testimonial");
    let status = pin.status();
    let pinned = test_support::read_json(pin).await;
    assert_eq!(status, StatusCode::CREATED, "response: {pinned}");
    assert_eq!(pinned["order_index"], 0);

    let duplicate = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials/pin",
            Some(&educator_token),
            Some(json!({ "course_id": course.id, "index": 0 })),
        ))
        .await
        .expect("duplicate pin");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let unpin = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials/unpin",
            Some(&educator_token),
            Some(json!({ "course_id": course.id, "index": 0 })),
        ))
        .await
        .expect("unpin testimonial");
    assert_eq!(unpin.status(), StatusCode::NO_CONTENT);

    let again = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials/unpin",
            Some(&educator_token),
            Some(json!({ "course_id": course.id, "index": 0 })),
        ))
        .await
        .expect("second unpin");
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn pin_requires_reviewer_access() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "tedu5@example.com", "Edu", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Locked Course", 1_000, 0, &educator.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "tstu5@example.com", "Stu", "stu-pass").await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/testimonials/pin",
            Some(&token),
            Some(json!({ "course_id": course.id, "index": 0 })),
        ))
        .await
        .expect("pin attempt");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
