use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::NotificationType;
use crate::repositories;
use crate::services::checkout;
use crate::test_support;

fn manual_payment_body(course_id: &str) -> serde_json::Value {
    json!({
        "course_id": course_id,
        "contact_email": "student@example.com",
        "contact_phone": "+15550100",
        "location": "Springfield",
        "payment_channel": "bank-transfer",
        "proof_reference": "TX-123456"
    })
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn manual_payment_verification_enrolls_and_notifies() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "edu1@example.com", "Edu One", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Rust Basics", 10_000, 20, &educator.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "stu1@example.com", "Stu One", "stu-pass").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/payments/manual",
            Some(&student_token),
            Some(manual_payment_body(&course.id)),
        ))
        .await
        .expect("submit manual payment");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    // 20% off a $100 course, half-up rounding
    assert_eq!(created["amount_cents"], 8_000);
    assert_eq!(created["manual_status"], "pending");
    let purchase_id = created["id"].as_str().expect("purchase id").to_string();

    let educator_token = test_support::bearer_token(&educator.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/payments/{purchase_id}/review"),
            Some(&educator_token),
            Some(json!({ "decision": "verified" })),
        ))
        .await
        .expect("review payment");

    let status = response.status();
    let reviewed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {reviewed}");
    assert_eq!(reviewed["manual_status"], "verified");

    let enrolled = repositories::enrollments::is_enrolled(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("check enrollment");
    assert!(enrolled);

    let filter = repositories::notifications::NotificationFilter {
        ntype: Some(NotificationType::PaymentSuccess),
        is_read: None,
        skip: 0,
        limit: 10,
    };
    let (items, total) =
        repositories::notifications::list_for_user(ctx.state.db(), &student.id, &filter)
            .await
            .expect("list notifications");
    assert_eq!(total, 1);
    assert_eq!(items[0].course_id.as_deref(), Some(course.id.as_str()));
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn review_is_single_shot() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "edu2@example.com", "Edu Two", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Advanced Rust", 5_000, 0, &educator.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "stu2@example.com", "Stu Two", "stu-pass").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/payments/manual",
            Some(&student_token),
            Some(manual_payment_body(&course.id)),
        ))
        .await
        .expect("submit manual payment");
    let created = test_support::read_json(response).await;
    let purchase_id = created["id"].as_str().expect("purchase id").to_string();

    let educator_token = test_support::bearer_token(&educator.id, ctx.state.settings());
    let first = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/payments/{purchase_id}/review"),
            Some(&educator_token),
            Some(json!({ "decision": "rejected" })),
        ))
        .await
        .expect("first review");
    assert_eq!(first.status(), StatusCode::OK);

    let second = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/payments/{purchase_id}/review"),
            Some(&educator_token),
            Some(json!({ "decision": "verified" })),
        ))
        .await
        .expect("second review");
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // A rejected purchase never enrolls
    let enrolled = repositories::enrollments::is_enrolled(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("check enrollment");
    assert!(!enrolled);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn unrelated_educator_cannot_review() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_educator(ctx.state.db(), "edu3@example.com", "Owner", "edu-pass")
            .await;
    let other =
        test_support::insert_educator(ctx.state.db(), "edu4@example.com", "Other", "edu-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Owned Course", 2_000, 0, &owner.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "stu3@example.com", "Stu", "stu-pass").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/payments/manual",
            Some(&student_token),
            Some(manual_payment_body(&course.id)),
        ))
        .await
        .expect("submit manual payment");
    let created = test_support::read_json(response).await;
    let purchase_id = created["id"].as_str().expect("purchase id").to_string();

    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/payments/{purchase_id}/review"),
            Some(&other_token),
            Some(json!({ "decision": "verified" })),
        ))
        .await
        .expect("review attempt");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn already_enrolled_submission_conflicts() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "edu5@example.com", "Edu", "edu-pass").await;
    let course =
        test_support::insert_course(ctx.state.db(), "Enrolled Course", 1_000, 0, &educator.id)
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "stu4@example.com", "Stu", "stu-pass").await;
    test_support::enroll(ctx.state.db(), &course.id, &student.id).await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/payments/manual",
            Some(&token),
            Some(manual_payment_body(&course.id)),
        ))
        .await
        .expect("submit manual payment");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

fn webhook_request(body: serde_json::Value, signature: Option<&str>) -> Request<Body> {
    let bytes = serde_json::to_vec(&body).expect("serialize body");
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/payments/webhook")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-webhook-signature", signature);
    }
    builder.body(Body::from(bytes)).expect("request body")
}

#[tokio::test]
#[ignore = "requires the courseloop_rust_test database"]
async fn webhook_settles_card_purchase_once() {
    let ctx = test_support::setup_test_context().await;

    let educator =
        test_support::insert_educator(ctx.state.db(), "edu6@example.com", "Edu", "edu-pass").await;
    let course =
        test_support::insert_course(ctx.state.db(), "Card Course", 3_000, 0, &educator.id).await;
    let student =
        test_support::insert_user(ctx.state.db(), "stu5@example.com", "Stu", "stu-pass").await;

    let purchase = repositories::purchases::create_card(
        ctx.state.db(),
        &uuid::Uuid::new_v4().to_string(),
        &course.id,
        &student.id,
        3_000,
        crate::core::time::primitive_now_utc(),
    )
    .await
    .expect("create card purchase");

    let event = json!({ "reference": purchase.id, "outcome": "completed" });
    let body_bytes = serde_json::to_vec(&event).expect("serialize");
    let secret = &ctx.state.settings().payments().webhook_secret;
    let signature = checkout::webhook_signature(secret, &body_bytes);

    let unsigned = ctx
        .app
        .clone()
        .oneshot(webhook_request(event.clone(), Some("deadbeef")))
        .await
        .expect("unsigned webhook");
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let signed = ctx
        .app
        .clone()
        .oneshot(webhook_request(event.clone(), Some(&signature)))
        .await
        .expect("signed webhook");
    assert_eq!(signed.status(), StatusCode::OK);

    let enrolled = repositories::enrollments::is_enrolled(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("check enrollment");
    assert!(enrolled);

    // A replay of the same event is acknowledged without a second settle
    let replay = ctx
        .app
        .oneshot(webhook_request(event, Some(&signature)))
        .await
        .expect("replayed webhook");
    assert_eq!(replay.status(), StatusCode::OK);

    let filter = repositories::notifications::NotificationFilter {
        ntype: Some(NotificationType::PaymentSuccess),
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
