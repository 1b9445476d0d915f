use super::common::*;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::enrollment::enrollment_router;
use crate::workflows::school::fixtures::{ADULT, MATH, MINOR};

async fn post_json(router: axum::Router, uri: &str, payload: Value) -> axum::response::Response {
    router
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn submit_route_quotes_the_course_price() {
    let (service, _, _) = build_service();
    let response = post_json(
        enrollment_router(service),
        "/api/v1/enrollments/requests",
        json!({ "student": ADULT, "course": MATH, "frequency": "3x_weekly" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "payment_pending");
    assert_eq!(body["quoted_price"], "150.00");
}

#[tokio::test]
async fn submit_route_requires_parent_info_for_unlinked_minors() {
    let (service, _, _) = build_service();
    let response = post_json(
        enrollment_router(service),
        "/api/v1/enrollments/requests",
        json!({ "student": MINOR, "course": MATH, "frequency": "1x_weekly" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn approve_route_conflicts_while_payment_is_pending_verification() {
    let (service, _, _) = build_service();
    let request = service
        .submit_request(
            &MINOR.into(),
            &MATH.into(),
            crate::workflows::school::domain::Frequency::OnceWeekly,
            Some(parent_info("fay@example.test")),
            crate::workflows::school::fixtures::now(),
        )
        .expect("request");

    let response = post_json(
        enrollment_router(service),
        &format!("/api/v1/enrollments/requests/{}/approve", request.id),
        json!({ "actor": "usr-admin" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
