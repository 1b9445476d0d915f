use super::common::*;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::promotion::promotion_router;
use crate::workflows::school::fixtures::ADULT;

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn propose_route_rejects_downward_regular_promotions() {
    let (service, _, _) = build_service();
    let response = promotion_router(service)
        .oneshot(json_request(
            "POST",
            "/api/v1/promotions",
            json!({
                "student": ADULT,
                "to_level": "lvl-4",
                "promotion_type": "regular",
                "actor": "usr-registrar"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn propose_then_approve_over_http() {
    let (service, _, _) = build_service();
    let router = promotion_router(service);

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/promotions",
            json!({
                "student": ADULT,
                "to_level": "lvl-6",
                "promotion_type": "regular",
                "actor": "usr-registrar"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(created.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let id = body["promotion_id"].as_str().unwrap().to_string();

    let approved = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/promotions/{id}/approve"),
            json!({ "actor": "usr-admin" }),
        ))
        .await
        .unwrap();
    assert_eq!(approved.status(), StatusCode::OK);

    let deleted = router
        .oneshot(
            Request::delete(format!("/api/v1/promotions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::CONFLICT);
}
