//! Integration tests for the assembled application.
//!
//! These use the same `create_base_app` factory as `main`, so the full
//! middleware stack (request IDs, security headers, metrics) and route
//! table are covered.

use actix_web::{http::StatusCode, test};
use mailgate_api::create_base_app;

#[actix_web::test]
async fn health_endpoint_works_through_the_full_stack() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.contains("application/json"),
        "expected JSON content type, got: {content_type}"
    );

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json, serde_json::json!({"status": "healthy"}));
}

#[actix_web::test]
async fn version_endpoint_reports_build_metadata() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get().uri("/api/version").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        json.get("version").and_then(|v| v.as_str()),
        Some(env!("CARGO_PKG_VERSION"))
    );
    assert!(json.get("commit").is_some_and(|v| v.is_string()));
    assert!(json.get("build_time").is_some_and(|v| v.is_string()));
}

#[actix_web::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body_str = std::str::from_utf8(&body).unwrap();
    assert!(body_str.contains("app_uptime_seconds"));
    assert!(body_str.contains("app_info"));
}

#[actix_web::test]
async fn openapi_spec_documents_the_api() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get().uri("/api/spec/v2").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        json.pointer("/info/title").and_then(|v| v.as_str()),
        Some("Mailgate API")
    );
    // The signing scheme is part of the client-facing documentation.
    let description = json
        .pointer("/info/description")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    assert!(description.contains("X-Signature"));
    assert!(description.contains("subscribe-add"));
}

#[actix_web::test]
async fn index_page_is_served() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body_str = std::str::from_utf8(&body).unwrap();
    assert!(body_str.contains("Mailgate API"));
}

#[actix_web::test]
async fn responses_carry_security_and_request_id_headers() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers()
            .get("x-content-type-options")
            .and_then(|h| h.to_str().ok()),
        Some("nosniff")
    );
    assert_eq!(
        resp.headers()
            .get("x-frame-options")
            .and_then(|h| h.to_str().ok()),
        Some("DENY")
    );
    assert!(resp.headers().get("x-request-id").is_some());
}

#[actix_web::test]
async fn inbound_request_id_is_echoed() {
    let app = test::init_service(create_base_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("X-Request-ID", "test-trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers()
            .get("x-request-id")
            .and_then(|h| h.to_str().ok()),
        Some("test-trace-42")
    );
}
