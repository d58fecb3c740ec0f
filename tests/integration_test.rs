use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_root() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_info_reports_catalog() {
    let app = common::create_test_app(true);
    let response = app.oneshot(get("/health/info")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["service"], "daily-phrase");
    assert!(body["phrases"].as_u64().unwrap() > 1);
    assert_eq!(body["llmAvailable"], false);
    assert_eq!(body["llmMock"], true);
}

#[tokio::test]
async fn test_today_uses_day_of_year() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/api/phrases/today")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["date"], "2025-01-05");
    assert_eq!(body["data"]["offsetDays"], 0);
    assert_eq!(body["data"]["index"], 5);
    assert_eq!(body["data"]["phrase"]["phrase"], "Ins Fettnäpfchen treten");
    assert!(body["data"]["phrase"].get("explanation").is_none());
}

#[tokio::test]
async fn test_offset_merges_cached_explanation() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/api/phrases/offset/-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let phrase = &body["data"]["phrase"];
    assert_eq!(phrase["phrase"], "Schwein haben");
    assert!(phrase["explanation"]["en"].as_str().unwrap().contains("pig"));
    assert!(phrase["explanation"]["vi"].is_string());
}

#[tokio::test]
async fn test_future_offset_rejected() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/api/phrases/offset/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_non_numeric_offset_rejected() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/api/phrases/offset/yesterday")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_listing() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/api/phrases")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let total = body["data"]["total"].as_u64().unwrap();
    assert_eq!(body["data"]["phrases"].as_array().unwrap().len() as u64, total);
}

#[tokio::test]
async fn test_explain_serves_cached_text() {
    let app = common::create_test_app(false);
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/explain-phrase",
            json!({
                "phrase": "Schwein haben",
                "meaning": "Großes Glück haben.",
                "example": "Da habe ich Schwein gehabt.",
                "targetLang": "en"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert!(body["explanation"].as_str().unwrap().contains("pig"));
}

#[tokio::test]
async fn test_explain_uses_mock_when_enabled() {
    let app = common::create_test_app(true);
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/explain-phrase",
            json!({
                "phrase": "Ins Fettnäpfchen treten",
                "meaning": "Unabsichtlich etwas Peinliches sagen oder tun.",
                "example": "Da bin ich voll ins Fettnäpfchen getreten.",
                "targetLang": "vi"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert!(body["explanation"].as_str().unwrap().contains("Ins Fettnäpfchen treten"));
}

#[tokio::test]
async fn test_explain_unavailable_without_backend() {
    let app = common::create_test_app(false);
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/explain-phrase",
            json!({
                "phrase": "Ins Fettnäpfchen treten",
                "meaning": "Unabsichtlich etwas Peinliches sagen oder tun.",
                "example": "Da bin ich voll ins Fettnäpfchen getreten.",
                "targetLang": "de"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_explain_rejects_unknown_language() {
    let app = common::create_test_app(true);
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/explain-phrase",
            json!({
                "phrase": "Schwein haben",
                "meaning": "Glück haben",
                "example": "Schwein gehabt!",
                "targetLang": "fr"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_explain_rejects_blank_fields() {
    let app = common::create_test_app(true);
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/explain-phrase",
            json!({ "phrase": "Schwein haben", "meaning": "", "example": "x", "targetLang": "en" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "meaning is required");
}

#[tokio::test]
async fn test_explain_rejects_malformed_json() {
    let app = common::create_test_app(true);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/explain-phrase")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::create_test_app(false);
    let response = app.oneshot(get("/api/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = common::body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}
