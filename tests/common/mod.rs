#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;

use daily_phrase::config::LlmSettings;
use daily_phrase::phrases::{FixedClock, PhraseRecord, PhraseResolver, PhraseStore};
use daily_phrase::services::explainer::PhraseExplainer;
use daily_phrase::services::llm_provider::LLMProvider;
use daily_phrase::state::AppState;

/// 2025-01-05 is day 5; with the shipped catalog that is "Ins Fettnäpfchen
/// treten", and the day before is "Schwein haben".
pub fn pinned_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
}

pub fn pinned_resolver() -> PhraseResolver {
    PhraseResolver::new(
        PhraseStore::embedded().unwrap(),
        Arc::new(FixedClock::new(pinned_date())),
    )
}

pub fn offline_llm() -> LLMProvider {
    LLMProvider::new(LlmSettings {
        api_key: None,
        model: "gpt-4o-mini".to_string(),
        api_endpoint: "http://127.0.0.1:9/v1".to_string(),
        timeout: Duration::from_millis(200),
        mock: false,
    })
}

pub fn test_state(mock: bool) -> AppState {
    let resolver = pinned_resolver();
    let explainer = PhraseExplainer::new(resolver.clone(), offline_llm(), mock);
    AppState::new(resolver, explainer)
}

pub fn create_test_app(mock: bool) -> Router {
    daily_phrase::app_with_state(test_state(mock))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn record(phrase: &str) -> PhraseRecord {
    serde_json::from_value(serde_json::json!({
        "phrase": phrase,
        "meaning": format!("{phrase} meaning"),
        "en": format!("{phrase} en"),
        "vi": format!("{phrase} vi"),
        "example": format!("{phrase} example"),
    }))
    .unwrap()
}

/// Serves the app on an ephemeral port; returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
