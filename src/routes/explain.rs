use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::phrases::Lang;
use crate::response::AppError;
use crate::services::explainer::ExplainError;
use crate::services::explanation_client::{ExplainRequest, ExplainResponse, FetchError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplainBody {
    #[serde(default)]
    phrase: String,
    #[serde(default)]
    meaning: String,
    #[serde(default)]
    example: String,
    #[serde(default)]
    target_lang: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(explain_phrase))
}

async fn explain_phrase(
    State(state): State<AppState>,
    body: Result<Json<ExplainBody>, JsonRejection>,
) -> Result<Json<ExplainResponse>, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let target_lang: Lang = body
        .target_lang
        .parse()
        .map_err(|_| AppError::validation(format!("unsupported targetLang: {:?}", body.target_lang)))?;
    let request = ExplainRequest {
        phrase: body.phrase,
        meaning: body.meaning,
        example: body.example,
        target_lang,
    };
    request.validate().map_err(|err| match err {
        FetchError::InvalidRequest(field) => AppError::validation(format!("{field} is required")),
        other => AppError::validation(other.to_string()),
    })?;

    match state.explainer().explain(&request).await {
        Ok((explanation, source)) => {
            tracing::debug!(phrase = %request.phrase, lang = %target_lang, source = source.as_str(), "explanation served");
            Ok(Json(ExplainResponse { explanation }))
        }
        Err(ExplainError::Unavailable) => Err(AppError::unavailable("Explanation service is not configured")),
        Err(ExplainError::Llm(err)) => {
            tracing::error!(error = %err, phrase = %request.phrase, "LLM explanation failed");
            Err(AppError::upstream("Failed to generate explanation"))
        }
    }
}
