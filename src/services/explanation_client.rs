use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::phrases::Lang;

pub const EXPLAIN_PATH: &str = "/api/explain-phrase";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub phrase: String,
    pub meaning: String,
    pub example: String,
    pub target_lang: Lang,
}

impl ExplainRequest {
    pub fn validate(&self) -> Result<(), FetchError> {
        for (field, value) in [
            ("phrase", &self.phrase),
            ("meaning", &self.meaning),
            ("example", &self.example),
        ] {
            if value.trim().is_empty() {
                return Err(FetchError::InvalidRequest(field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} must not be empty")]
    InvalidRequest(&'static str),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("explanation service returned {status}: {body}")]
    Service { status: reqwest::StatusCode, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("explanation service returned an empty explanation")]
    EmptyExplanation,
    #[error("explanation fetch aborted")]
    Aborted,
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }

    /// Short, non-blocking notice for the display layer.
    pub fn user_notice(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Could not reach the explanation service. Check your connection and try again.",
            FetchError::InvalidRequest(_) => "This phrase cannot be explained right now.",
            _ => "Could not load the explanation. Please try again.",
        }
    }
}

/// Generates an explanation for a phrase on demand. One call, no retries.
pub trait ExplanationFetcher: Send + Sync {
    fn fetch_explanation(
        &self,
        request: &ExplainRequest,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Talks to the `/api/explain-phrase` endpoint over HTTP.
#[derive(Clone)]
pub struct HttpExplanationFetcher {
    url: String,
    client: reqwest::Client,
}

impl HttpExplanationFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            url: format!("{}{EXPLAIN_PATH}", base_url.trim().trim_end_matches('/')),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ExplanationFetcher for HttpExplanationFetcher {
    async fn fetch_explanation(&self, request: &ExplainRequest) -> Result<String, FetchError> {
        request.validate()?;

        tracing::debug!(phrase = %request.phrase, lang = %request.target_lang, "requesting explanation");
        let resp = self.client.post(&self.url).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, phrase = %request.phrase, "explanation service error");
            return Err(FetchError::Service { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: ExplainResponse =
            serde_json::from_slice(&bytes).map_err(|err| FetchError::Decode(err.to_string()))?;
        let explanation = parsed.explanation.trim();
        if explanation.is_empty() {
            return Err(FetchError::EmptyExplanation);
        }
        Ok(explanation.to_string())
    }
}
