use thiserror::Error;

use crate::phrases::{Lang, PhraseResolver};
use crate::services::explanation_client::ExplainRequest;
use crate::services::llm_provider::{LLMError, LLMProvider};

const SYSTEM_PROMPT: &str = "You are a German teacher. Explain German idioms to learners: \
what the idiom means, where the image comes from if known, when native speakers use it and \
how formal it is. Answer in plain prose, at most 120 words, without a heading.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationSource {
    Cache,
    Llm,
    Mock,
}

impl ExplanationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ExplanationSource::Cache => "cache",
            ExplanationSource::Llm => "llm",
            ExplanationSource::Mock => "mock",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("no explanation backend is configured")]
    Unavailable,
    #[error(transparent)]
    Llm(#[from] LLMError),
}

/// Answers explanation requests: cache first, then the LLM, then the
/// canned fallback when mock mode is on.
#[derive(Clone)]
pub struct PhraseExplainer {
    resolver: PhraseResolver,
    llm: LLMProvider,
    mock: bool,
}

impl PhraseExplainer {
    pub fn new(resolver: PhraseResolver, llm: LLMProvider, mock: bool) -> Self {
        Self { resolver, llm, mock }
    }

    pub fn llm_available(&self) -> bool {
        self.llm.is_available()
    }

    pub fn mock_enabled(&self) -> bool {
        self.mock
    }

    pub async fn explain(
        &self,
        request: &ExplainRequest,
    ) -> Result<(String, ExplanationSource), ExplainError> {
        if let Some(cached) = self
            .resolver
            .find(&request.phrase)
            .and_then(|record| record.explanation_for(request.target_lang).map(str::to_string))
        {
            return Ok((cached, ExplanationSource::Cache));
        }

        if self.llm.is_available() {
            let text = self
                .llm
                .complete_with_system(SYSTEM_PROMPT, &user_prompt(request))
                .await?;
            tracing::info!(
                phrase = %request.phrase,
                lang = %request.target_lang,
                model = self.llm.model(),
                "generated explanation"
            );
            return Ok((text, ExplanationSource::Llm));
        }

        if self.mock {
            return Ok((mock_explanation(request), ExplanationSource::Mock));
        }

        Err(ExplainError::Unavailable)
    }
}

fn user_prompt(request: &ExplainRequest) -> String {
    format!(
        "Idiom: {}\nMeaning (German): {}\nExample: {}\nWrite the explanation in {}.",
        request.phrase,
        request.meaning,
        request.example,
        request.target_lang.display_name()
    )
}

fn mock_explanation(request: &ExplainRequest) -> String {
    match request.target_lang {
        Lang::En => format!(
            "\"{}\" means: {}. For example: {}",
            request.phrase, request.meaning, request.example
        ),
        Lang::Vi => format!(
            "\"{}\" có nghĩa là: {}. Ví dụ: {}",
            request.phrase, request.meaning, request.example
        ),
        Lang::De => format!(
            "„{}“ bedeutet: {}. Beispiel: {}",
            request.phrase, request.meaning, request.example
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::LlmSettings;
    use crate::phrases::PhraseStore;

    fn explainer(mock: bool) -> PhraseExplainer {
        let resolver = PhraseResolver::with_system_clock(PhraseStore::embedded().unwrap());
        let llm = LLMProvider::new(LlmSettings {
            api_key: None,
            model: "gpt-4o-mini".into(),
            api_endpoint: "http://127.0.0.1:9/v1".into(),
            timeout: Duration::from_millis(100),
            mock: false,
        });
        PhraseExplainer::new(resolver, llm, mock)
    }

    fn request(phrase: &str, lang: Lang) -> ExplainRequest {
        ExplainRequest {
            phrase: phrase.into(),
            meaning: "Großes Glück haben.".into(),
            example: "Da habe ich Schwein gehabt.".into(),
            target_lang: lang,
        }
    }

    #[tokio::test]
    async fn cached_explanations_short_circuit() {
        let (text, source) = explainer(false)
            .explain(&request("Schwein haben", Lang::En))
            .await
            .unwrap();
        assert_eq!(source, ExplanationSource::Cache);
        assert!(text.contains("pig"));
    }

    #[tokio::test]
    async fn mock_mode_fills_in_without_llm() {
        let (text, source) = explainer(true)
            .explain(&request("Schwein haben", Lang::De))
            .await
            .unwrap();
        assert_eq!(source, ExplanationSource::Mock);
        assert!(text.contains("Schwein haben"));
    }

    #[tokio::test]
    async fn unavailable_without_llm_or_mock() {
        let err = explainer(false)
            .explain(&request("Schwein haben", Lang::De))
            .await
            .unwrap_err();
        assert!(matches!(err, ExplainError::Unavailable));
    }
}
