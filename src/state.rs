use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::phrases::{PhraseError, PhraseResolver};
use crate::services::explainer::PhraseExplainer;
use crate::services::llm_provider::LLMProvider;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    resolver: PhraseResolver,
    explainer: Arc<PhraseExplainer>,
}

impl AppState {
    pub fn new(resolver: PhraseResolver, explainer: PhraseExplainer) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            resolver,
            explainer: Arc::new(explainer),
        }
    }

    /// Loads phrase data and wires the explainer from configuration.
    pub fn from_config(config: &Config) -> Result<Self, PhraseError> {
        let resolver = config.resolver()?;
        let explainer = PhraseExplainer::new(
            resolver.clone(),
            LLMProvider::new(config.llm.clone()),
            config.llm.mock,
        );
        Ok(Self::new(resolver, explainer))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn resolver(&self) -> &PhraseResolver {
        &self.resolver
    }

    pub fn explainer(&self) -> Arc<PhraseExplainer> {
        Arc::clone(&self.explainer)
    }
}
