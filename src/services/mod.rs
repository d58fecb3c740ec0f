pub mod explainer;
pub mod explanation_client;
pub mod llm_provider;
