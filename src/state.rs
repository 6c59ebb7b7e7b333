//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the diagram generator and generation settings. Nothing in it
//! is mutable; requests never share state.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::LlmClient;
use crate::llm::config::LlmConfig;
use crate::services::generate::{DiagramGenerator, GenerateSettings, LlmGenerator, PlaceholderGenerator};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn DiagramGenerator>,
    pub settings: GenerateSettings,
}

impl AppState {
    #[must_use]
    pub fn new(generator: Arc<dyn DiagramGenerator>, settings: GenerateSettings) -> Self {
        Self { generator, settings }
    }

    /// Build state from environment variables.
    ///
    /// `LLM_PROVIDER=placeholder` selects the static generator explicitly.
    /// Any other provider goes through [`LlmConfig`]; if that fails the
    /// service still starts, serving placeholder diagrams.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key: &str| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let settings = GenerateSettings::from_vars(&var);
        Self::new(build_generator(&var, settings.max_tokens), settings)
    }
}

fn build_generator(var: &impl Fn(&str) -> Option<String>, max_tokens: u32) -> Arc<dyn DiagramGenerator> {
    if var("LLM_PROVIDER").as_deref() == Some("placeholder") {
        info!("placeholder generator selected");
        return Arc::new(PlaceholderGenerator);
    }

    match LlmConfig::from_vars(var).and_then(LlmClient::from_config) {
        Ok(client) => {
            info!(model = client.model(), "LLM client initialized");
            Arc::new(LlmGenerator::new(Arc::new(client), max_tokens))
        }
        Err(e) => {
            warn!(error = %e, "LLM client not configured, serving placeholder diagrams");
            Arc::new(PlaceholderGenerator)
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_llm_config_falls_back_to_placeholder() {
        let state = AppState::from_vars(|_: &str| None);
        let raw = state.generator.generate("", "hello").await.unwrap();
        assert!(raw.contains("Generated from: hello"));
        assert_eq!(state.settings, GenerateSettings::default());
    }

    #[tokio::test]
    async fn explicit_placeholder_provider() {
        let state = AppState::from_vars(|key: &str| match key {
            "LLM_PROVIDER" => Some("placeholder".into()),
            "GENERATE_TIMEOUT_SECS" => Some("3".into()),
            _ => None,
        });
        assert_eq!(state.settings.timeout.as_secs(), 3);
        let raw = state.generator.generate("", "x").await.unwrap();
        assert!(raw.contains("rectangle"));
    }
}
