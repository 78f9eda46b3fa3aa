//! LLM integration for the nutrition bot.
//!
//! The menu generator only depends on the `LlmProvider` trait. The concrete
//! backend is an OpenAI-compatible chat-completions client pointed at
//! DeepSeek by default.

pub mod openai_compat;
pub mod provider;

pub use openai_compat::OpenAiCompatProvider;
pub use provider::*;

use std::sync::Arc;

use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub base_url: String,
    pub model: String,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    if config.base_url.trim().is_empty() {
        return Err(LlmError::RequestFailed {
            provider: "deepseek".to_string(),
            reason: "base URL is empty".to_string(),
        });
    }
    tracing::info!("Using DeepSeek-compatible endpoint {} (model: {})", config.base_url, config.model);
    Ok(Arc::new(OpenAiCompatProvider::new(
        "deepseek",
        config.base_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
    )))
}
