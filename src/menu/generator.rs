//! Asks the LLM for a weekly meal plan and formats the reply.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::LlmError;
use crate::intake::prompts::{MENU_APOLOGY, MENU_UNAVAILABLE};
use crate::intake::Profile;
use crate::llm::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider};

use super::format::{Decorations, MAX_CHUNK_CHARS, chunk_text, format_menu};
use super::prompt::{SYSTEM_INSTRUCTION, build_menu_prompt};

/// Configuration for menu generation.
#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// Max tokens for the LLM response.
    pub max_tokens: u32,
    /// LLM temperature.
    pub temperature: f32,
    /// How long to wait for the LLM before giving up.
    pub timeout: Duration,
    /// Markers added to day and meal lines.
    pub decorations: Decorations,
    /// Maximum characters per outgoing chunk.
    pub chunk_chars: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            decorations: Decorations::default(),
            chunk_chars: MAX_CHUNK_CHARS,
        }
    }
}

/// How a menu request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStatus {
    /// The LLM produced a menu.
    Generated,
    /// The LLM failed, timed out, or returned nothing usable.
    Failed,
    /// No LLM is configured.
    Unavailable,
}

/// Ordered, transport-sized text chunks plus how they were produced.
#[derive(Debug, Clone)]
pub struct MenuReply {
    pub status: MenuStatus,
    pub chunks: Vec<String>,
}

impl MenuReply {
    fn fixed(status: MenuStatus, text: &str) -> Self {
        Self {
            status,
            chunks: vec![text.to_string()],
        }
    }
}

/// Generates weekly menus for complete profiles.
pub struct MenuGenerator {
    llm: Option<Arc<dyn LlmProvider>>,
    config: MenuConfig,
}

impl MenuGenerator {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, config: MenuConfig) -> Self {
        Self { llm, config }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Generate a menu. Never fails: errors become the fixed apology text.
    pub async fn generate(&self, profile: &Profile) -> MenuReply {
        let Some(llm) = self.llm.as_ref() else {
            return MenuReply::fixed(MenuStatus::Unavailable, MENU_UNAVAILABLE);
        };

        match self.request(llm.as_ref(), profile).await {
            Ok(response) => {
                let formatted = format_menu(&response.content, &self.config.decorations);
                if formatted.is_empty() {
                    warn!(model = llm.model_name(), "LLM returned an empty menu");
                    return MenuReply::fixed(MenuStatus::Failed, MENU_APOLOGY);
                }
                let chunks = chunk_text(&formatted, self.config.chunk_chars);
                info!(
                    model = llm.model_name(),
                    chars = formatted.chars().count(),
                    chunks = chunks.len(),
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    cost_usd = %llm.estimate_cost(&response),
                    "Generated weekly menu"
                );
                MenuReply {
                    status: MenuStatus::Generated,
                    chunks,
                }
            }
            Err(e) => {
                warn!(model = llm.model_name(), error = %e, "Error generating menu");
                MenuReply::fixed(MenuStatus::Failed, MENU_APOLOGY)
            }
        }
    }

    /// Send exactly one completion request, bounded by the configured timeout.
    async fn request(
        &self,
        llm: &dyn LlmProvider,
        profile: &Profile,
    ) -> Result<CompletionResponse, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(build_menu_prompt(profile)),
        ])
        .with_max_tokens(self.config.max_tokens)
        .with_temperature(self.config.temperature);

        let response = tokio::time::timeout(self.config.timeout, llm.complete(request))
            .await
            .map_err(|_| LlmError::Timeout {
                provider: llm.model_name().to_string(),
                timeout: self.config.timeout,
            })??;

        Ok(response)
    }
}
