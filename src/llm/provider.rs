//! Provider-agnostic completion types and the `LlmProvider` trait.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

impl FinishReason {
    pub fn from_wire(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => Self::Stop,
            Some("length") => Self::Length,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::Unknown,
        }
    }
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: FinishReason,
    pub response_id: Option<String>,
}

/// A text-generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Cost per input and output token, in USD.
    fn cost_per_token(&self) -> (Decimal, Decimal);

    /// Run one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Estimated cost of a finished call.
    fn estimate_cost(&self, response: &CompletionResponse) -> Decimal {
        let (input, output) = self.cost_per_token();
        input * Decimal::from(response.input_tokens) + output * Decimal::from(response.output_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl LlmProvider for Fixed {
        fn model_name(&self) -> &str {
            "fixed"
        }
        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::new(1, 6), Decimal::new(2, 6))
        }
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: "ok".into(),
                input_tokens: 100,
                output_tokens: 50,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    #[test]
    fn request_builder_sets_options() {
        let req = CompletionRequest::new(vec![ChatMessage::system("s"), ChatMessage::user("u")])
            .with_max_tokens(2000)
            .with_temperature(0.7);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.max_tokens, Some(2000));
        assert_eq!(req.temperature, Some(0.7));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn finish_reason_from_wire() {
        assert_eq!(FinishReason::from_wire(Some("stop")), FinishReason::Stop);
        assert_eq!(FinishReason::from_wire(Some("length")), FinishReason::Length);
        assert_eq!(FinishReason::from_wire(None), FinishReason::Unknown);
    }

    #[tokio::test]
    async fn estimate_cost_uses_token_counts() {
        let llm = Fixed;
        let response = llm.complete(CompletionRequest::new(vec![])).await.unwrap();
        // 100 * 0.000001 + 50 * 0.000002
        assert_eq!(llm.estimate_cost(&response), Decimal::new(2, 4));
    }
}
