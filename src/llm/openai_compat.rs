//! OpenAI-compatible chat-completions client (DeepSeek by default).

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};

/// Talks to any `/chat/completions` endpoint that follows the OpenAI wire format.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn request_failed(&self, reason: impl Into<String>) -> LlmError {
        LlmError::RequestFailed {
            provider: self.provider.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    id: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Turn a raw response body into a `CompletionResponse`.
fn parse_reply(provider: &str, body: &str) -> Result<CompletionResponse, LlmError> {
    let reply: ChatCompletionReply = serde_json::from_str(body)?;
    let choice = reply
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "response contained no choices".to_string(),
        })?;
    let usage = reply.usage.unwrap_or(Usage {
        prompt_tokens: 0,
        completion_tokens: 0,
    });

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        response_id: reply.id,
    })
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        // deepseek-chat list price, USD per token
        (dec!(0.00000027), dec!(0.0000011))
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.request_body(&request);

        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_failed(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed {
                provider: self.provider.clone(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited {
                provider: self.provider.clone(),
                retry_after: parse_retry_after(resp.headers()),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| self.request_failed(e.to_string()))?;

        if !status.is_success() {
            return Err(self.request_failed(format!("HTTP {status}: {text}")));
        }

        let response = parse_reply(&self.provider, &text)?;
        tracing::debug!(
            provider = %self.provider,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Chat completion finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(
            "deepseek",
            "https://api.deepseek.com/",
            SecretString::from("sk-test"),
            "deepseek-chat",
        )
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        assert_eq!(
            provider().endpoint(),
            "https://api.deepseek.com/chat/completions"
        );
    }

    #[test]
    fn request_body_matches_wire_format() {
        let p = provider();
        let request = CompletionRequest::new(vec![
            ChatMessage::system("be helpful"),
            ChatMessage::user("menu please"),
        ])
        .with_max_tokens(2000)
        .with_temperature(0.5);

        let json = serde_json::to_value(p.request_body(&request)).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "menu please");
    }

    #[test]
    fn request_body_omits_unset_options() {
        let p = provider();
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);
        let json = serde_json::to_value(p.request_body(&request)).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn parse_reply_reads_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Monday: oats"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 800, "total_tokens": 920}
        }"#;
        let response = parse_reply("deepseek", body).unwrap();
        assert_eq!(response.content, "Monday: oats");
        assert_eq!(response.input_tokens, 120);
        assert_eq!(response.output_tokens, 800);
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.response_id.as_deref(), Some("chatcmpl-1"));
    }

    #[test]
    fn parse_reply_without_choices_is_invalid() {
        let err = parse_reply("deepseek", r#"{"id": "x", "choices": []}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }), "{err}");
    }

    #[test]
    fn parse_reply_rejects_garbage() {
        let err = parse_reply("deepseek", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, LlmError::Json(_)));
    }

    #[test]
    fn retry_after_header_parsed_as_seconds() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));
        assert_eq!(parse_retry_after(&reqwest::header::HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_failure() {
        let p = OpenAiCompatProvider::new(
            "deepseek",
            "http://127.0.0.1:1",
            SecretString::from("sk-test"),
            "deepseek-chat",
        );
        let err = p
            .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed { .. }), "{err}");
    }
}
