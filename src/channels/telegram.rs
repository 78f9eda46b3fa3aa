//! Telegram channel. Long-polls the Bot API for updates.
//!
//! Plain-text messages only. Choice sets are shown as a one-time reply
//! keyboard; a tap on a key arrives back as an ordinary text message.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause before polling again after a failed getUpdates call.
const POLL_ERROR_BACKOFF: std::time::Duration = std::time::Duration::from_secs(5);

/// Keys per keyboard row.
const KEYBOARD_ROW_WIDTH: usize = 2;

/// Connects to the Telegram Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    allowed_users: Vec<String>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, allowed_users: Vec<String>) -> Self {
        Self {
            bot_token,
            allowed_users,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        api_url(&self.bot_token, method)
    }

    /// Send a response, split to Telegram's limit. The keyboard (or keyboard
    /// removal) rides on the last piece so it stays under the final text.
    async fn send_message(
        &self,
        chat_id: &str,
        response: &OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(&response.content, TELEGRAM_MAX_MESSAGE_LENGTH);
        let markup = reply_markup(response);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let markup = if i == last { markup.as_ref() } else { None };
            self.send_message_chunk(chat_id, chunk, markup).await?;
        }
        Ok(())
    }

    async fn send_message_chunk(
        &self,
        chat_id: &str,
        text: &str,
        markup: Option<&serde_json::Value>,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] = markup.clone();
        }

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage returned {status}: {err}"),
            });
        }

        Ok(())
    }

    async fn send_chat_action(&self, chat_id: &str) {
        let result = self
            .client
            .post(self.api_url("sendChatAction"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "action": "typing"
            }))
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!("Telegram sendChatAction failed: {e}");
        }
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let allowed_users = self.allowed_users.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                        continue;
                    }
                };

                let results = match update_batch(&data) {
                    Ok(results) => results,
                    Err(description) => {
                        tracing::warn!("Telegram getUpdates failed: {description}");
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                        continue;
                    }
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(incoming) = parse_update(update, &allowed_users) else {
                        continue;
                    };

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chat_id = msg
            .metadata
            .get("chat_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: "No chat_id in message metadata".into(),
            })?;

        self.send_message(chat_id, &response).await
    }

    async fn send_status(
        &self,
        status: StatusUpdate,
        metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        let Some(chat_id) = metadata.get("chat_id").and_then(|v| v.as_str()) else {
            return Ok(());
        };
        let StatusUpdate::Thinking(_) = status;
        self.send_chat_action(chat_id).await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────

fn api_url(token: &SecretString, method: &str) -> String {
    format!("https://api.telegram.org/bot{}/{method}", token.expose_secret())
}

/// Check if any identity in the iterator matches the allowed users list.
fn check_user_allowed<'a>(
    allowed_users: &[String],
    identities: impl IntoIterator<Item = &'a str>,
) -> bool {
    let ids: Vec<&str> = identities.into_iter().filter(|id| !id.is_empty()).collect();
    allowed_users
        .iter()
        .any(|u| u == "*" || ids.contains(&u.as_str()))
}

/// The updates in a getUpdates reply, or the API's error description.
fn update_batch(data: &serde_json::Value) -> Result<&[serde_json::Value], String> {
    if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
        return Ok(results.as_slice());
    }
    Err(data
        .get("description")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("response has no result")
        .to_string())
}

/// Turn one getUpdates entry into an `IncomingMessage`.
///
/// Returns `None` for non-text updates and for senders outside the
/// allow-list. The numeric Telegram user id is the session key.
fn parse_update(update: &serde_json::Value, allowed_users: &[String]) -> Option<IncomingMessage> {
    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;
    let from = message.get("from");

    let username = from
        .and_then(|f| f.get("username"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown");
    let user_id = from
        .and_then(|f| f.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string());

    // Check allowlist against both username and numeric ID
    let mut identities = vec![username];
    if let Some(ref id) = user_id {
        identities.push(id.as_str());
    }
    if !check_user_allowed(allowed_users, identities) {
        tracing::warn!(
            "Telegram: ignoring message from unauthorized user: username={username}, user_id={}",
            user_id.as_deref().unwrap_or("unknown")
        );
        return None;
    }

    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string())
        .unwrap_or_default();

    let first_name = from
        .and_then(|f| f.get("first_name"))
        .and_then(serde_json::Value::as_str);

    let mut incoming =
        IncomingMessage::new("telegram", user_id.as_deref().unwrap_or(username), text)
            .with_metadata(serde_json::json!({
                "chat_id": chat_id,
                "username": username,
            }));
    if let Some(name) = first_name {
        incoming = incoming.with_user_name(name);
    }
    Some(incoming)
}

/// Keyboard markup for a response, if it carries one.
fn reply_markup(response: &OutgoingResponse) -> Option<serde_json::Value> {
    if !response.choices.is_empty() {
        let rows: Vec<Vec<serde_json::Value>> = response
            .choices
            .chunks(KEYBOARD_ROW_WIDTH)
            .map(|row| {
                row.iter()
                    .map(|label| serde_json::json!({ "text": label }))
                    .collect()
            })
            .collect();
        return Some(serde_json::json!({
            "keyboard": rows,
            "one_time_keyboard": true,
            "resize_keyboard": true,
        }));
    }
    if response.remove_choices {
        return Some(serde_json::json!({ "remove_keyboard": true }));
    }
    None
}

/// Split a message into chunks of at most `max_chars` characters.
/// Tries to split on newlines, then spaces, then hard-cuts at a char boundary.
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    loop {
        let Some((limit, _)) = remaining.char_indices().nth(max_chars) else {
            chunks.push(remaining.to_string());
            break;
        };

        // Find a good split point
        let window = &remaining[..limit];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(limit);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
        if remaining.is_empty() {
            break;
        }
    }

    chunks
}

// ── Tests ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(allowed: &[&str]) -> TelegramChannel {
        TelegramChannel::new(
            SecretString::from("123:ABC"),
            allowed.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn allowed(list: &[&str], username: &str) -> bool {
        let list: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        check_user_allowed(&list, [username])
    }

    fn update(user_id: i64, username: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": {"id": user_id, "username": username, "first_name": "Ann"},
                "chat": {"id": 555, "type": "private"},
                "text": text
            }
        })
    }

    // ── Basic channel tests ────────────────────────────────────────

    #[test]
    fn telegram_channel_name() {
        assert_eq!(channel(&["*"]).name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        assert_eq!(
            channel(&[]).api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    // ── User allowlist tests ────────────────────────────────────────

    #[test]
    fn telegram_user_allowed_wildcard() {
        assert!(allowed(&["*"], "anyone"));
    }

    #[test]
    fn telegram_user_allowed_specific() {
        assert!(allowed(&["alice", "bob"], "alice"));
        assert!(!allowed(&["alice", "bob"], "eve"));
    }

    #[test]
    fn telegram_user_denied_empty() {
        assert!(!allowed(&[], "anyone"));
    }

    #[test]
    fn telegram_user_exact_match_not_substring() {
        assert!(!allowed(&["alice"], "alice_bot"));
        assert!(!allowed(&["alice"], "malice"));
        assert!(!allowed(&["alice"], ""));
    }

    #[test]
    fn telegram_user_allowed_by_numeric_id_identity() {
        let list = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(check_user_allowed(&list(&["123456789"]), ["unknown", "123456789"]));
        assert!(!check_user_allowed(&list(&["alice", "987654321"]), ["unknown", "123456789"]));
    }

    // ── Update parsing ──────────────────────────────────────────────

    #[test]
    fn parse_update_uses_numeric_id_and_chat_metadata() {
        let msg = parse_update(&update(42, "ann", "/start"), &["*".to_string()]).unwrap();
        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.user_id, "42");
        assert_eq!(msg.user_name.as_deref(), Some("Ann"));
        assert_eq!(msg.content, "/start");
        assert_eq!(msg.metadata["chat_id"], "555");
        assert_eq!(msg.metadata["username"], "ann");
    }

    #[test]
    fn parse_update_drops_unauthorized_sender() {
        assert!(parse_update(&update(42, "ann", "hi"), &["bob".to_string()]).is_none());
        assert!(parse_update(&update(42, "ann", "hi"), &["42".to_string()]).is_some());
    }

    #[test]
    fn parse_update_skips_non_text_updates() {
        let sticker = serde_json::json!({
            "update_id": 11,
            "message": {"from": {"id": 1}, "chat": {"id": 1}, "sticker": {}}
        });
        assert!(parse_update(&sticker, &["*".to_string()]).is_none());
        assert!(parse_update(&serde_json::json!({"update_id": 12}), &["*".to_string()]).is_none());
    }

    #[test]
    fn update_batch_reads_results() {
        let data = serde_json::json!({"ok": true, "result": [update(1, "a", "hi")]});
        assert_eq!(update_batch(&data).unwrap().len(), 1);
    }

    #[test]
    fn update_batch_reports_api_error() {
        let data = serde_json::json!({
            "ok": false,
            "error_code": 409,
            "description": "Conflict: terminated by other getUpdates request"
        });
        assert_eq!(
            update_batch(&data).unwrap_err(),
            "Conflict: terminated by other getUpdates request"
        );
        assert_eq!(
            update_batch(&serde_json::json!({"ok": false})).unwrap_err(),
            "response has no result"
        );
    }

    // ── Keyboards ───────────────────────────────────────────────────

    #[test]
    fn reply_markup_lays_out_rows_of_two() {
        let response = OutgoingResponse::text("Level?").with_choices(["a", "b", "c"]);
        let markup = reply_markup(&response).unwrap();
        assert_eq!(markup["keyboard"][0][0]["text"], "a");
        assert_eq!(markup["keyboard"][0][1]["text"], "b");
        assert_eq!(markup["keyboard"][1][0]["text"], "c");
        assert_eq!(markup["one_time_keyboard"], true);
        assert_eq!(markup["resize_keyboard"], true);
    }

    #[test]
    fn reply_markup_removal_and_none() {
        let removed = reply_markup(&OutgoingResponse::text("bye").removing_choices()).unwrap();
        assert_eq!(removed["remove_keyboard"], true);
        assert!(reply_markup(&OutgoingResponse::text("plain")).is_none());
    }

    // ── Message splitting tests ─────────────────────────────────────

    #[test]
    fn split_message_short() {
        assert_eq!(split_message("Hello", 4096), vec!["Hello"]);
        assert_eq!(split_message("", 4096), vec![""]);
    }

    #[test]
    fn split_message_exact_limit() {
        let chunks = split_message(&"a".repeat(4096), 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4096);
    }

    #[test]
    fn split_message_over_limit_on_newline() {
        let msg = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks, vec!["a".repeat(2000), "b".repeat(3000)]);
    }

    #[test]
    fn split_message_over_limit_on_space() {
        let msg = format!("{} {}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks, vec!["a".repeat(2000), "b".repeat(3000)]);
    }

    #[test]
    fn split_message_no_good_split_point() {
        let chunks = split_message(&"a".repeat(5000), 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    #[test]
    fn split_message_never_cuts_inside_a_character() {
        let chunks = split_message(&"🍎".repeat(5000), 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4096);
        assert_eq!(chunks[1].chars().count(), 904);
    }

    // ── Respond extracts chat_id from metadata ──────────────────────

    #[tokio::test]
    async fn respond_without_chat_id_fails() {
        let msg = IncomingMessage::new("telegram", "user123", "hello");
        let err = channel(&["*"])
            .respond(&msg, OutgoingResponse::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed { .. }));
    }
}
