//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Offered choices are printed as a numbered list; typing the number picks
//! that choice.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;

/// User id for the single local user.
pub const CLI_USER_ID: &str = "local-user";

/// A simple CLI channel that reads from stdin and writes to stdout.
#[derive(Default)]
pub struct CliChannel {
    last_choices: Arc<Mutex<Vec<String>>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Map a typed line to an `IncomingMessage`, resolving `1`, `2`, ... against
/// the last offered choices.
fn line_to_message(line: &str, choices: &[String]) -> IncomingMessage {
    let picked = line
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i));

    match picked {
        Some(choice) => IncomingMessage::new("cli", CLI_USER_ID, choice.as_str()).as_selection(),
        None => IncomingMessage::new("cli", CLI_USER_ID, line),
    }
}

fn render(response: &OutgoingResponse) -> String {
    let mut out = response.content.clone();
    for (i, choice) in response.choices.iter().enumerate() {
        out.push_str(&format!("\n  {}. {choice}", i + 1));
    }
    out
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let last_choices = Arc::clone(&self.last_choices);

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let msg = match last_choices.lock() {
                            Ok(choices) => line_to_message(line, &choices),
                            Err(_) => line_to_message(line, &[]),
                        };
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}\n", render(&response));
        if !response.choices.is_empty() || response.remove_choices {
            if let Ok(mut last) = self.last_choices.lock() {
                *last = response.choices;
            }
        }
        eprint!("> ");
        Ok(())
    }

    async fn send_status(
        &self,
        status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        let StatusUpdate::Thinking(msg) = status;
        eprintln!("⏳ {}", msg);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
