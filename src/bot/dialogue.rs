//! Dialogue controller: routes each message through commands, the intake,
//! the profile store and the menu generator.
//!
//! Every incoming message runs in its own task. The user's session lock is
//! held while the reply is computed, so one user's messages are handled in
//! order, and released before a menu is generated, so a slow LLM call never
//! blocks anyone else.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinSet;

use crate::bot::command::{Command, CommandParser};
use crate::bot::session::{DialogueState, Session, SessionManager};
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse, StatusUpdate};
use crate::config::BotConfig;
use crate::error::Error;
use crate::intake::prompts::{self, NO, UPDATE_DATA, USE_SAVED, YES};
use crate::intake::{Intake, IntakeOutcome, IntakeStep, Profile};
use crate::menu::{MenuGenerator, MenuStatus};
use crate::nutrition::render_diet_summary;
use crate::store::ProfileStore;

/// How often idle sessions are pruned.
const PRUNE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(600);

/// Shared components the bot is built from.
pub struct BotDeps {
    pub store: Arc<dyn ProfileStore>,
    pub menu: Arc<MenuGenerator>,
}

/// What to do once a message has been handled.
enum Reply {
    /// Send these responses.
    Send(Vec<OutgoingResponse>),
    /// Generate a menu for this profile once the session is released.
    Menu(Profile),
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Self::Send(vec![OutgoingResponse::text(content)])
    }

    fn one(response: OutgoingResponse) -> Self {
        Self::Send(vec![response])
    }
}

/// The nutrition bot.
pub struct Bot {
    config: BotConfig,
    deps: BotDeps,
    channels: Arc<ChannelManager>,
    sessions: Arc<SessionManager>,
}

impl Bot {
    pub fn new(config: BotConfig, deps: BotDeps, channels: ChannelManager) -> Self {
        Self {
            config,
            deps,
            channels: Arc::new(channels),
            sessions: Arc::new(SessionManager::new()),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    // ── Main loop ───────────────────────────────────────────────────

    /// Start the channels and handle messages until Ctrl+C or until every
    /// channel stream ends.
    pub async fn run(self: Arc<Self>) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        // Spawn session pruning task
        let sessions = Arc::clone(&self.sessions);
        let idle_timeout = self.config.session_idle_timeout;
        let pruning_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(PRUNE_INTERVAL);
            interval.tick().await; // Skip immediate first tick
            loop {
                interval.tick().await;
                sessions.prune_idle(idle_timeout).await;
            }
        });

        tracing::info!("Bot {} ready and listening", self.config.name);

        let mut tasks = JoinSet::new();
        let mut interrupted = false;

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    interrupted = true;
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            let bot = Arc::clone(&self);
            tasks.spawn(async move { bot.process(message).await });

            while let Some(done) = tasks.try_join_next() {
                if let Err(e) = done {
                    tracing::error!("Message task failed: {e}");
                }
            }
        }

        if interrupted {
            tasks.shutdown().await;
        } else {
            while let Some(done) = tasks.join_next().await {
                if let Err(e) = done {
                    tracing::error!("Message task failed: {e}");
                }
            }
        }

        tracing::info!("Bot shutting down...");
        pruning_handle.abort();
        self.channels.shutdown_all().await?;

        Ok(())
    }

    /// Handle one message and deliver the replies. Internal errors reset the
    /// user's session and send a generic apology.
    pub async fn process(&self, message: IncomingMessage) {
        let responses = match self.handle_message(&message).await {
            Ok(responses) => responses,
            Err(e) => {
                tracing::error!(
                    user_id = %message.user_id,
                    channel = %message.channel,
                    error = %e,
                    "Error handling message"
                );
                self.sessions.reset(&message.user_id).await;
                vec![OutgoingResponse::text(prompts::INTERNAL_ERROR).removing_choices()]
            }
        };

        for response in responses {
            if let Err(e) = self.channels.respond(&message, response).await {
                tracing::warn!(user_id = %message.user_id, error = %e, "Failed to send reply");
                break;
            }
        }
    }

    // ── Message dispatch ────────────────────────────────────────────

    /// Compute the replies to one message.
    pub async fn handle_message(
        &self,
        message: &IncomingMessage,
    ) -> Result<Vec<OutgoingResponse>, Error> {
        let command = CommandParser::parse(&message.content);

        tracing::debug!(
            "Received message from {} on {} ({} chars, {:?})",
            message.user_id,
            message.channel,
            message.content.chars().count(),
            message.kind
        );

        let reply = match command {
            // Commands that do not touch the dialogue state.
            Command::Diet => self.process_diet(&message.user_id).await?,
            Command::WeeklyMenu => self.process_weekly_menu(&message.user_id).await?,
            Command::Help => Reply::text(prompts::HELP),
            Command::Stats => self.process_stats(&message.user_id).await?,
            Command::Unknown(_) => Reply::text(prompts::UNKNOWN_COMMAND),
            command => {
                let session = self.sessions.get_or_create(&message.user_id).await;
                let mut session = session.lock().await;
                session.touch();
                let before = session.state.name();

                let reply = match command {
                    Command::Start => self.process_start(&mut session, message).await?,
                    Command::Cancel => self.process_cancel(&mut session),
                    Command::Clear => self.process_clear(&mut session).await?,
                    Command::Input(text) => self.process_input(&mut session, &text).await?,
                    _ => Reply::text(prompts::UNKNOWN_COMMAND),
                };

                let after = session.state.name();
                if before != after {
                    tracing::debug!(user_id = %message.user_id, from = before, to = after, "Dialogue state changed");
                }
                reply
            }
        };

        match reply {
            Reply::Send(responses) => Ok(responses),
            Reply::Menu(profile) => Ok(self.generate_menu(message, &profile).await),
        }
    }

    // ── Commands ────────────────────────────────────────────────────

    async fn process_start(
        &self,
        session: &mut Session,
        message: &IncomingMessage,
    ) -> Result<Reply, Error> {
        let welcome = OutgoingResponse::text(prompts::welcome(message.user_name.as_deref()));

        if self.deps.store.get(&session.user_id).await?.is_some() {
            session.state = DialogueState::ReuseChoice;
            return Ok(Reply::Send(vec![welcome, reuse_prompt()]));
        }

        session.state = DialogueState::Intake(Intake::new());
        Ok(Reply::Send(vec![welcome, ask(IntakeStep::Gender)]))
    }

    fn process_cancel(&self, session: &mut Session) -> Reply {
        if let DialogueState::Intake(intake) = &mut session.state {
            intake.cancel();
        }
        session.reset();
        Reply::one(OutgoingResponse::text(prompts::CANCELLED).removing_choices())
    }

    async fn process_diet(&self, user_id: &str) -> Result<Reply, Error> {
        Ok(match self.deps.store.get(user_id).await? {
            Some(profile) => Reply::text(render_diet_summary(&profile)),
            None => Reply::text(prompts::MISSING_PROFILE),
        })
    }

    async fn process_weekly_menu(&self, user_id: &str) -> Result<Reply, Error> {
        Ok(match self.deps.store.get(user_id).await? {
            Some(profile) => Reply::Menu(profile),
            None => Reply::text(prompts::MISSING_PROFILE),
        })
    }

    async fn process_clear(&self, session: &mut Session) -> Result<Reply, Error> {
        let deleted = self.deps.store.delete(&session.user_id).await?;
        session.reset();
        if deleted {
            tracing::info!(user_id = %session.user_id, "Deleted stored profile");
        }
        let text = if deleted {
            prompts::DATA_CLEARED
        } else {
            prompts::NOTHING_TO_CLEAR
        };
        Ok(Reply::one(OutgoingResponse::text(text).removing_choices()))
    }

    async fn process_stats(&self, user_id: &str) -> Result<Reply, Error> {
        if !self.config.is_admin(user_id) {
            return Ok(Reply::text(prompts::ADMIN_ONLY));
        }
        let profiles = self.deps.store.count().await?;
        let active = self.sessions.active_count().await;
        let known = self.sessions.len().await;
        Ok(Reply::text(format!(
            "📈 Bot statistics\n\nStored profiles: {profiles}\nActive conversations: {active}\nKnown sessions: {known}"
        )))
    }

    // ── Free-text input ─────────────────────────────────────────────

    async fn process_input(&self, session: &mut Session, text: &str) -> Result<Reply, Error> {
        match &mut session.state {
            DialogueState::Idle => Ok(Reply::text(prompts::IDLE_HINT)),
            DialogueState::ReuseChoice => self.process_reuse_choice(session, text).await,
            DialogueState::Intake(intake) => {
                let outcome = intake
                    .handle(text)
                    .map_err(|e| Error::Dialogue(e.to_string()))?;
                self.process_intake_outcome(session, outcome).await
            }
            DialogueState::MenuConfirm => self.process_menu_confirm(session, text).await,
        }
    }

    async fn process_reuse_choice(&self, session: &mut Session, text: &str) -> Result<Reply, Error> {
        if matches_choice(text, USE_SAVED) {
            let Some(profile) = self.deps.store.get(&session.user_id).await? else {
                // Cleared in the meantime: fall back to a fresh intake.
                session.state = DialogueState::Intake(Intake::new());
                return Ok(Reply::one(ask(IntakeStep::Gender)));
            };
            session.state = DialogueState::MenuConfirm;
            return Ok(Reply::Send(vec![
                OutgoingResponse::text(render_diet_summary(&profile)).removing_choices(),
                menu_confirm_prompt(),
            ]));
        }
        if matches_choice(text, UPDATE_DATA) {
            session.state = DialogueState::Intake(Intake::new());
            return Ok(Reply::one(ask(IntakeStep::Gender)));
        }
        Ok(Reply::one(reuse_prompt()))
    }

    async fn process_intake_outcome(
        &self,
        session: &mut Session,
        outcome: IntakeOutcome,
    ) -> Result<Reply, Error> {
        match outcome {
            IntakeOutcome::Advanced(step) => Ok(Reply::one(ask(step))),
            IntakeOutcome::Rejected(e) => {
                let step = match &session.state {
                    DialogueState::Intake(intake) => intake.step(),
                    _ => IntakeStep::Gender,
                };
                Ok(Reply::one(
                    OutgoingResponse::text(e.to_string()).with_choices(prompts::choices(step)),
                ))
            }
            IntakeOutcome::Completed(inputs) => {
                let profile = Profile::complete(inputs);
                self.deps.store.put(&session.user_id, profile.clone()).await?;
                tracing::info!(
                    user_id = %session.user_id,
                    calorie_target = profile.calorie_target,
                    "Intake completed"
                );
                session.state = DialogueState::MenuConfirm;
                Ok(Reply::Send(vec![
                    OutgoingResponse::text(render_diet_summary(&profile)).removing_choices(),
                    menu_confirm_prompt(),
                ]))
            }
            IntakeOutcome::Finished => {
                session.reset();
                Ok(Reply::text(prompts::IDLE_HINT))
            }
        }
    }

    async fn process_menu_confirm(&self, session: &mut Session, text: &str) -> Result<Reply, Error> {
        if matches_choice(text, YES) {
            session.reset();
            return Ok(match self.deps.store.get(&session.user_id).await? {
                Some(profile) => Reply::Menu(profile),
                None => Reply::one(OutgoingResponse::text(prompts::MISSING_PROFILE).removing_choices()),
            });
        }
        if matches_choice(text, NO) {
            session.reset();
            return Ok(Reply::one(
                OutgoingResponse::text(prompts::MENU_DECLINED).removing_choices(),
            ));
        }
        Ok(Reply::one(menu_confirm_prompt()))
    }

    // ── Menu ────────────────────────────────────────────────────────

    /// Generate a menu. The progress notice goes out right away; the menu
    /// chunks are returned in order.
    async fn generate_menu(
        &self,
        message: &IncomingMessage,
        profile: &Profile,
    ) -> Vec<OutgoingResponse> {
        let menu = &self.deps.menu;

        if menu.is_available() {
            let notice = OutgoingResponse::text(prompts::MENU_IN_PROGRESS).removing_choices();
            if let Err(e) = self.channels.respond(message, notice).await {
                tracing::warn!(user_id = %message.user_id, error = %e, "Failed to send progress notice");
            }
            if let Err(e) = self
                .channels
                .send_status(
                    &message.channel,
                    StatusUpdate::Thinking("Generating menu".into()),
                    &message.metadata,
                )
                .await
            {
                tracing::debug!(user_id = %message.user_id, error = %e, "Failed to send typing status");
            }
        }

        let reply = menu.generate(profile).await;
        if reply.status != MenuStatus::Generated {
            tracing::info!(user_id = %message.user_id, status = ?reply.status, "Menu not generated");
        }

        let mut responses: Vec<OutgoingResponse> =
            reply.chunks.into_iter().map(OutgoingResponse::text).collect();
        if let Some(last) = responses.last_mut() {
            last.remove_choices = true;
        }
        responses
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Ask the question for `step`, with its option keyboard or with the
/// previous keyboard removed.
fn ask(step: IntakeStep) -> OutgoingResponse {
    let response = OutgoingResponse::text(prompts::question(step));
    let choices = prompts::choices(step);
    if choices.is_empty() {
        response.removing_choices()
    } else {
        response.with_choices(choices)
    }
}

fn reuse_prompt() -> OutgoingResponse {
    OutgoingResponse::text(prompts::REUSE_PROMPT).with_choices([USE_SAVED, UPDATE_DATA])
}

fn menu_confirm_prompt() -> OutgoingResponse {
    OutgoingResponse::text(prompts::MENU_CONFIRM_PROMPT).with_choices([YES, NO])
}

fn matches_choice(input: &str, choice: &str) -> bool {
    input.trim().eq_ignore_ascii_case(choice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_enum_step_offers_choices() {
        let r = ask(IntakeStep::ActivityLevel);
        assert_eq!(r.choices.len(), 5);
        assert!(!r.remove_choices);
    }

    #[test]
    fn ask_numeric_step_removes_keyboard() {
        let r = ask(IntakeStep::Age);
        assert!(r.choices.is_empty());
        assert!(r.remove_choices);
    }

    #[test]
    fn choice_matching_ignores_case_and_padding() {
        assert!(matches_choice("  yes ", YES));
        assert!(matches_choice("USE SAVED DATA", USE_SAVED));
        assert!(!matches_choice("yess", YES));
    }
}
