//! Per-user dialogue sessions.
//!
//! Each user gets one `Session` behind its own mutex, so messages from one
//! user are handled in order while different users proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::intake::Intake;

/// Where a user is in the conversation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogueState {
    /// No flow in progress.
    #[default]
    Idle,
    /// A stored profile exists; waiting for "use saved" or "update".
    ReuseChoice,
    /// Answering the intake questions.
    Intake(Intake),
    /// Profile done; waiting for yes/no on generating a menu.
    MenuConfirm,
}

impl DialogueState {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ReuseChoice => "reuse_choice",
            Self::Intake(_) => "intake",
            Self::MenuConfirm => "menu_confirm",
        }
    }
}

/// One user's conversation state.
#[derive(Debug)]
pub struct Session {
    pub user_id: String,
    pub state: DialogueState,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: DialogueState::Idle,
            last_active_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// Drop any flow in progress.
    pub fn reset(&mut self) {
        self.state = DialogueState::Idle;
        self.touch();
    }
}

/// Owns every live session.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the user's session, creating an idle one on first contact.
    pub async fn get_or_create(&self, user_id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(user_id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(user_id)))),
        )
    }

    /// Reset a user's session to idle, if one exists.
    pub async fn reset(&self, user_id: &str) {
        let session = self.sessions.read().await.get(user_id).cloned();
        if let Some(session) = session {
            session.lock().await.reset();
        }
    }

    /// Number of sessions with a flow in progress. A session locked by a
    /// running handler counts as active.
    pub async fn active_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| match session.try_lock() {
                Ok(s) => s.state != DialogueState::Idle,
                Err(_) => true,
            })
            .count()
    }

    /// Number of known users with a session.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `idle_timeout`. A session a handler
    /// has fetched (still referenced outside the map) or locked is kept.
    /// Returns how many were removed.
    pub async fn prune_idle(&self, idle_timeout: Duration) -> usize {
        let Ok(timeout) = chrono::Duration::from_std(idle_timeout) else {
            return 0;
        };
        let cutoff = Utc::now() - timeout;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            if Arc::strong_count(session) > 1 {
                return true;
            }
            match session.try_lock() {
                Ok(s) => s.last_active_at >= cutoff,
                Err(_) => true,
            }
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
        }
        pruned
    }
}
