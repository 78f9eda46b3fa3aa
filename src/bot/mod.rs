//! Conversation handling: command parsing, per-user sessions and the
//! dialogue controller that ties them to the store and menu generator.

pub mod command;
pub mod dialogue;
pub mod session;

pub use command::{Command, CommandParser};
pub use dialogue::{Bot, BotDeps};
pub use session::{DialogueState, Session, SessionManager};
