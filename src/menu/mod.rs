//! Weekly menu generation.
//!
//! One LLM request per menu. The reply is stripped of markup, decorated, and
//! split into chunks the chat transport can deliver.

pub mod format;
pub mod generator;
pub mod prompt;

pub use format::{Decorations, MAX_CHUNK_CHARS, chunk_text, format_menu, strip_markup};
pub use generator::{MenuConfig, MenuGenerator, MenuReply, MenuStatus};
