//! Nutrition Bot: calorie intake, diet summaries and AI weekly menus over chat.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
pub mod llm;
pub mod logging;
pub mod menu;
pub mod nutrition;
pub mod store;
