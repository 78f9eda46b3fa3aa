//! Slash-command parsing.

/// What a message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Diet,
    WeeklyMenu,
    Clear,
    Help,
    Stats,
    /// A slash command the bot does not know.
    Unknown(String),
    /// Anything else: an answer to the current question.
    Input(String),
}

/// Parses message content into a `Command`.
pub struct CommandParser;

impl CommandParser {
    /// Parse message content. Commands are case-insensitive and may carry a
    /// `@botname` suffix; trailing arguments are ignored.
    pub fn parse(content: &str) -> Command {
        let trimmed = content.trim();
        let lower = trimmed.to_lowercase();

        // Bare "cancel" works mid-intake, where users tend to type it.
        if lower == "cancel" {
            return Command::Cancel;
        }

        let Some(rest) = lower.strip_prefix('/') else {
            return Command::Input(trimmed.to_string());
        };

        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();

        match name {
            "start" => Command::Start,
            "cancel" | "stop" => Command::Cancel,
            "diet" => Command::Diet,
            "weekly_menu" | "menu" => Command::WeeklyMenu,
            "clear" => Command::Clear,
            "help" | "?" => Command::Help,
            "stats" => Command::Stats,
            _ => Command::Unknown(name.to_string()),
        }
    }
}
