//! Post-processing for generated menu text.
//!
//! The model tends to answer in markdown even when asked not to. The chat
//! transport shows plain text, so markup is stripped, blank-line runs are
//! collapsed, day and meal headings get a visual marker, and the result is
//! cut into transport-sized chunks.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum characters per outgoing chunk.
pub const MAX_CHUNK_CHARS: usize = 4000;

/// Upper bound on stripping passes; real input settles in two.
const MAX_STRIP_PASSES: usize = 8;

static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*+•][ \t]+").unwrap());
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__([^_\n]+?)__").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\w*])\*([^*\s](?:[^*\n]*[^*\s])?)\*([^\w*]|$)").unwrap()
});
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w])_([^_\n]+?)_([^\w]|$)").unwrap());
static TRAILING_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static DAY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|day\s+\d+)\b")
        .unwrap()
});
static MEAL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(breakfast|lunch|dinner|snacks?)\b").unwrap());

/// Markers prepended to day and meal lines. Purely cosmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorations {
    pub enabled: bool,
    pub day: String,
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    pub snack: String,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            enabled: true,
            day: "📅".to_string(),
            breakfast: "🍳".to_string(),
            lunch: "🥗".to_string(),
            dinner: "🍽".to_string(),
            snack: "🍎".to_string(),
        }
    }
}

impl Decorations {
    /// Leave lines undecorated.
    pub fn none() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn meal_marker(&self, meal: &str) -> &str {
        match meal.to_ascii_lowercase().as_str() {
            "breakfast" => &self.breakfast,
            "lunch" => &self.lunch,
            "dinner" => &self.dinner,
            _ => &self.snack,
        }
    }
}

fn strip_pass(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "");
    let text = BOLD_STARS.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1$2$3");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1$2$3");
    let text = TRAILING_SPACE.replace_all(&text, "");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Remove headings, bullets, bold/italic markers and collapse blank lines.
///
/// Runs until the text stops changing, so applying it again is a no-op.
pub fn strip_markup(text: &str) -> String {
    let mut current = strip_pass(text);
    for _ in 1..MAX_STRIP_PASSES {
        let next = strip_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Prefix day and meal lines with their marker. Already-decorated lines no
/// longer start with the keyword, so repeated calls do not stack markers.
pub fn decorate(text: &str, decorations: &Decorations) -> String {
    if !decorations.enabled {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if DAY_LINE.is_match(trimmed) {
                format!("{} {trimmed}", decorations.day)
            } else if let Some(caps) = MEAL_LINE.captures(trimmed) {
                format!("{} {trimmed}", decorations.meal_marker(&caps[1]))
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip and decorate raw model output.
pub fn format_menu(raw: &str, decorations: &Decorations) -> String {
    decorate(&strip_markup(raw), decorations)
}

/// Split text into ordered chunks of at most `max_chars` characters.
///
/// Every chunk except the last is exactly `max_chars` long, so a text of `n`
/// characters always gives `ceil(n / max_chars)` chunks. Concatenating them
/// gives back `text`.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((limit, _)) = remaining.char_indices().nth(max_chars) else {
            chunks.push(remaining.to_string());
            break;
        };
        chunks.push(remaining[..limit].to_string());
        remaining = &remaining[limit..];
    }

    chunks
}
