//! Configuration types, read from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig};
use crate::menu::{Decorations, MenuConfig};

/// Value shipped in the sample `.env`; treated as "no key".
const PLACEHOLDER_API_KEY: &str = "your_deepseek_api_key_here";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot name for identification.
    pub name: String,
    /// User ids allowed to run `/stats`.
    pub admin_user_ids: Vec<String>,
    /// Session idle timeout (sessions are pruned after this duration).
    pub session_idle_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "nutrition-bot".to_string(),
            admin_user_ids: Vec::new(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl BotConfig {
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_ids.iter().any(|id| id == user_id)
    }
}

/// Telegram channel settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Usernames or numeric ids; `*` allows everyone.
    pub allowed_users: Vec<String>,
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot: BotConfig,
    /// `None` when `TELEGRAM_BOT_TOKEN` is unset.
    pub telegram: Option<TelegramConfig>,
    /// `None` when no usable API key is set; menus are then unavailable.
    pub llm: Option<LlmConfig>,
    pub menu: MenuConfig,
    /// Run the stdin channel.
    pub enable_cli: bool,
    /// Directory for the daily rolling log file.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram = get("TELEGRAM_BOT_TOKEN").map(|token| TelegramConfig {
            bot_token: SecretString::from(token),
            allowed_users: get("TELEGRAM_ALLOWED_USERS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|| vec!["*".to_string()]),
        });

        let llm = get("DEEPSEEK_API_KEY")
            .filter(|key| key != PLACEHOLDER_API_KEY)
            .map(|key| LlmConfig {
                api_key: SecretString::from(key),
                base_url: get("NUTRITION_BOT_LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: get("NUTRITION_BOT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            });

        let defaults = MenuConfig::default();
        let timeout_secs: u64 = parse_or(
            "NUTRITION_BOT_MENU_TIMEOUT_SECS",
            get("NUTRITION_BOT_MENU_TIMEOUT_SECS"),
            defaults.timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "NUTRITION_BOT_MENU_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let decorate = parse_bool("NUTRITION_BOT_DECORATE_MENU", get("NUTRITION_BOT_DECORATE_MENU"), true)?;
        let menu = MenuConfig {
            timeout: Duration::from_secs(timeout_secs),
            decorations: if decorate {
                Decorations::default()
            } else {
                Decorations::none()
            },
            ..defaults
        };

        let bot = BotConfig {
            admin_user_ids: get("ADMIN_USER_IDS").map(|v| split_list(&v)).unwrap_or_default(),
            ..BotConfig::default()
        };

        let enable_cli = parse_bool("NUTRITION_BOT_CLI", get("NUTRITION_BOT_CLI"), true)?;
        if telegram.is_none() && !enable_cli {
            // Nothing to talk through.
            return Err(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()));
        }

        Ok(Self {
            bot,
            telegram,
            llm,
            menu,
            enable_cli,
            log_dir: get("NUTRITION_BOT_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{v:?}: {e}"),
        }),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(v) = value else {
        return Ok(default);
    };
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{v:?} is not a boolean"),
        }),
    }
}
