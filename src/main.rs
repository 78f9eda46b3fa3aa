use std::sync::Arc;

use anyhow::Context;

use nutrition_bot::bot::{Bot, BotDeps};
use nutrition_bot::channels::{ChannelManager, CliChannel, TelegramChannel};
use nutrition_bot::config::AppConfig;
use nutrition_bot::llm::create_provider;
use nutrition_bot::menu::MenuGenerator;
use nutrition_bot::store::{InMemoryProfileStore, ProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    // Held until exit so buffered file logs are flushed.
    let _log_guard = nutrition_bot::logging::init(config.log_dir.as_deref())
        .context("failed to initialize logging")?;

    eprintln!("🍎 Nutrition Bot v{}", env!("CARGO_PKG_VERSION"));

    // ── LLM ─────────────────────────────────────────────────────────────
    let llm = match &config.llm {
        Some(llm_config) => {
            eprintln!("   Model: {} ({})", llm_config.model, llm_config.base_url);
            Some(create_provider(llm_config)?)
        }
        None => {
            eprintln!("   Model: none (weekly menus disabled)");
            eprintln!("   export DEEPSEEK_API_KEY=sk-... to enable them");
            tracing::warn!("DEEPSEEK_API_KEY not set, menu generation is unavailable");
            None
        }
    };
    eprintln!("   Menu timeout: {}s", config.menu.timeout.as_secs());

    let menu = Arc::new(MenuGenerator::new(llm, config.menu.clone()));
    let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());

    // ── Channels ────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();

    if let Some(telegram) = &config.telegram {
        channels.add(Arc::new(TelegramChannel::new(
            telegram.bot_token.clone(),
            telegram.allowed_users.clone(),
        )));
        eprintln!("   Telegram: enabled (allowed: {})", telegram.allowed_users.join(", "));
    } else {
        eprintln!("   Telegram: disabled (TELEGRAM_BOT_TOKEN not set)");
    }

    if config.enable_cli {
        channels.add(Arc::new(CliChannel::new()));
        eprintln!("   CLI: enabled. Type /start and press Enter.\n");
    }

    let bot = Arc::new(Bot::new(
        config.bot.clone(),
        BotDeps { store, menu },
        channels,
    ));

    bot.run().await?;

    Ok(())
}
