use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use teloxide::prelude::*;
use teloxide::types::MessageEntityKind;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use relaybot::config::Config;
use relaybot::relay::{ModelSelector, OpenRouterClient, RelayEngine, SpeechClient, TelegramClient};

/// Connect and read timeout for the Bot API itself.
const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    /// Choose the model for the conversation.
    Start,
}

struct BotState {
    engine: RelayEngine,
    telegram: TelegramClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    // Setup logging
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("relaybot.log"))
        .context("failed to open log file")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting relaybot...");

    let http = teloxide::net::default_reqwest_settings()
        .connect_timeout(TELEGRAM_TIMEOUT)
        .timeout(TELEGRAM_TIMEOUT)
        .build()
        .context("failed to build Telegram HTTP client")?;
    let bot = Bot::with_client(&config.telegram_token, http);

    match bot.get_me().await {
        Ok(me) => info!("Bot user ID: {}, username: @{}", me.id, me.username()),
        Err(e) => warn!("Failed to get bot info: {e}"),
    }

    let openrouter = OpenRouterClient::new(config.openrouter_api_key.clone())
        .context("failed to build OpenRouter client")?;
    let speech = SpeechClient::new(config.openai_api_key.clone())
        .context("failed to build speech client")?;

    let state = Arc::new(BotState {
        engine: RelayEngine::new(openrouter, speech, ModelSelector::default()),
        telegram: TelegramClient::new(bot.clone()),
    });

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(Update::filter_message().endpoint(handle_text));

    info!("Bot is running with AI replies and voice messages");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            info!("/start in chat {}", msg.chat.id);
            state
                .engine
                .show_model_menu(&state.telegram, msg.chat.id.0, msg.id.0 as i64)
                .await;
        }
    }
    Ok(())
}

async fn handle_callback(query: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    // Inaccessible menus still carry the chat; a missing one means a private chat
    let (chat_id, menu_message_id) = match query.message.as_ref() {
        Some(menu) => (menu.chat().id.0, Some(menu.id().0 as i64)),
        None => (query.from.id.0 as i64, None),
    };

    state
        .engine
        .select_model(
            &state.telegram,
            &query.id.0,
            chat_id,
            menu_message_id,
            query.data.as_deref(),
        )
        .await;
    Ok(())
}

async fn handle_text(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Unknown commands are not relayed
    if starts_with_command(&msg) {
        return Ok(());
    }

    state
        .engine
        .relay_text(&state.telegram, msg.chat.id.0, msg.id.0 as i64, text)
        .await;
    Ok(())
}

fn starts_with_command(msg: &Message) -> bool {
    msg.entities().is_some_and(|entities| {
        entities
            .iter()
            .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
    })
}
