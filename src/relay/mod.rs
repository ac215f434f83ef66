//! Relay module - forwards Telegram text to OpenRouter and voices the reply.

pub mod engine;
pub mod openrouter;
pub mod selector;
pub mod speech;
pub mod telegram;


pub use engine::RelayEngine;
pub use openrouter::{CatalogError, CompletionError, OpenRouterClient};
pub use selector::{ModelSelector, DEFAULT_MODEL};
pub use speech::{SpeechClient, SpeechError};
pub use telegram::{Messenger, SendError, TelegramClient};
