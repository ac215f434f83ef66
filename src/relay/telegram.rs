//! Outbound Telegram surface.

use std::future::Future;

use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
    ReplyParameters,
};
use thiserror::Error;
use tracing::info;

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// File name attached to synthesized voice replies.
pub const VOICE_FILE_NAME: &str = "response.ogg";

#[derive(Debug, Error)]
#[error("failed to {action}: {reason}")]
pub struct SendError {
    action: &'static str,
    reason: String,
}

impl SendError {
    pub fn new(action: &'static str, reason: impl ToString) -> Self {
        Self {
            action,
            reason: reason.to_string(),
        }
    }
}

/// What the relay needs from a chat platform.
///
/// Message ids are returned so callers can thread replies.
pub trait Messenger: Send + Sync {
    fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> impl Future<Output = Result<i64, SendError>> + Send;

    /// Send `text` with one inline button per option; each button reports its
    /// own label back as the callback payload.
    fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        options: &[String],
        reply_to: Option<i64>,
    ) -> impl Future<Output = Result<i64, SendError>> + Send;

    fn send_voice(
        &self,
        chat_id: i64,
        voice_data: Vec<u8>,
        reply_to: Option<i64>,
    ) -> impl Future<Output = Result<i64, SendError>> + Send;

    /// Stop the client-side loading indicator on a pressed button.
    fn answer_callback(
        &self,
        callback_id: &str,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn reply_params(msg_id: i64) -> ReplyParameters {
    ReplyParameters::new(MessageId(msg_id as i32))
}

impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<i64, SendError> {
        let mut last_id = 0;
        for (i, chunk) in split_message(text).into_iter().enumerate() {
            let mut request = self.bot.send_message(ChatId(chat_id), chunk);

            // Only the first part threads onto the original message
            if let (0, Some(msg_id)) = (i, reply_to) {
                request = request.reply_parameters(reply_params(msg_id));
            }

            let msg = request
                .await
                .map_err(|e| SendError::new("send message", e))?;
            last_id = msg.id.0 as i64;
        }
        Ok(last_id)
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        options: &[String],
        reply_to: Option<i64>,
    ) -> Result<i64, SendError> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(option_keyboard(options));

        if let Some(msg_id) = reply_to {
            request = request.reply_parameters(reply_params(msg_id));
        }

        request
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| SendError::new("send menu", e))
    }

    async fn send_voice(
        &self,
        chat_id: i64,
        voice_data: Vec<u8>,
        reply_to: Option<i64>,
    ) -> Result<i64, SendError> {
        info!("🔊 Sending voice to chat {} ({} bytes)", chat_id, voice_data.len());

        let input_file = InputFile::memory(voice_data).file_name(VOICE_FILE_NAME);
        let mut request = self.bot.send_voice(ChatId(chat_id), input_file);

        if let Some(msg_id) = reply_to {
            request = request.reply_parameters(reply_params(msg_id));
        }

        request
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| SendError::new("send voice", e))
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), SendError> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .await
            .map(|_| ())
            .map_err(|e| SendError::new("answer callback", e))
    }
}

/// One button per row, label and callback payload both set to the option.
pub fn option_keyboard(options: &[String]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        options
            .iter()
            .map(|option| vec![InlineKeyboardButton::callback(option.clone(), option.clone())]),
    )
}

/// Split text into pieces Telegram will accept, on character boundaries.
pub fn split_message(text: &str) -> Vec<String> {
    if text.chars().count() <= TELEGRAM_MESSAGE_LIMIT {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(TELEGRAM_MESSAGE_LIMIT)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
