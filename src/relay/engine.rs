//! The three conversation flows: model menu, model selection, text relay.
//!
//! Every flow handles its own failures. Provider errors become either a
//! textual reply or a skipped step, and Telegram send failures end the flow
//! with a warning, so nothing here can stop the dispatcher.

use tracing::{error, info, warn};

use super::openrouter::OpenRouterClient;
use super::selector::ModelSelector;
use super::speech::SpeechClient;
use super::telegram::Messenger;

pub const MENU_PROMPT: &str = "Выберите модель для диалога:";
pub const MENU_UNAVAILABLE: &str = "Не удалось загрузить список моделей.";

pub fn selection_confirmation(model: &str) -> String {
    format!("Вы выбрали модель: {model}\nТеперь можете начать диалог!")
}

pub struct RelayEngine {
    openrouter: OpenRouterClient,
    speech: SpeechClient,
    selector: ModelSelector,
}

impl RelayEngine {
    pub fn new(openrouter: OpenRouterClient, speech: SpeechClient, selector: ModelSelector) -> Self {
        Self {
            openrouter,
            speech,
            selector,
        }
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// `/start`: offer the free models as inline buttons.
    pub async fn show_model_menu<M: Messenger>(&self, out: &M, chat_id: i64, message_id: i64) {
        let models = match self.openrouter.list_free_models().await {
            Ok(models) => models,
            Err(e) => {
                error!("Failed to load model list: {e}");
                Vec::new()
            }
        };

        if models.is_empty() {
            if let Err(e) = out.send_text(chat_id, MENU_UNAVAILABLE, Some(message_id)).await {
                warn!("{e}");
            }
            return;
        }

        info!("📋 Offering {} models in chat {}", models.len(), chat_id);
        if let Err(e) = out
            .send_menu(chat_id, MENU_PROMPT, &models, Some(message_id))
            .await
        {
            warn!("{e}");
        }
    }

    /// Button press: acknowledge, switch the active model, confirm.
    ///
    /// The switch is global; it applies to every chat.
    pub async fn select_model<M: Messenger>(
        &self,
        out: &M,
        callback_id: &str,
        chat_id: i64,
        menu_message_id: Option<i64>,
        payload: Option<&str>,
    ) {
        if let Err(e) = out.answer_callback(callback_id).await {
            warn!("{e}");
        }

        let Some(model) = payload else {
            warn!("Callback {} carried no payload", callback_id);
            return;
        };

        self.selector.set(model);
        info!("🔀 Active model is now {} (chat {})", model, chat_id);

        if let Err(e) = out
            .send_text(chat_id, &selection_confirmation(model), menu_message_id)
            .await
        {
            warn!("{e}");
        }
    }

    /// Plain text: complete with the active model, reply, then voice the reply.
    pub async fn relay_text<M: Messenger>(&self, out: &M, chat_id: i64, message_id: i64, text: &str) {
        let model = self.selector.get();
        let preview: String = text.chars().take(100).collect();
        info!("💬 Chat {} → {}: \"{}\"", chat_id, model, preview);

        let reply = match self.openrouter.complete(&model, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Completion with {} failed: {:?}", model, e);
                e.to_string()
            }
        };

        if let Err(e) = out.send_text(chat_id, &reply, Some(message_id)).await {
            warn!("{e}");
            return;
        }

        let audio = match self.speech.synthesize(&reply).await {
            Ok(audio) => audio,
            Err(e) => {
                error!("Speech synthesis failed: {e}");
                return;
            }
        };

        if let Err(e) = out.send_voice(chat_id, audio, Some(message_id)).await {
            warn!("{e}");
        }
    }
}
