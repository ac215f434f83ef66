//! The active model shared by every chat.

use std::sync::{Arc, PoisonError, RwLock};

/// Model used until someone picks another one from the menu.
pub const DEFAULT_MODEL: &str = "nvidia/llama-3.1-nemotron-70b-instruct:free";

/// Single-slot store for the active model identifier.
///
/// Clones share the same slot. The selection is process-wide: a model picked
/// in one chat applies to every chat, and the last `set` wins. A text message
/// that is already being relayed keeps the model it read at the start, so a
/// switch racing an in-flight completion only affects later messages.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    current: Arc<RwLock<Arc<str>>>,
}

impl ModelSelector {
    pub fn new(initial: &str) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::from(initial))),
        }
    }

    /// Replace the active model. No validation: an unknown identifier is only
    /// discovered when the completion provider rejects it.
    pub fn set(&self, model: &str) {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::from(model);
    }

    pub fn get(&self) -> Arc<str> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}
