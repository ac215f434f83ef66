//! OpenRouter client: free-model catalog and chat completions.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Identifiers of no-cost models carry this suffix.
pub const FREE_MODEL_MARKER: &str = ":free";

/// Max models offered in the selection menu.
pub const MAX_MENU_MODELS: usize = 8;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure to fetch the model catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("model listing returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model listing request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("model listing response could not be parsed: {0}")]
    Parse(#[source] reqwest::Error),
}

/// Failure to obtain a completion.
///
/// The `Display` output is the text shown to the user in place of a reply.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Ошибка API: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Запрос к API не был завершен вовремя. Попробуйте снова позже.")]
    Timeout,
    #[error("Ошибка при запросе: {0}")]
    Http(#[source] reqwest::Error),
    /// The provider answered 200 without `choices[0].message.content`.
    #[error("Ошибка в ответе ИИ")]
    Malformed,
}

impl CompletionError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

#[derive(Deserialize)]
struct ModelListing {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

pub struct OpenRouterClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> reqwest::Result<Self> {
        Self::with_endpoint(api_key, OPENROUTER_API_URL, REQUEST_TIMEOUT)
    }

    /// Create a client against a custom base URL, e.g. "http://localhost:8080/api/v1".
    pub fn with_endpoint(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch the provider's model list and keep the first free ones.
    pub async fn list_free_models(&self) -> Result<Vec<String>, CatalogError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(CatalogError::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let listing: ModelListing = response.json().await.map_err(CatalogError::Parse)?;
        let total = listing.data.len();
        let models = free_models(listing.data.into_iter().map(|m| m.id));
        debug!("Catalog: {} models, {} offered", total, models.len());
        Ok(models)
    }

    /// Send `text` as a single user message to `model` and return the reply.
    pub async fn complete(&self, model: &str, text: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: text,
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(CompletionError::from_transport)?;

        info!("OpenRouter response: {}", status.as_u16());
        debug!("OpenRouter body: {}", body);

        if status != StatusCode::OK {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        extract_reply(&body)
    }
}

/// Keep identifiers carrying the free-tier marker, in provider order, at most
/// [`MAX_MENU_MODELS`] of them.
pub fn free_models<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    ids.into_iter()
        .filter(|id| id.contains(FREE_MODEL_MARKER))
        .take(MAX_MENU_MODELS)
        .collect()
}

fn extract_reply(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|_| CompletionError::Malformed)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(CompletionError::Malformed)
}
