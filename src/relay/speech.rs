//! Text-to-speech using the OpenAI audio API.
//!
//! Audio stays in memory and is handed straight to the voice upload.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::openrouter::REQUEST_TIMEOUT;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

pub const SPEECH_MODEL: &str = "tts-1";
pub const SPEECH_VOICE: &str = "alloy";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("speech synthesis returned no audio")]
    Empty,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'static str,
    input: &'a str,
    voice: &'static str,
}

/// TTS client for the OpenAI speech endpoint.
pub struct SpeechClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl SpeechClient {
    pub fn new(api_key: String) -> reqwest::Result<Self> {
        Self::with_endpoint(api_key, OPENAI_API_URL, REQUEST_TIMEOUT)
    }

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

    /// Generate speech from text, returning the raw audio bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let preview: String = text.chars().take(50).collect();
        info!("TTS: \"{}\"", preview);

        let response = self
            .http
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest {
                model: SPEECH_MODEL,
                input: text,
                voice: SPEECH_VOICE,
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::Empty);
        }

        debug!("Got {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}
