//! Text-to-speech provider

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{GenerationError, Result};

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize spoken audio for a plain-text script; returns encoded bytes
    async fn synthesize(&self, script: &str, model: &str, voice: &str) -> Result<Vec<u8>>;
}

/// Client for an OpenAI-compatible /audio/speech endpoint
#[derive(Debug)]
pub struct OpenAiSpeechClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiSpeechClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechClient {
    async fn synthesize(&self, script: &str, model: &str, voice: &str) -> Result<Vec<u8>> {
        let url = format!("{}/audio/speech", self.base_url);

        let request_body = SpeechRequest {
            model,
            input: script,
            voice,
            response_format: "mp3",
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::ProviderCall(format!(
                "speech endpoint returned {}: {}",
                status, error_text
            )));
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::ProviderParse(
                "speech endpoint returned an empty audio payload".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }
}
