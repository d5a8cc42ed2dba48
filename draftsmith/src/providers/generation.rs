//! Text and image generation provider
//!
//! One OpenAI-compatible client covers both concerns; the trait keeps stages
//! testable against mocks and leaves room for other vendors.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Response-format constraint passed to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Per-call completion parameters
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub format: ResponseFormat,
    pub temperature: f32,
}

impl CompletionOptions {
    pub fn text(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            format: ResponseFormat::Text,
            temperature: 0.7,
        }
    }

    pub fn json(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            format: ResponseFormat::Json,
            temperature: 0.4,
        }
    }
}

/// Inline binary image returned by the provider
#[derive(Clone)]
pub struct InlineImage {
    pub mime: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime", &self.mime)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl InlineImage {
    /// Embeddable data-URI form
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.data))
    }
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run a text completion; returns the raw response text
    async fn complete(&self, system: &str, user: &str, opts: &CompletionOptions)
        -> Result<String>;

    /// Generate an image; Ok(None) means the provider returned no usable
    /// payload, which callers treat as a fallback trigger rather than an error
    async fn generate_image(&self, prompt: &str, model: &str) -> Result<Option<InlineImage>>;
}

/// Client for OpenAI-compatible /chat/completions and /images/generations
#[derive(Debug)]
pub struct OpenAiCompatClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    response_format: &'static str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[async_trait]
impl GenerationProvider for OpenAiCompatClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        opts: &CompletionOptions,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatRequest {
            model: &opts.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: opts.temperature,
            response_format: match opts.format {
                ResponseFormat::Json => Some(ChatResponseFormat {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
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
                "completion endpoint returned {}: {}",
                status, error_text
            )));
        }

        let result: ChatResponse = resp.json().await?;
        result
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                GenerationError::ProviderParse("completion response had no content".to_string())
            })
    }

    async fn generate_image(&self, prompt: &str, model: &str) -> Result<Option<InlineImage>> {
        let url = format!("{}/images/generations", self.base_url);

        let request_body = ImageRequest {
            model,
            prompt,
            n: 1,
            response_format: "b64_json",
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
                "image endpoint returned {}: {}",
                status, error_text
            )));
        }

        let result: ImageResponse = resp.json().await?;
        let Some(encoded) = result.data.into_iter().find_map(|d| d.b64_json) else {
            return Ok(None);
        };

        let data = BASE64.decode(encoded.trim()).map_err(|e| {
            GenerationError::ProviderParse(format!("image payload was not valid base64: {}", e))
        })?;
        if data.is_empty() {
            return Ok(None);
        }

        Ok(Some(InlineImage {
            mime: "image/png".to_string(),
            data,
        }))
    }
}
