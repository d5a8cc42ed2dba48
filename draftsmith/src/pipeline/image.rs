//! Cover image stage: describe, generate, fall back
//!
//! Two provider calls (prompt authoring, then image generation) with a
//! two-level fallback. The stage never returns an error: the caller always
//! gets an embeddable reference, worst case a deterministic URL against a
//! public image service built from the same prompt text.

use draftsmith_sdk::log_warning;

use crate::config::ModelSettings;
use crate::providers::{CompletionOptions, GenerationProvider};

const PROMPT_SYSTEM: &str = "You write concise prompts for image generation models. \
One vivid sentence, concrete subject, no text in the image. Respond with the prompt only.";

const FALLBACK_BASE: &str = "https://image.pollinations.ai/prompt";

/// How the reference was produced, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverImageSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct CoverImage {
    pub reference: String,
    pub source: CoverImageSource,
}

/// Deterministic fallback URL for a prompt: same prompt, same URL.
pub fn fallback_image_url(prompt: &str) -> String {
    format!(
        "{}/{}?width=1200&height=630&nologo=true",
        FALLBACK_BASE,
        urlencoding::encode(prompt.trim())
    )
}

fn default_prompt(topic: &str) -> String {
    format!(
        "A clean editorial illustration representing {}, modern flat style, soft palette",
        topic.trim()
    )
}

/// Produce a cover image reference for the topic. Never returns an error;
/// the worst case is the deterministic fallback URL.
pub async fn generate_cover_image(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    topic: &str,
) -> CoverImage {
    // Level 0: author the image prompt; a failure here just means we use a
    // stock description of the topic.
    let prompt = match provider
        .complete(
            PROMPT_SYSTEM,
            &format!("Write an image prompt for a blog cover about: {}", topic),
            &CompletionOptions {
                temperature: 0.8,
                ..CompletionOptions::text(&models.fast)
            },
        )
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) | Err(_) => default_prompt(topic),
    };

    // Level 1: inline image from the primary provider
    match provider.generate_image(&prompt, &models.image).await {
        Ok(Some(image)) => CoverImage {
            reference: image.to_data_uri(),
            source: CoverImageSource::Generated,
        },
        Ok(None) => {
            log_warning!("image provider returned no payload, using fallback URL");
            CoverImage {
                reference: fallback_image_url(&prompt),
                source: CoverImageSource::Fallback,
            }
        }
        Err(e) => {
            // Level 2: deterministic URL against the public service
            log_warning!("image generation failed ({}), using fallback URL", e);
            CoverImage {
                reference: fallback_image_url(&prompt),
                source: CoverImageSource::Fallback,
            }
        }
    }
}
