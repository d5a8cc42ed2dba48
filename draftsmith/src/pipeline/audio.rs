//! Audio narration stage: script → speech → upload
//!
//! A strictly sequential three-step chain. Any step failing aborts the
//! chain with a stage-specific error; a partial audio URL is never produced.

use uuid::Uuid;

use crate::config::ModelSettings;
use crate::error::{GenerationError, Result};
use crate::providers::{BlobStore, CompletionOptions, GenerationProvider, SpeechProvider};

const SCRIPT_SYSTEM: &str = "You turn written articles into spoken narration scripts. \
Plain text only, no markdown, no stage directions. Natural spoken rhythm.";

fn build_script_prompt(content: &str) -> String {
    format!(
        r#"Turn this article into a narration script.

Structure:
- A one-or-two sentence intro that hooks the listener.
- Three or four of the article's key points, summarized conversationally.
- A short outro that wraps up.

Target 400-500 words. Plain text only: no markdown syntax, no headings, no lists.

Article:

{}"#,
        content
    )
}

/// Derive the spoken-style script for an article
pub async fn build_narration_script(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    content: &str,
) -> Result<String> {
    let opts = CompletionOptions::text(&models.standard);
    let script = provider
        .complete(SCRIPT_SYSTEM, &build_script_prompt(content), &opts)
        .await
        .map_err(|e| GenerationError::ProviderCall(format!("narration script: {}", e)))?;

    let script = script.trim().to_string();
    if script.is_empty() {
        return Err(GenerationError::ProviderParse(
            "narration script came back empty".to_string(),
        ));
    }
    Ok(script)
}

/// Run the full chain for a post and return the stored audio URL.
/// The caller records the URL on the post only after this returns Ok.
pub async fn generate_narration(
    generation: &dyn GenerationProvider,
    speech: &dyn SpeechProvider,
    blobs: &dyn BlobStore,
    models: &ModelSettings,
    post_id: &Uuid,
    content: &str,
) -> Result<String> {
    let script = build_narration_script(generation, models, content).await?;

    let audio = speech
        .synthesize(&script, &models.speech, &models.voice)
        .await
        .map_err(|e| GenerationError::ProviderCall(format!("speech synthesis: {}", e)))?;

    let name = format!("narration-{}.mp3", post_id);
    let url = blobs
        .put(&name, &audio, "audio/mpeg")
        .await
        .map_err(|e| GenerationError::ProviderCall(format!("audio upload: {}", e)))?;

    Ok(url)
}
