//! Shared mock providers for pipeline tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use draftsmith::config::{ModelSettings, PipelineSettings};
use draftsmith::error::{GenerationError, Result};
use draftsmith::models::{ResearchContext, ResearchHit};
use draftsmith::providers::{
    BlobStore, CompletionOptions, GenerationProvider, InlineImage, ResearchProvider, SearchDepth,
    SpeechProvider,
};

pub const OUTLINE_HEADINGS: [&str; 5] = [
    "Key Takeaways",
    "Why Agents Change Content Work",
    "Adoption Patterns",
    "Tooling Landscape",
    "FAQ",
];

pub fn models() -> ModelSettings {
    ModelSettings {
        fast: "mock-fast".to_string(),
        standard: "mock-standard".to_string(),
        premium: "mock-premium".to_string(),
        image: "mock-image".to_string(),
        speech: "mock-speech".to_string(),
        voice: "mock-voice".to_string(),
    }
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        section_concurrency: 2,
        seo_deep_analysis: false,
    }
}

pub fn outline_json() -> String {
    let sections: Vec<String> = OUTLINE_HEADINGS
        .iter()
        .map(|h| format!(r#"{{"heading": "{}", "points": ["point one", "point two"]}}"#, h))
        .collect();
    format!(
        r#"{{"title": "AI Agents at Work", "sections": [{}]}}"#,
        sections.join(", ")
    )
}

/// How the mock should answer image generation calls
#[derive(Clone)]
pub enum ImageBehavior {
    Inline(Vec<u8>),
    Empty,
    Error,
}

/// Scripted generation provider. Dispatches on the system prompt the
/// pipeline sends for each stage.
pub struct MockGeneration {
    /// Headings that should fail during section drafting
    pub fail_headings: HashSet<String>,
    /// When true, later-dispatched sections complete first
    pub reverse_completion: bool,
    pub image: ImageBehavior,
    pub in_flight_sections: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub completion_order: Mutex<Vec<String>>,
}

impl Default for MockGeneration {
    fn default() -> Self {
        Self {
            fail_headings: HashSet::new(),
            reverse_completion: false,
            image: ImageBehavior::Empty,
            in_flight_sections: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completion_order: Mutex::new(Vec::new()),
        }
    }
}

impl MockGeneration {
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn heading_from_prompt(user: &str) -> Option<String> {
        user.lines()
            .find(|l| l.starts_with("Section heading: "))
            .map(|l| l.trim_start_matches("Section heading: ").trim().to_string())
    }

    async fn draft_section(&self, user: &str) -> Result<String> {
        let heading = Self::heading_from_prompt(user).unwrap_or_default();

        let now = self.in_flight_sections.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.reverse_completion {
            // Earlier sections sleep longer, so batch-internal completion
            // order is the reverse of dispatch order
            let idx = OUTLINE_HEADINGS
                .iter()
                .position(|h| *h == heading)
                .unwrap_or(0);
            let delay = (OUTLINE_HEADINGS.len() - idx) as u64 * 20;
            tokio::time::sleep(Duration::from_millis(delay)).await;
        } else {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        self.in_flight_sections.fetch_sub(1, Ordering::SeqCst);
        self.completion_order.lock().unwrap().push(heading.clone());

        if self.fail_headings.contains(&heading) {
            return Err(GenerationError::ProviderCall(format!(
                "mock refused to draft \"{}\"",
                heading
            )));
        }
        Ok(format!("Body for {} [1]", heading))
    }
}

#[async_trait]
impl GenerationProvider for MockGeneration {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        _opts: &CompletionOptions,
    ) -> Result<String> {
        if system.contains("content strategist") {
            return Ok(format!("Here you go!\n```json\n{}\n```", outline_json()));
        }
        if system.contains("SEO strategist") {
            return Ok(r#"{"keywords": ["ai agents", "content workflows"],
                "intent": "informational",
                "heading_topics": ["tooling"],
                "faqs": [{"question": "What is an agent?", "answer": "Software that acts."}]}"#
                .to_string());
        }
        if system.contains("long-form writer") {
            return self.draft_section(user).await;
        }
        if system.contains("image generation models") {
            return Ok("A fixed illustrative prompt".to_string());
        }
        if system.contains("spoken narration") {
            return Ok("Welcome to the show. Point one. Point two. Point three. That's a wrap."
                .to_string());
        }
        if system.contains("repackage") {
            return Ok(r#"{"text": "Agents are eating content ops.", "hashtags": ["ai", "content"]}"#
                .to_string());
        }
        if system.contains("demanding editor") {
            return Ok("# AI Agents at Work\n\nA noticeably sharper draft.".to_string());
        }
        Ok("ok".to_string())
    }

    async fn generate_image(&self, _prompt: &str, _model: &str) -> Result<Option<InlineImage>> {
        match &self.image {
            ImageBehavior::Inline(data) => Ok(Some(InlineImage {
                mime: "image/png".to_string(),
                data: data.clone(),
            })),
            ImageBehavior::Empty => Ok(None),
            ImageBehavior::Error => Err(GenerationError::ProviderCall(
                "mock image outage".to_string(),
            )),
        }
    }
}

/// Provider whose every call fails; for fallback-path tests
pub struct FailingGeneration;

#[async_trait]
impl GenerationProvider for FailingGeneration {
    async fn complete(&self, _: &str, _: &str, _: &CompletionOptions) -> Result<String> {
        Err(GenerationError::ProviderCall("mock outage".to_string()))
    }

    async fn generate_image(&self, _: &str, _: &str) -> Result<Option<InlineImage>> {
        Err(GenerationError::ProviderCall("mock outage".to_string()))
    }
}

/// Research provider returning a fixed two-source context
pub struct MockResearch {
    pub calls: AtomicUsize,
}

impl Default for MockResearch {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ResearchProvider for MockResearch {
    async fn search(&self, _query: &str, _depth: SearchDepth) -> Result<ResearchContext> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ResearchContext {
            answer: Some("Agents automate drafting pipelines.".to_string()),
            results: vec![
                ResearchHit {
                    title: "State of AI Agents".to_string(),
                    url: "https://example.com/state-of-agents".to_string(),
                    content: "Survey of agent adoption.".to_string(),
                    score: 0.95,
                },
                ResearchHit {
                    title: "Content Ops Report".to_string(),
                    url: "https://example.com/content-ops".to_string(),
                    content: "How teams produce content.".to_string(),
                    score: 0.85,
                },
            ],
        })
    }
}

pub struct MockSpeech {
    pub should_fail: bool,
}

#[async_trait]
impl SpeechProvider for MockSpeech {
    async fn synthesize(&self, _script: &str, _model: &str, _voice: &str) -> Result<Vec<u8>> {
        if self.should_fail {
            Err(GenerationError::ProviderCall("mock tts outage".to_string()))
        } else {
            Ok(vec![0u8; 32])
        }
    }
}

/// In-memory blob store recording every put
#[derive(Default)]
pub struct MemoryBlobStore {
    pub blobs: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, name: &str, bytes: &[u8], _content_type: &str) -> Result<String> {
        self.blobs
            .lock()
            .unwrap()
            .push((name.to_string(), bytes.len()));
        Ok(format!("https://media.example/{}", name))
    }
}
