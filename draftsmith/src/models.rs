//! Data structures shared across pipeline stages

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GenerationError, Result};

/// Minimum topic length accepted before any provider call is made
pub const MIN_TOPIC_CHARS: usize = 5;

/// Voice of the generated article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Friendly,
    Witty,
}

impl Tone {
    /// Style guidance injected into generation prompts
    pub fn style_hint(&self) -> &'static str {
        match self {
            Tone::Professional => "authoritative, precise, businesslike",
            Tone::Friendly => "warm, conversational, encouraging",
            Tone::Witty => "playful, sharp, lightly humorous",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Witty => "witty",
        }
    }
}

/// Target article size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLength {
    Short,
    Medium,
    Long,
}

impl ArticleLength {
    pub fn target_words(&self) -> usize {
        match self {
            ArticleLength::Short => 800,
            ArticleLength::Medium => 1500,
            ArticleLength::Long => 2500,
        }
    }

    /// How many sections the outline should aim for
    pub fn section_target(&self) -> usize {
        match self {
            ArticleLength::Short => 4,
            ArticleLength::Medium => 5,
            ArticleLength::Long => 7,
        }
    }
}

/// Which generation model family the request should run against.
///
/// Tiers resolve to concrete model identifiers through configuration so the
/// pipeline never hardcodes vendor model names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Fast,
    Standard,
    Premium,
}

/// A single content generation request, immutable once submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub tone: Tone,
    pub length: ArticleLength,
    pub include_image: bool,
    pub include_audio: bool,
    pub model: ModelTier,
}

impl GenerationRequest {
    /// Reject malformed requests before any provider call is made
    pub fn validate(&self) -> Result<()> {
        let topic = self.topic.trim();
        if topic.chars().count() < MIN_TOPIC_CHARS {
            return Err(GenerationError::Validation(format!(
                "topic must be at least {} characters",
                MIN_TOPIC_CHARS
            )));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(GenerationError::Validation(
                "keywords must not be empty strings".to_string(),
            ));
        }
        Ok(())
    }
}

/// One ranked result from the research provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: f32,
}

/// Research gathered once per request; read-only input to later stages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchContext {
    pub answer: Option<String>,
    pub results: Vec<ResearchHit>,
}

impl ResearchContext {
    /// Compact digest used inside generation prompts, with [n] citation markers
    pub fn digest(&self, max_chars_per_result: usize) -> String {
        let mut out = String::new();
        if let Some(answer) = &self.answer {
            out.push_str("Direct answer: ");
            out.push_str(answer);
            out.push_str("\n\n");
        }
        for (i, hit) in self.results.iter().enumerate() {
            let snippet: String = hit.content.chars().take(max_chars_per_result).collect();
            out.push_str(&format!("[{}] {} ({})\n{}\n\n", i + 1, hit.title, hit.url, snippet));
        }
        out
    }
}

/// Planned section: heading plus guidance points for the drafting stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionPlan {
    pub heading: String,
    #[serde(default)]
    pub points: Vec<String>,
}

/// Structured article plan produced by the outline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub sections: Vec<SectionPlan>,
}

/// Lifecycle of one section's drafting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Pending,
    Writing,
    Done,
    Error,
}

/// Drafted (or failed) body text for one outlined section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResult {
    pub heading: String,
    pub body: String,
    pub status: SectionStatus,
}

impl SectionResult {
    pub fn pending(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: String::new(),
            status: SectionStatus::Pending,
        }
    }
}

/// Final assembled markdown document; the canonical draft content of a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub title: String,
    pub markdown: String,
}

/// Persisted post lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Completed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::Completed => "COMPLETED",
        }
    }
}

/// Persisted post record. Created at assembly time and enriched
/// asynchronously by the image/audio/refinement side-pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: String,
    pub topic: String,
    pub content: String,
    pub tone: Tone,
    pub status: PostStatus,
    pub cover_image: Option<String>,
    pub audio_url: Option<String>,
    pub schema_markup: Option<String>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

/// Question/answer pair surfaced by SEO planning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqPair {
    pub question: String,
    pub answer: String,
}

/// Keyword and intent strategy steering the outline and schema markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoStrategy {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub heading_topics: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<FaqPair>,
}

/// Result of SEO analysis over a post's current content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoReport {
    pub score: u8,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Social network targets for repackaged content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Twitter,
    Linkedin,
    Facebook,
}

/// Per-platform authoring policy baked into the generation request
#[derive(Debug, Clone, Copy)]
pub struct SocialPolicy {
    pub max_chars: usize,
    pub hashtag_count: usize,
    pub style: &'static str,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Facebook => "facebook",
        }
    }

    pub fn policy(&self) -> SocialPolicy {
        match self {
            SocialPlatform::Twitter => SocialPolicy {
                max_chars: 280,
                hashtag_count: 3,
                style: "punchy, hook-first, thread-opener energy",
            },
            SocialPlatform::Linkedin => SocialPolicy {
                max_chars: 1300,
                hashtag_count: 4,
                style: "insight-led, professional, ends with a question",
            },
            SocialPlatform::Facebook => SocialPolicy {
                max_chars: 600,
                hashtag_count: 2,
                style: "casual, story-driven, invites comments",
            },
        }
    }
}

/// Stored short-form variant, one row per (post, platform)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub post_id: Uuid,
    pub platform: SocialPlatform,
    pub content: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Local>,
}
