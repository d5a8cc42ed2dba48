//! Application configuration
//!
//! Credentials and knobs are read from the environment exactly once, at
//! process start, and handed to provider constructors explicitly. Stage
//! functions never touch ambient state.

use std::env;
use std::path::PathBuf;

use crate::error::{GenerationError, Result};
use crate::models::ModelTier;

/// Credentials and endpoints for external providers
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub generation_api_key: String,
    pub generation_base_url: String,
    pub research_api_key: String,
    pub research_base_url: String,
}

/// Concrete model identifiers the tiers resolve to
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub fast: String,
    pub standard: String,
    pub premium: String,
    pub image: String,
    pub speech: String,
    pub voice: String,
}

impl ModelSettings {
    pub fn resolve(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Standard => &self.standard,
            ModelTier::Premium => &self.premium,
        }
    }
}

/// Pipeline behavior knobs
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Maximum concurrent section drafting calls
    pub section_concurrency: usize,
    /// Enable the optional LLM pass of SEO analysis
    pub seo_deep_analysis: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            section_concurrency: 2,
            seo_deep_analysis: true,
        }
    }
}

/// Where the post database and media artifacts live
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: PathBuf,
    pub media_dir: PathBuf,
    pub media_base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub providers: ProviderConfig,
    pub models: ModelSettings,
    pub pipeline: PipelineSettings,
    pub storage: StorageSettings,
}

fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GenerationError::Configuration(format!(
            "{} is not set",
            name
        ))),
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Missing credentials are a ConfigurationError surfaced before the
    /// pipeline starts; everything else falls back to a sensible default.
    pub fn from_env() -> Result<Self> {
        let data_root = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".draftsmith");

        let providers = ProviderConfig {
            generation_api_key: required_env("DRAFTSMITH_GENERATION_API_KEY")?,
            generation_base_url: env_or(
                "DRAFTSMITH_GENERATION_BASE_URL",
                "https://api.openai.com/v1",
            ),
            research_api_key: required_env("DRAFTSMITH_RESEARCH_API_KEY")?,
            research_base_url: env_or("DRAFTSMITH_RESEARCH_BASE_URL", "https://api.tavily.com"),
        };

        let models = ModelSettings {
            fast: env_or("DRAFTSMITH_MODEL_FAST", "gpt-4o-mini"),
            standard: env_or("DRAFTSMITH_MODEL_STANDARD", "gpt-4o"),
            premium: env_or("DRAFTSMITH_MODEL_PREMIUM", "gpt-4.1"),
            image: env_or("DRAFTSMITH_MODEL_IMAGE", "gpt-image-1"),
            speech: env_or("DRAFTSMITH_MODEL_SPEECH", "tts-1"),
            voice: env_or("DRAFTSMITH_VOICE", "alloy"),
        };

        let pipeline = PipelineSettings {
            section_concurrency: env::var("DRAFTSMITH_SECTION_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(2),
            seo_deep_analysis: env::var("DRAFTSMITH_SEO_DEEP_ANALYSIS")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
        };

        let storage = StorageSettings {
            database_path: env::var("DRAFTSMITH_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_root.join("posts.db")),
            media_dir: env::var("DRAFTSMITH_MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_root.join("media")),
            media_base_url: env_or("DRAFTSMITH_MEDIA_BASE_URL", "file://media"),
        };

        Ok(Self {
            providers,
            models,
            pipeline,
            storage,
        })
    }
}
