//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::{ArticleLength, GenerationRequest, ModelTier, SocialPlatform, Tone};

/// Draftsmith: research-grounded blog drafting pipeline
#[derive(Parser, Debug)]
#[command(name = "draftsmith", version, about)]
pub struct Args {
    /// Owner id scoping every post operation
    #[arg(long, global = true, default_value = "local")]
    pub owner: String,

    /// Override the posts database path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new draft from a topic
    Generate {
        /// What the article should be about
        #[arg(short, long)]
        topic: String,

        /// Voice of the article
        #[arg(long, value_enum, default_value = "professional")]
        tone: Tone,

        /// Target article size
        #[arg(long, value_enum, default_value = "medium")]
        length: ArticleLength,

        /// Keyword hints to weave in (repeatable)
        #[arg(short, long)]
        keyword: Vec<String>,

        /// Also generate a cover image (fire-and-forget)
        #[arg(long)]
        include_image: bool,

        /// Also generate an audio narration (fire-and-forget)
        #[arg(long)]
        include_audio: bool,

        /// Generation model tier
        #[arg(long, value_enum, default_value = "standard")]
        model: ModelTier,

        /// Write the assembled markdown here as well
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit as soon as the draft is saved instead of waiting for
        /// image/audio enrichment to land
        #[arg(long)]
        no_wait: bool,
    },

    /// Refine an existing post with the premium model
    Refine {
        #[arg(short, long)]
        post: Uuid,

        /// First-hand experience to weave into the rewrite
        #[arg(long)]
        notes: Option<String>,
    },

    /// Analyze a post's SEO and print the report
    SeoAnalyze {
        #[arg(short, long)]
        post: Uuid,
    },

    /// Rewrite a post applying SEO suggestions
    SeoOptimize {
        #[arg(short, long)]
        post: Uuid,

        /// Suggestions to apply (repeatable); defaults to a fresh analysis
        #[arg(short, long)]
        suggestion: Vec<String>,
    },

    /// Generate social variants for a post
    Social {
        #[arg(short, long)]
        post: Uuid,

        /// Target platforms (repeatable); defaults to all
        #[arg(long, value_enum)]
        platform: Vec<SocialPlatform>,
    },

    /// Generate an audio narration for a post
    Narrate {
        #[arg(short, long)]
        post: Uuid,
    },

    /// List recent posts
    List {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Print one post's content and enrichment state
    Show {
        #[arg(short, long)]
        post: Uuid,
    },
}

impl Command {
    /// Build the generation request for the `generate` subcommand
    pub fn to_generation_request(&self) -> Option<GenerationRequest> {
        match self {
            Command::Generate {
                topic,
                tone,
                length,
                keyword,
                include_image,
                include_audio,
                model,
                ..
            } => Some(GenerationRequest {
                topic: topic.clone(),
                keywords: keyword.clone(),
                tone: *tone,
                length: *length,
                include_image: *include_image,
                include_audio: *include_audio,
                model: *model,
            }),
            _ => None,
        }
    }
}
