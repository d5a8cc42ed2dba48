//! Workflow orchestration for content generation
//!
//! The primary path runs research → SEO planning → outline → section
//! drafting → assembly → persist, reporting progress along the way, and
//! returns as soon as the draft is visible. Image and audio enrichment are
//! dispatched as independent tasks keyed by post id; they update the post
//! whenever they finish and are never awaited by the draft path.
//!
//! Refinement, SEO analysis/optimization, and social repackaging are
//! separate on-demand entry points against an existing post.

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use draftsmith_sdk::{log_warning, PipelineStage, ProgressReporter};

use crate::config::{ModelSettings, PipelineSettings};
use crate::models::{
    AssembledDocument, GenerationRequest, Post, PostStatus, SectionResult, SeoReport,
    SocialPlatform, SocialPost,
};
use crate::pipeline::{
    assemble::assemble_document,
    audio::generate_narration,
    image::generate_cover_image,
    outline::generate_outline,
    refine::refine_draft,
    sections::draft_sections,
    seo,
    seo_plan::plan_seo_strategy,
    social::generate_social_posts,
};
use crate::providers::{
    BlobStore, GenerationProvider, ResearchProvider, SearchDepth, SpeechProvider,
};
use crate::store::PostStore;

/// Everything a pipeline run needs, wired once at startup
#[derive(Clone)]
pub struct PipelineContext {
    pub generation: Arc<dyn GenerationProvider>,
    pub research: Arc<dyn ResearchProvider>,
    pub speech: Arc<dyn SpeechProvider>,
    pub blobs: Arc<dyn BlobStore>,
    pub store: Arc<dyn PostStore>,
    pub models: ModelSettings,
    pub pipeline: PipelineSettings,
    pub reporter: ProgressReporter,
}

/// What the primary path hands back once the draft is persisted
#[derive(Debug)]
pub struct PipelineOutcome {
    pub post: Post,
    pub document: AssembledDocument,
    pub sections: Vec<SectionResult>,
    /// Handles for the fire-and-forget enrichment tasks. The draft is
    /// already visible; await these only if the process wants to linger
    /// until enrichment lands.
    pub side_tasks: Vec<JoinHandle<()>>,
}

/// Run the primary generation path for one request.
pub async fn run_generation_pipeline(
    ctx: &PipelineContext,
    owner_id: &str,
    request: GenerationRequest,
) -> Result<PipelineOutcome> {
    request.validate()?;
    let reporter = &ctx.reporter;

    // Research
    reporter.stage_started(PipelineStage::Searching, "Researching the topic");
    reporter.status(PipelineStage::Searching, 5, format!("Searching: {}", request.topic));
    let research = match ctx
        .research
        .search(&request.topic, SearchDepth::Advanced)
        .await
    {
        Ok(context) => context,
        Err(e) => {
            reporter.stage_failed(PipelineStage::Searching, e.to_string());
            return Err(e).context("research failed");
        }
    };
    reporter.status(
        PipelineStage::Searching,
        15,
        format!("Found {} sources", research.results.len()),
    );
    reporter.stage_completed(PipelineStage::Searching);

    // Planning: SEO strategy is best-effort, the outline is not
    reporter.stage_started(PipelineStage::Planning, "Planning the article");
    let strategy = match plan_seo_strategy(
        ctx.generation.as_ref(),
        &ctx.models,
        &request,
        &research,
    )
    .await
    {
        Ok(strategy) => Some(strategy),
        Err(e) => {
            log_warning!("seo planning skipped: {}", e);
            None
        }
    };
    reporter.status(PipelineStage::Planning, 25, "Generating outline");

    let outline = match generate_outline(
        ctx.generation.as_ref(),
        &ctx.models,
        &request,
        &research,
        strategy.as_ref(),
    )
    .await
    {
        Ok(outline) => outline,
        Err(e) => {
            reporter.stage_failed(PipelineStage::Planning, e.to_string());
            return Err(e).context("outline generation failed");
        }
    };
    reporter.status(
        PipelineStage::Planning,
        35,
        format!("Outlined \"{}\" with {} sections", outline.title, outline.sections.len()),
    );
    reporter.stage_completed(PipelineStage::Planning);

    // Drafting: isolated failures, never aborts
    reporter.stage_started(PipelineStage::Writing, "Drafting sections");
    let sections = draft_sections(
        ctx.generation.as_ref(),
        &ctx.models,
        &ctx.pipeline,
        &request,
        &outline,
        &research,
        reporter,
    )
    .await;
    let failed = sections
        .iter()
        .filter(|s| s.status == crate::models::SectionStatus::Error)
        .count();
    reporter.status(
        PipelineStage::Writing,
        70,
        if failed == 0 {
            format!("Drafted {} sections", sections.len())
        } else {
            format!(
                "Drafted {} sections ({} replaced with placeholders)",
                sections.len(),
                failed
            )
        },
    );
    reporter.stage_completed(PipelineStage::Writing);

    // Assembly and persistence
    reporter.stage_started(PipelineStage::Saving, "Assembling and saving the draft");
    let document = assemble_document(&outline.title, &sections, &research);

    let now = Local::now();
    let schema_markup = strategy
        .as_ref()
        .map(|s| seo::build_schema_markup(&document.title, &request.topic, s));
    let post = Post {
        id: Uuid::new_v4(),
        owner_id: owner_id.to_string(),
        topic: request.topic.clone(),
        content: document.markdown.clone(),
        tone: request.tone,
        status: PostStatus::Draft,
        cover_image: None,
        audio_url: None,
        schema_markup,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = ctx.store.create_post(&post) {
        reporter.stage_failed(PipelineStage::Saving, e.to_string());
        return Err(e).context("failed to persist draft");
    }
    reporter.status(
        PipelineStage::Saving,
        90,
        format!("Draft saved as post {}", post.id),
    );
    reporter.stage_completed(PipelineStage::Saving);

    // Enrichment: dispatched, not awaited
    let mut side_tasks = Vec::new();
    if request.include_image {
        side_tasks.push(spawn_image_task(ctx, &post));
    }
    if request.include_audio {
        side_tasks.push(spawn_audio_task(ctx, &post));
    }

    reporter.status(PipelineStage::Completed, 100, "Draft ready");
    reporter.stage_completed(PipelineStage::Completed);

    Ok(PipelineOutcome {
        post,
        document,
        sections,
        side_tasks,
    })
}

/// Cover image enrichment: infallible reference generation, best-effort write
fn spawn_image_task(ctx: &PipelineContext, post: &Post) -> JoinHandle<()> {
    let generation = ctx.generation.clone();
    let store = ctx.store.clone();
    let models = ctx.models.clone();
    let reporter = ctx.reporter.clone();
    let post_id = post.id;
    let owner_id = post.owner_id.clone();
    let topic = post.topic.clone();

    tokio::spawn(async move {
        let image = generate_cover_image(generation.as_ref(), &models, &topic).await;
        match store.set_cover_image(&post_id, &owner_id, &image.reference) {
            Ok(true) => reporter.artifact_stored(
                post_id.to_string(),
                "cover_image",
                short_reference(&image.reference),
            ),
            Ok(false) => log_warning!("cover image generated but post {} was gone", post_id),
            Err(e) => log_warning!("failed to record cover image for post {}: {}", post_id, e),
        }
    })
}

/// Audio narration enrichment: strict chain, no partial URL on failure
fn spawn_audio_task(ctx: &PipelineContext, post: &Post) -> JoinHandle<()> {
    let generation = ctx.generation.clone();
    let speech = ctx.speech.clone();
    let blobs = ctx.blobs.clone();
    let store = ctx.store.clone();
    let models = ctx.models.clone();
    let reporter = ctx.reporter.clone();
    let post_id = post.id;
    let owner_id = post.owner_id.clone();
    let content = post.content.clone();

    tokio::spawn(async move {
        match generate_narration(
            generation.as_ref(),
            speech.as_ref(),
            blobs.as_ref(),
            &models,
            &post_id,
            &content,
        )
        .await
        {
            Ok(url) => match store.set_audio_url(&post_id, &owner_id, &url) {
                Ok(true) => reporter.artifact_stored(post_id.to_string(), "audio_url", url),
                Ok(false) => log_warning!("narration ready but post {} was gone", post_id),
                Err(e) => log_warning!("failed to record audio for post {}: {}", post_id, e),
            },
            Err(e) => log_warning!("narration failed for post {}: {}", post_id, e),
        }
    })
}

fn short_reference(reference: &str) -> String {
    if reference.chars().count() > 64 {
        let head: String = reference.chars().take(64).collect();
        format!("{}…", head)
    } else {
        reference.to_string()
    }
}

async fn load_post(ctx: &PipelineContext, owner_id: &str, post_id: &Uuid) -> Result<Post> {
    match ctx.store.get_post(post_id, owner_id)? {
        Some(post) => Ok(post),
        None => bail!("post {} not found for this user", post_id),
    }
}

/// Rewrite an existing post with the premium model. Best-effort: on provider
/// failure the stored content is left untouched and returned as-is.
pub async fn refine_post(
    ctx: &PipelineContext,
    owner_id: &str,
    post_id: &Uuid,
    personal_notes: Option<&str>,
) -> Result<Post> {
    let mut post = load_post(ctx, owner_id, post_id).await?;
    let revised = refine_draft(
        ctx.generation.as_ref(),
        &ctx.models,
        &post.content,
        &post.topic,
        personal_notes,
    )
    .await;

    if revised != post.content {
        ctx.store
            .update_content(post_id, owner_id, &revised)
            .context("failed to persist refined content")?;
        post.content = revised;
    }
    Ok(post)
}

/// Analyze the post's current content for search performance.
pub async fn analyze_post_seo(
    ctx: &PipelineContext,
    owner_id: &str,
    post_id: &Uuid,
) -> Result<SeoReport> {
    let post = load_post(ctx, owner_id, post_id).await?;
    let deep = ctx
        .pipeline
        .seo_deep_analysis
        .then(|| ctx.generation.as_ref());
    Ok(seo::analyze(deep, &ctx.models, &post.content, &post.topic).await)
}

/// Apply SEO suggestions to the post. A provider failure is surfaced as a
/// failed action; re-invoking retries it.
pub async fn optimize_post_seo(
    ctx: &PipelineContext,
    owner_id: &str,
    post_id: &Uuid,
    suggestions: &[String],
) -> Result<Post> {
    let mut post = load_post(ctx, owner_id, post_id).await?;
    let revised = seo::optimize(
        ctx.generation.as_ref(),
        &ctx.models,
        &post.content,
        suggestions,
    )
    .await
    .context("seo optimization failed")?;

    ctx.store
        .update_content(post_id, owner_id, &revised)
        .context("failed to persist optimized content")?;
    post.content = revised;
    Ok(post)
}

/// Generate (or regenerate) social variants for the given platforms.
pub async fn socialize_post(
    ctx: &PipelineContext,
    owner_id: &str,
    post_id: &Uuid,
    platforms: &[SocialPlatform],
) -> Result<Vec<(SocialPlatform, crate::error::Result<SocialPost>)>> {
    let post = load_post(ctx, owner_id, post_id).await?;
    Ok(generate_social_posts(
        ctx.generation.as_ref(),
        &ctx.models,
        ctx.store.clone(),
        &post,
        platforms,
    )
    .await)
}

/// Run the narration chain for an existing post and record the audio URL.
pub async fn narrate_post(ctx: &PipelineContext, owner_id: &str, post_id: &Uuid) -> Result<String> {
    let post = load_post(ctx, owner_id, post_id).await?;
    let url = generate_narration(
        ctx.generation.as_ref(),
        ctx.speech.as_ref(),
        ctx.blobs.as_ref(),
        &ctx.models,
        post_id,
        &post.content,
    )
    .await
    .context("narration failed")?;

    ctx.store
        .set_audio_url(post_id, owner_id, &url)
        .context("failed to record audio url")?;
    Ok(url)
}
