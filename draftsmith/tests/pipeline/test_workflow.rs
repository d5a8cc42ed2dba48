//! End-to-end draft path against mock providers and an in-memory store

use futures::future::join_all;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use draftsmith::models::{
    ArticleLength, GenerationRequest, ModelTier, PostStatus, SectionStatus, Tone,
};
use draftsmith::pipeline::{run_generation_pipeline, PipelineContext};
use draftsmith::store::{PostStore, SqlitePostStore};
use draftsmith_sdk::{PipelineEvent, PipelineStage, ProgressReporter};

use super::common::{
    models, settings, ImageBehavior, MemoryBlobStore, MockGeneration, MockResearch, MockSpeech,
    OUTLINE_HEADINGS,
};

fn request() -> GenerationRequest {
    GenerationRequest {
        topic: "AI agents in 2025 content workflows".to_string(),
        keywords: vec!["automation".to_string()],
        tone: Tone::Professional,
        length: ArticleLength::Medium,
        include_image: true,
        include_audio: true,
        model: ModelTier::Standard,
    }
}

fn context(generation: Arc<MockGeneration>, store: Arc<SqlitePostStore>) -> PipelineContext {
    PipelineContext {
        generation,
        research: Arc::new(MockResearch::default()),
        speech: Arc::new(MockSpeech { should_fail: false }),
        blobs: Arc::new(MemoryBlobStore::default()),
        store,
        models: models(),
        pipeline: settings(),
        reporter: ProgressReporter::default(),
    }
}

#[tokio::test]
async fn test_end_to_end_draft_with_enrichment() {
    let generation = MockGeneration {
        image: ImageBehavior::Inline(vec![1, 2, 3]),
        ..Default::default()
    }
    .arc();
    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let ctx = context(generation.clone(), store.clone());

    let outcome = run_generation_pipeline(&ctx, "user-1", request())
        .await
        .unwrap();

    // Document shape: H1 title, five section headings in outline order
    let markdown = &outcome.document.markdown;
    assert!(markdown.starts_with("# AI Agents at Work\n"));
    let mut last = 0;
    for heading in OUTLINE_HEADINGS {
        let pos = markdown
            .find(&format!("## {}", heading))
            .unwrap_or_else(|| panic!("missing section {}", heading));
        assert!(pos > last, "section {} out of order", heading);
        last = pos;
    }

    // References block: one entry per research result
    assert!(markdown.contains("[1] State of AI Agents — https://example.com/state-of-agents"));
    assert!(markdown.contains("[2] Content Ops Report — https://example.com/content-ops"));

    // All five sections drafted in three batches of (2, 2, 1)
    assert_eq!(outcome.sections.len(), 5);
    assert!(outcome
        .sections
        .iter()
        .all(|s| s.status == SectionStatus::Done));
    assert!(generation.max_in_flight.load(Ordering::SeqCst) <= 2);

    // Exactly one persisted post, created as DRAFT, with schema markup
    let persisted = store.get_post(&outcome.post.id, "user-1").unwrap().unwrap();
    assert_eq!(persisted.status, PostStatus::Draft);
    assert_eq!(persisted.content, outcome.document.markdown);
    assert!(persisted.schema_markup.is_some());

    // The draft returned before enrichment; the side tasks land later
    assert_eq!(outcome.side_tasks.len(), 2);
    join_all(outcome.side_tasks).await;

    let enriched = store.get_post(&outcome.post.id, "user-1").unwrap().unwrap();
    assert!(enriched
        .cover_image
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(
        enriched.audio_url.as_deref(),
        Some(format!("https://media.example/narration-{}.mp3", outcome.post.id).as_str())
    );
}

#[tokio::test]
async fn test_stage_events_are_ordered_with_rising_progress() {
    let generation = MockGeneration::default().arc();
    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let ctx = context(generation, store);
    let mut rx = ctx.reporter.subscribe();

    let mut req = request();
    req.include_image = false;
    req.include_audio = false;
    run_generation_pipeline(&ctx, "user-1", req).await.unwrap();

    let mut stages_started = Vec::new();
    let mut last_progress = 0u8;
    let mut last_sequence = None;
    while let Ok(update) = rx.try_recv() {
        if let Some(prev) = last_sequence {
            assert!(update.sequence > prev);
        }
        last_sequence = Some(update.sequence);
        match update.event {
            PipelineEvent::StageStarted { stage, .. } => stages_started.push(stage),
            PipelineEvent::Status { progress, .. } => {
                assert!(progress >= last_progress);
                last_progress = progress;
            }
            _ => {}
        }
    }

    assert_eq!(
        stages_started,
        vec![
            PipelineStage::Searching,
            PipelineStage::Planning,
            PipelineStage::Writing,
            PipelineStage::Saving,
        ]
    );
    assert_eq!(last_progress, 100);
}

#[tokio::test]
async fn test_validation_rejects_before_any_provider_call() {
    let generation = MockGeneration::default().arc();
    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let ctx = context(generation, store.clone());

    let research = Arc::new(MockResearch::default());
    let ctx = PipelineContext {
        research: research.clone(),
        ..ctx
    };

    let mut req = request();
    req.topic = "ai".to_string();
    let err = run_generation_pipeline(&ctx, "user-1", req)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("at least"));

    // No provider was consulted and nothing was persisted
    assert_eq!(research.calls.load(Ordering::SeqCst), 0);
    assert!(store.list_posts("user-1", 10, 0).unwrap().is_empty());
}

#[tokio::test]
async fn test_outline_parse_failure_is_fatal_and_nothing_is_persisted() {
    /// Generation mock whose outline answer is pure prose
    struct ProseOutline;

    #[async_trait::async_trait]
    impl draftsmith::providers::GenerationProvider for ProseOutline {
        async fn complete(
            &self,
            system: &str,
            _user: &str,
            _opts: &draftsmith::providers::CompletionOptions,
        ) -> draftsmith::error::Result<String> {
            if system.contains("content strategist") {
                return Ok("I would structure the article around three themes.".to_string());
            }
            Ok(r#"{"keywords": [], "intent": "", "heading_topics": [], "faqs": []}"#.to_string())
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            _model: &str,
        ) -> draftsmith::error::Result<Option<draftsmith::providers::InlineImage>> {
            Ok(None)
        }
    }

    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let ctx = PipelineContext {
        generation: Arc::new(ProseOutline),
        research: Arc::new(MockResearch::default()),
        speech: Arc::new(MockSpeech { should_fail: false }),
        blobs: Arc::new(MemoryBlobStore::default()),
        store: store.clone(),
        models: models(),
        pipeline: settings(),
        reporter: ProgressReporter::default(),
    };

    let err = run_generation_pipeline(&ctx, "user-1", request())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("outline"));
    assert!(store.list_posts("user-1", 10, 0).unwrap().is_empty());
}

#[tokio::test]
async fn test_draft_survives_section_failures() {
    let mut generation = MockGeneration::default();
    generation
        .fail_headings
        .insert("Tooling Landscape".to_string());
    let generation = generation.arc();
    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let ctx = context(generation, store.clone());

    let mut req = request();
    req.include_image = false;
    req.include_audio = false;
    let outcome = run_generation_pipeline(&ctx, "user-1", req).await.unwrap();

    // The draft persisted despite the failed section, placeholder included
    let persisted = store.get_post(&outcome.post.id, "user-1").unwrap().unwrap();
    assert!(persisted.content.contains("## Tooling Landscape"));
    assert!(persisted.content.contains("could not be generated"));
}
