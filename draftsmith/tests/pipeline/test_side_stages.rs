//! Refinement fallback, image fallback, audio chain, social upsert, SEO degrade

use chrono::Local;
use std::sync::Arc;
use uuid::Uuid;

use draftsmith::models::{Post, PostStatus, SocialPlatform, Tone};
use draftsmith::pipeline::audio::generate_narration;
use draftsmith::pipeline::image::{generate_cover_image, CoverImageSource};
use draftsmith::pipeline::refine::refine_draft;
use draftsmith::pipeline::seo;
use draftsmith::pipeline::social::generate_social_posts;
use draftsmith::store::{PostStore, SqlitePostStore};

use super::common::{
    models, FailingGeneration, ImageBehavior, MemoryBlobStore, MockGeneration, MockSpeech,
};

fn sample_post(store: &SqlitePostStore) -> Post {
    let now = Local::now();
    let post = Post {
        id: Uuid::new_v4(),
        owner_id: "user-1".to_string(),
        topic: "AI agents".to_string(),
        content: "# AI Agents\n\nDraft body.\n\n## Detail\n\nMore.".to_string(),
        tone: Tone::Professional,
        status: PostStatus::Draft,
        cover_image: None,
        audio_url: None,
        schema_markup: None,
        created_at: now,
        updated_at: now,
    };
    store.create_post(&post).unwrap();
    post
}

#[tokio::test]
async fn test_refine_falls_back_to_original_on_provider_failure() {
    let draft = "# Title\n\nOriginal body with [1] citation.\n";
    let revised = refine_draft(&FailingGeneration, &models(), draft, "topic", None).await;
    assert_eq!(revised, draft);
}

#[tokio::test]
async fn test_refine_returns_rewrite_on_success() {
    let provider = MockGeneration::default();
    let revised = refine_draft(&provider, &models(), "# Old\n\nbody", "topic", None).await;
    assert!(revised.contains("sharper draft"));
}

#[tokio::test]
async fn test_image_fallback_is_deterministic_when_no_payload() {
    let provider = MockGeneration {
        image: ImageBehavior::Empty,
        ..Default::default()
    };

    let first = generate_cover_image(&provider, &models(), "edge caching").await;
    let second = generate_cover_image(&provider, &models(), "edge caching").await;

    assert_eq!(first.source, CoverImageSource::Fallback);
    assert_eq!(first.reference, second.reference);
    assert!(first.reference.starts_with("https://"));
}

#[tokio::test]
async fn test_image_stage_never_fails_even_when_everything_errors() {
    let image = generate_cover_image(&FailingGeneration, &models(), "edge caching").await;
    assert_eq!(image.source, CoverImageSource::Fallback);
    assert!(image.reference.contains("edge%20caching"));
}

#[tokio::test]
async fn test_image_inline_payload_becomes_data_uri() {
    let provider = MockGeneration {
        image: ImageBehavior::Inline(vec![9, 9, 9]),
        ..Default::default()
    };
    let image = generate_cover_image(&provider, &models(), "edge caching").await;
    assert_eq!(image.source, CoverImageSource::Generated);
    assert!(image.reference.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_audio_chain_uploads_and_returns_url() {
    let generation = MockGeneration::default();
    let speech = MockSpeech { should_fail: false };
    let blobs = MemoryBlobStore::default();
    let post_id = Uuid::new_v4();

    let url = generate_narration(&generation, &speech, &blobs, &models(), &post_id, "# Post")
        .await
        .unwrap();

    assert_eq!(url, format!("https://media.example/narration-{}.mp3", post_id));
    assert_eq!(blobs.blobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_audio_chain_aborts_before_upload_on_tts_failure() {
    let generation = MockGeneration::default();
    let speech = MockSpeech { should_fail: true };
    let blobs = MemoryBlobStore::default();
    let post_id = Uuid::new_v4();

    let result =
        generate_narration(&generation, &speech, &blobs, &models(), &post_id, "# Post").await;

    assert!(result.is_err());
    // Nothing was uploaded, so no partial audio URL can exist
    assert!(blobs.blobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_social_generation_upserts_per_platform() {
    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let post = sample_post(&store);
    let provider = MockGeneration::default();

    let platforms = [SocialPlatform::Twitter, SocialPlatform::Linkedin];
    let outcomes =
        generate_social_posts(&provider, &models(), store.clone(), &post, &platforms).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|(_, r)| r.is_ok()));

    let stored = store.get_social_posts(&post.id).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|s| s.content.contains("content ops")));
    assert!(stored[0].hashtags.iter().all(|h| h.starts_with('#')));

    // Regeneration replaces rather than appends
    let _ = generate_social_posts(&provider, &models(), store.clone(), &post, &platforms).await;
    assert_eq!(store.get_social_posts(&post.id).unwrap().len(), 2);
}

#[tokio::test]
async fn test_social_failure_does_not_block_other_platforms() {
    let store = Arc::new(SqlitePostStore::in_memory().unwrap());
    let post = sample_post(&store);

    // FailingGeneration errors every platform; each failure is individual
    let outcomes = generate_social_posts(
        &FailingGeneration,
        &models(),
        store.clone(),
        &post,
        &[SocialPlatform::Twitter, SocialPlatform::Facebook],
    )
    .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|(_, r)| r.is_err()));
    assert!(store.get_social_posts(&post.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_seo_analysis_degrades_when_deep_pass_fails() {
    let content = "# T\n\nShort body about agents.";
    let with_failing_llm = seo::analyze(
        Some(&FailingGeneration),
        &models(),
        content,
        "agents",
    )
    .await;
    let local_only = seo::analyze(None, &models(), content, "agents").await;

    // The failed deep pass leaves exactly the local result
    assert_eq!(with_failing_llm.score, local_only.score);
    assert_eq!(with_failing_llm.suggestions, local_only.suggestions);
}
