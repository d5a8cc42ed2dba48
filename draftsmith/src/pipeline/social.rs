//! Social content stage: repackage a post per platform
//!
//! Platforms generate concurrently and independently; one platform failing
//! never blocks the others. Each success is upserted so regeneration
//! replaces the previous variant for that (post, platform) pair.

use chrono::Local;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::ModelSettings;
use crate::error::{GenerationError, Result};
use crate::models::{Post, SocialPlatform, SocialPost};
use crate::pipeline_utils::parse_payload;
use crate::providers::{CompletionOptions, GenerationProvider};
use crate::store::PostStore;

const SYSTEM_PROMPT: &str = "You repackage articles into platform-native social posts. \
Respond with a single JSON object and nothing else.";

#[derive(Deserialize)]
struct SocialPayload {
    text: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

fn build_prompt(post: &Post, platform: SocialPlatform) -> String {
    let policy = platform.policy();
    format!(
        r#"Write a {platform} post promoting the article below.

Style: {style}.
Hard limit: {max_chars} characters for the post text (hashtags not included).
Provide exactly {hashtags} hashtags, separate from the text body.

Respond with JSON only:
{{"text": "...", "hashtags": ["tag1", "tag2"]}}

Article:

{content}"#,
        platform = platform.as_str(),
        style = policy.style,
        max_chars = policy.max_chars,
        hashtags = policy.hashtag_count,
        content = post.content,
    )
}

async fn generate_one(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    post: &Post,
    platform: SocialPlatform,
) -> Result<SocialPost> {
    let prompt = build_prompt(post, platform);
    let opts = CompletionOptions::json(&models.standard);
    let raw = provider.complete(SYSTEM_PROMPT, &prompt, &opts).await?;
    let payload: SocialPayload = parse_payload(&raw)?;

    let text = payload.text.trim().to_string();
    if text.is_empty() {
        return Err(GenerationError::ProviderParse(format!(
            "{} variant came back empty",
            platform.as_str()
        )));
    }

    Ok(SocialPost {
        post_id: post.id,
        platform,
        content: text,
        hashtags: payload
            .hashtags
            .into_iter()
            .map(|h| {
                let h = h.trim().trim_start_matches('#').to_string();
                format!("#{}", h)
            })
            .filter(|h| h.len() > 1)
            .collect(),
        created_at: Local::now(),
    })
}

/// Generate and persist variants for every requested platform. Returns one
/// entry per platform with its individual outcome; failed platforms are
/// retriable by re-invocation.
pub async fn generate_social_posts(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    store: Arc<dyn PostStore>,
    post: &Post,
    platforms: &[SocialPlatform],
) -> Vec<(SocialPlatform, Result<SocialPost>)> {
    let mut tasks = FuturesUnordered::new();
    for &platform in platforms {
        let store = store.clone();
        tasks.push(async move {
            let result = match generate_one(provider, models, post, platform).await {
                Ok(social) => match store.upsert_social_post(&social) {
                    Ok(()) => Ok(social),
                    Err(e) => Err(GenerationError::ProviderCall(format!(
                        "failed to persist {} variant: {}",
                        platform.as_str(),
                        e
                    ))),
                },
                Err(e) => Err(e),
            };
            (platform, result)
        });
    }

    let mut outcomes = Vec::with_capacity(platforms.len());
    while let Some(outcome) = tasks.next().await {
        outcomes.push(outcome);
    }
    outcomes
}
