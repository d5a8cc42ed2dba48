//! SEO planning step: derive a keyword/intent strategy before outlining

use crate::config::ModelSettings;
use crate::error::Result;
use crate::models::{GenerationRequest, ResearchContext, SeoStrategy};
use crate::pipeline_utils::parse_payload;
use crate::providers::{CompletionOptions, GenerationProvider};

const SYSTEM_PROMPT: &str = "You are an SEO strategist. You study research snippets for a topic \
and produce a keyword and intent plan. Respond with a single JSON object and nothing else.";

fn build_prompt(request: &GenerationRequest, research: &ResearchContext) -> String {
    let mut prompt = format!(
        r#"Build an SEO strategy for an article.

Topic: {topic}
"#,
        topic = request.topic.trim()
    );

    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            "The author already wants these keywords: {}.\n",
            request.keywords.join(", ")
        ));
    }

    let digest = research.digest(300);
    if !digest.is_empty() {
        prompt.push_str("\nWhat currently ranks (research snippets):\n");
        prompt.push_str(&digest);
    }

    prompt.push_str(
        r#"
Respond with JSON only:
{"keywords": ["..."], "intent": "informational|commercial|navigational|transactional",
 "heading_topics": ["..."], "faqs": [{"question": "...", "answer": "..."}]}"#,
    );
    prompt
}

/// Produce the strategy once per request. Consumed by the outline stage and
/// by schema-markup generation; immutable after creation.
pub async fn plan_seo_strategy(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    request: &GenerationRequest,
    research: &ResearchContext,
) -> Result<SeoStrategy> {
    let prompt = build_prompt(request, research);
    let opts = CompletionOptions::json(&models.fast);
    let raw = provider.complete(SYSTEM_PROMPT, &prompt, &opts).await?;
    parse_payload(&raw)
}
