//! Outline stage: turn topic + research + SEO strategy into a section plan

use draftsmith_sdk::log_warning;

use crate::config::ModelSettings;
use crate::error::{GenerationError, Result};
use crate::models::{GenerationRequest, Outline, ResearchContext, SeoStrategy};
use crate::pipeline_utils::parse_payload;
use crate::providers::{CompletionOptions, GenerationProvider};

const SYSTEM_PROMPT: &str = "You are a senior content strategist. You plan article outlines \
that are specific, well scoped, and grounded in the research provided. You respond with a \
single JSON object and nothing else.";

fn build_prompt(
    request: &GenerationRequest,
    research: &ResearchContext,
    seo: Option<&SeoStrategy>,
) -> String {
    let mut prompt = format!(
        r#"Plan a blog article outline.

Topic: {topic}
Tone: {tone}
Target length: about {words} words across roughly {sections} sections.
"#,
        topic = request.topic.trim(),
        tone = request.tone.style_hint(),
        words = request.length.target_words(),
        sections = request.length.section_target(),
    );

    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            "Work these keywords into headings where natural: {}.\n",
            request.keywords.join(", ")
        ));
    }

    if let Some(strategy) = seo {
        if !strategy.keywords.is_empty() {
            prompt.push_str(&format!(
                "SEO target keywords: {}.\n",
                strategy.keywords.join(", ")
            ));
        }
        if !strategy.heading_topics.is_empty() {
            prompt.push_str(&format!(
                "Consider covering: {}.\n",
                strategy.heading_topics.join("; ")
            ));
        }
        if !strategy.intent.is_empty() {
            prompt.push_str(&format!("Detected search intent: {}.\n", strategy.intent));
        }
    }

    let digest = research.digest(400);
    if !digest.is_empty() {
        prompt.push_str("\nResearch context (cite-worthy sources are numbered):\n");
        prompt.push_str(&digest);
    }

    prompt.push_str(
        r#"
Rules:
- The FIRST section must be a key-takeaways summary of the whole article.
- The LAST section must be an FAQ.
- Each section gets 2-4 short guidance points for the writer.
- Headings in the same language as the topic.

Respond with JSON only:
{"title": "...", "sections": [{"heading": "...", "points": ["...", "..."]}]}"#,
    );

    prompt
}

/// Generate the article outline. A response without a parseable JSON payload
/// is fatal for the whole request; there is no retry.
pub async fn generate_outline(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    request: &GenerationRequest,
    research: &ResearchContext,
    seo: Option<&SeoStrategy>,
) -> Result<Outline> {
    let prompt = build_prompt(request, research, seo);
    let opts = CompletionOptions::json(models.resolve(request.model));

    let raw = provider.complete(SYSTEM_PROMPT, &prompt, &opts).await?;
    let outline: Outline = parse_payload(&raw)?;

    if outline.sections.is_empty() {
        return Err(GenerationError::ProviderParse(
            "outline contained no sections".to_string(),
        ));
    }

    if let Some(problem) = check_shape(&outline) {
        // Shape policy is advisory; warn but never touch the headings
        log_warning!("outline shape: {}", problem);
    }

    Ok(outline)
}

/// Post-hoc check of the first/last section roles. Returns a description of
/// the mismatch, or None when the shape looks right.
pub fn check_shape(outline: &Outline) -> Option<String> {
    let first = outline.sections.first()?.heading.to_lowercase();
    let last = outline.sections.last()?.heading.to_lowercase();

    let first_ok = ["takeaway", "summary", "overview", "at a glance", "key points"]
        .iter()
        .any(|k| first.contains(k));
    let last_ok = ["faq", "question"].iter().any(|k| last.contains(k));

    match (first_ok, last_ok) {
        (true, true) => None,
        (false, true) => Some(format!(
            "first section \"{}\" does not look like a key-takeaways summary",
            outline.sections.first().unwrap().heading
        )),
        (true, false) => Some(format!(
            "last section \"{}\" does not look like an FAQ",
            outline.sections.last().unwrap().heading
        )),
        (false, false) => Some("first and last sections do not match the expected summary/FAQ roles".to_string()),
    }
}
