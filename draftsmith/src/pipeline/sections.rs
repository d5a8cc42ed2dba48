//! Section drafting stage: bounded-concurrency prose generation
//!
//! Sections run in strict sequential batches (default size 2). A failed
//! section never aborts its batch or the stage; it becomes a placeholder
//! body and the stage still returns one result per outlined section, in
//! outline order.

use draftsmith_sdk::{
    log_batch_complete, log_batch_start, log_task_complete, log_task_failed, log_task_start,
    ProgressReporter,
};

use crate::config::{ModelSettings, PipelineSettings};
use crate::error::Result;
use crate::models::{
    GenerationRequest, Outline, ResearchContext, SectionPlan, SectionResult, SectionStatus,
};
use crate::pipeline_utils::run_in_batches;
use crate::providers::{CompletionOptions, GenerationProvider};

const SYSTEM_PROMPT: &str = "You are an expert long-form writer. You write one article section \
at a time, in Markdown, matching the requested tone exactly. You never repeat the section \
heading; the caller adds it.";

fn build_section_prompt(
    request: &GenerationRequest,
    section: &SectionPlan,
    research: &ResearchContext,
    words_per_section: usize,
) -> String {
    let mut prompt = format!(
        r#"Write the body of one section of an article about "{topic}".

Section heading: {heading}
Tone: {tone}
Target length: about {words} words.
"#,
        topic = request.topic.trim(),
        heading = section.heading,
        tone = request.tone.style_hint(),
        words = words_per_section,
    );

    if !section.points.is_empty() {
        prompt.push_str("Cover these points:\n");
        for point in &section.points {
            prompt.push_str(&format!("- {}\n", point));
        }
    }

    let digest = research.digest(300);
    if !digest.is_empty() {
        prompt.push_str(
            "\nResearch context. When you draw on a numbered source, cite it inline as [n]:\n",
        );
        prompt.push_str(&digest);
    }

    prompt.push_str("\nReturn only the Markdown body, without the heading.");
    prompt
}

/// Placeholder body inserted when one section's generation fails
pub fn placeholder_body(heading: &str, error: &str) -> String {
    format!(
        "> *This section (\"{}\") could not be generated: {}. Retry the draft or edit it manually.*",
        heading, error
    )
}

async fn draft_one(
    provider: &dyn GenerationProvider,
    request: &GenerationRequest,
    section: &SectionPlan,
    research: &ResearchContext,
    opts: &CompletionOptions,
    words_per_section: usize,
) -> Result<String> {
    let prompt = build_section_prompt(request, section, research, words_per_section);
    let body = provider.complete(SYSTEM_PROMPT, &prompt, opts).await?;
    Ok(body.trim().to_string())
}

/// Draft every outlined section. Always returns `outline.sections.len()`
/// results in outline order; failures are isolated into placeholders.
pub async fn draft_sections(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    settings: &PipelineSettings,
    request: &GenerationRequest,
    outline: &Outline,
    research: &ResearchContext,
    reporter: &ProgressReporter,
) -> Vec<SectionResult> {
    let total = outline.sections.len();
    let words_per_section = request.length.target_words() / total.max(1);
    let opts = CompletionOptions::text(models.resolve(request.model));

    let items: Vec<SectionPlan> = outline.sections.clone();

    let observe_batch = |batch_num: usize, total_batches: usize, batch_len: usize| {
        if batch_num > 1 {
            log_batch_complete!(batch_num - 1);
        }
        log_batch_start!(batch_num, total_batches, batch_len);
    };

    run_in_batches(
        items,
        settings.section_concurrency,
        Some(&observe_batch),
        |idx, section| {
            let opts = opts.clone();
            async move {
                let task_id = format!("section_{}", idx + 1);
                log_task_start!(
                    reporter,
                    &task_id,
                    format!("Writing \"{}\" ({}/{})", section.heading, idx + 1, total)
                );

                match draft_one(provider, request, &section, research, &opts, words_per_section)
                    .await
                {
                    Ok(body) => {
                        log_task_complete!(reporter, &task_id);
                        SectionResult {
                            heading: section.heading,
                            body,
                            status: SectionStatus::Done,
                        }
                    }
                    Err(e) => {
                        log_task_failed!(reporter, &task_id, e);
                        SectionResult {
                            body: placeholder_body(&section.heading, &e.to_string()),
                            heading: section.heading,
                            status: SectionStatus::Error,
                        }
                    }
                }
            }
        },
    )
    .await
}
