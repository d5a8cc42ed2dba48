//! Refinement stage: best-effort quality rewrite of an assembled draft
//!
//! Uses the premium model. On any provider failure the original draft is
//! returned unchanged; refinement is an enhancement, never a requirement.

use draftsmith_sdk::log_warning;

use crate::config::ModelSettings;
use crate::providers::{CompletionOptions, GenerationProvider};

const SYSTEM_PROMPT: &str = "You are a demanding editor. You rewrite articles for clarity, \
flow, and voice without changing their structure or inventing facts.";

/// Counts of structural markdown constructs the rewrite must not touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedSpans {
    pub headings: usize,
    pub tables: usize,
    pub fences: usize,
    pub callouts: usize,
}

/// Count protected constructs: headings, table rows, fenced blocks
/// (code/diagrams), and blockquote callouts.
pub fn count_protected_spans(text: &str) -> ProtectedSpans {
    let mut spans = ProtectedSpans {
        headings: 0,
        tables: 0,
        fences: 0,
        callouts: 0,
    };
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            spans.headings += 1;
        } else if trimmed.starts_with('|') {
            spans.tables += 1;
        } else if trimmed.starts_with("```") {
            spans.fences += 1;
        } else if trimmed.starts_with('>') {
            spans.callouts += 1;
        }
    }
    spans
}

fn build_prompt(draft: &str, topic: &str, personal_notes: Option<&str>) -> String {
    let mut prompt = format!(
        r#"Rewrite the article below about "{topic}" to improve flow, precision, and voice.

Hard constraints:
- Keep every heading line EXACTLY as it is, character for character.
- Keep every table, fenced code/diagram block, and blockquote callout untouched.
- Keep all [n] citation markers where they are.
- Do not add new factual claims.
"#,
        topic = topic.trim()
    );

    if let Some(notes) = personal_notes.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!(
            "\nWeave in this first-hand perspective where it fits naturally:\n{}\n",
            notes.trim()
        ));
    }

    prompt.push_str(&format!(
        "\nArticle:\n\n{}\n\nReturn the full rewritten article in Markdown.",
        draft
    ));
    prompt
}

/// Refine the draft with a stronger model. Falls back to returning `draft`
/// unchanged on provider failure.
pub async fn refine_draft(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    draft: &str,
    topic: &str,
    personal_notes: Option<&str>,
) -> String {
    let prompt = build_prompt(draft, topic, personal_notes);
    let mut opts = CompletionOptions::text(&models.premium);
    opts.temperature = 0.5;

    match provider.complete(SYSTEM_PROMPT, &prompt, &opts).await {
        Ok(revised) => {
            let revised = revised.trim().to_string();
            if revised.is_empty() {
                log_warning!("refinement returned an empty document, keeping the original");
                return draft.to_string();
            }
            let before = count_protected_spans(draft);
            let after = count_protected_spans(&revised);
            if before != after {
                // Preservation is promised by instruction only; surface drift
                log_warning!(
                    "refinement changed protected spans (before {:?}, after {:?})",
                    before,
                    after
                );
            }
            revised
        }
        Err(e) => {
            log_warning!("refinement failed, keeping the original draft: {}", e);
            draft.to_string()
        }
    }
}
