//! SEO analysis and optimization stage
//!
//! Analysis combines a deterministic local scorer (pure, synchronous, no
//! network) with an optional LLM deep pass. When both produce a score the
//! two are averaged; when the LLM pass is unavailable or fails, the local
//! score stands alone and the caller still gets a usable report.

use draftsmith_sdk::log_warning;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use crate::config::ModelSettings;
use crate::error::Result;
use crate::models::{SeoReport, SeoStrategy};
use crate::pipeline::refine::count_protected_spans;
use crate::pipeline_utils::parse_payload;
use crate::providers::{CompletionOptions, GenerationProvider};

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "with", "this", "from", "have", "are", "was", "were", "will",
    "your", "their", "they", "them", "into", "about", "when", "what", "which", "more", "than",
    "also", "been", "its", "can", "has", "had", "but", "not", "you", "all", "one", "our",
];

/// Result of the pure local scorer
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSeoAnalysis {
    pub score: u8,
    pub issues: Vec<String>,
    pub keywords: Vec<String>,
    pub meta_title: String,
    pub meta_description: String,
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Words of the prose body, lowercased, punctuation-stripped
fn content_words(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|l| !is_heading(l) && !l.trim_start().starts_with("```"))
        .flat_map(|l| l.split_whitespace())
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn sentences(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|l| {
            let t = l.trim_start();
            !t.starts_with('#') && !t.starts_with("```") && !t.starts_with('|') && !t.starts_with('>')
        })
        .collect::<Vec<_>>()
        .join(" ")
        .split(['.', '!', '?'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Deterministic local SEO analysis. Pure function of its inputs.
pub fn analyze_local(content: &str, topic: &str) -> LocalSeoAnalysis {
    let mut score: i32 = 100;
    let mut issues = Vec::new();

    let words = content_words(content);
    let word_count = words.len();

    // Thin content
    if word_count < 300 {
        score -= 15;
        issues.push(format!(
            "Content is thin ({} words); search engines favor 300+ word articles",
            word_count
        ));
    }

    // Readability: average sentence length
    let sentence_list = sentences(content);
    if !sentence_list.is_empty() {
        let total_words: usize = sentence_list
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum();
        let avg = total_words as f64 / sentence_list.len() as f64;
        if avg > 25.0 {
            score -= 15;
            issues.push(format!(
                "Average sentence length is {:.0} words; aim for under 20 for readability",
                avg
            ));
        } else if avg > 20.0 {
            score -= 8;
            issues.push(format!(
                "Average sentence length is {:.0} words; shorter sentences read better",
                avg
            ));
        }
    }

    // Heading structure
    let h1_count = content
        .lines()
        .filter(|l| l.trim_start().starts_with("# "))
        .count();
    let h2_count = content
        .lines()
        .filter(|l| l.trim_start().starts_with("## "))
        .count();
    if h1_count == 0 {
        score -= 10;
        issues.push("Missing a top-level H1 title".to_string());
    } else if h1_count > 1 {
        score -= 10;
        issues.push(format!("Found {} H1 headings; use exactly one", h1_count));
    }
    if h2_count < 2 {
        score -= 10;
        issues.push("Fewer than two H2 subheadings; structure helps both readers and crawlers".to_string());
    }

    // Image alt text completeness
    let mut rest = content;
    let mut missing_alt = 0;
    while let Some(pos) = rest.find("![") {
        let after = &rest[pos + 2..];
        if after.starts_with(']') {
            missing_alt += 1;
        }
        rest = after;
    }
    if missing_alt > 0 {
        score -= 10;
        issues.push(format!("{} image(s) missing alt text", missing_alt));
    }

    // Keyword density against the topic's significant words
    let topic_terms: Vec<String> = topic
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.len() > 3 && !STOPWORDS.contains(&w.as_str()))
        .collect();
    if !topic_terms.is_empty() && word_count > 0 {
        let hits = words
            .iter()
            .filter(|w| topic_terms.contains(*w))
            .count();
        let density = hits as f64 / word_count as f64;
        if hits == 0 {
            score -= 15;
            issues.push("Topic keywords never appear in the body".to_string());
        } else if density > 0.05 {
            score -= 10;
            issues.push("Topic keywords look stuffed; reduce repetition".to_string());
        } else if density < 0.005 {
            score -= 5;
            issues.push("Topic keywords appear rarely; mention them a bit more".to_string());
        }
    }

    // Frequency-ranked keyword extraction
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for w in &words {
        if w.len() > 3 && !STOPWORDS.contains(&w.as_str()) {
            *freq.entry(w.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let keywords: Vec<String> = ranked.iter().take(8).map(|(w, _)| w.to_string()).collect();

    // Meta fields from the document itself
    let meta_title = content
        .lines()
        .find(|l| l.trim_start().starts_with("# "))
        .map(|l| l.trim_start().trim_start_matches("# ").trim().to_string())
        .unwrap_or_else(|| topic.trim().to_string());
    let meta_description = content
        .lines()
        .map(str::trim)
        .find(|l| {
            !l.is_empty() && !l.starts_with('#') && !l.starts_with('>') && !l.starts_with('|') && !l.starts_with("```")
        })
        .unwrap_or("")
        .to_string();

    LocalSeoAnalysis {
        score: score.clamp(0, 100) as u8,
        issues,
        keywords,
        meta_title: truncate_chars(&meta_title, 60),
        meta_description: truncate_chars(&meta_description, 155),
    }
}

#[derive(Deserialize)]
struct DeepAnalysis {
    score: Option<u8>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Full SEO analysis: local scorer plus (when enabled) an LLM deep pass.
/// The deep pass degrades gracefully: any failure leaves the local result.
pub async fn analyze(
    provider: Option<&dyn GenerationProvider>,
    models: &ModelSettings,
    content: &str,
    topic: &str,
) -> SeoReport {
    let local = analyze_local(content, topic);
    let mut score = local.score;
    let mut suggestions = local.issues.clone();

    if let Some(provider) = provider {
        let prompt = format!(
            r#"Review this article for search performance. Topic: "{topic}".

Respond with JSON only:
{{"score": <0-100>, "suggestions": ["actionable suggestion", "..."]}}

Article:

{content}"#,
        );
        let opts = CompletionOptions::json(&models.standard);
        match provider
            .complete(
                "You are an SEO specialist. Respond with a single JSON object.",
                &prompt,
                &opts,
            )
            .await
            .and_then(|raw| parse_payload::<DeepAnalysis>(&raw))
        {
            Ok(deep) => {
                if let Some(deep_score) = deep.score {
                    score = ((local.score as u16 + deep_score.min(100) as u16) / 2) as u8;
                }
                suggestions.extend(deep.suggestions);
            }
            Err(e) => {
                log_warning!("deep SEO analysis unavailable: {}", e);
            }
        }
    }

    SeoReport {
        score,
        meta_title: local.meta_title,
        meta_description: local.meta_description,
        keywords: local.keywords,
        suggestions,
    }
}

/// Rewrite the article applying the given suggestions. Protected markdown
/// constructs must survive; that is enforced by instruction and checked
/// post-hoc with a warning only. Errors propagate so the caller can report
/// a retriable failed action.
pub async fn optimize(
    provider: &dyn GenerationProvider,
    models: &ModelSettings,
    content: &str,
    suggestions: &[String],
) -> Result<String> {
    let mut prompt = String::from(
        "Improve the article below for search performance by applying these suggestions:\n",
    );
    for s in suggestions {
        prompt.push_str(&format!("- {}\n", s));
    }
    prompt.push_str(
        r#"
Hard constraints:
- Keep every table, fenced code/diagram block, and blockquote callout EXACTLY as it is.
- Do not introduce new factual claims.
- Return the full article in Markdown.

Article:

"#,
    );
    prompt.push_str(content);

    let opts = CompletionOptions::text(&models.standard);
    let revised = provider
        .complete(
            "You are an SEO editor. You improve articles without altering their structure or facts.",
            &prompt,
            &opts,
        )
        .await?;
    let revised = revised.trim().to_string();

    let before = count_protected_spans(content);
    let after = count_protected_spans(&revised);
    if before != after {
        log_warning!(
            "seo optimization changed protected spans (before {:?}, after {:?})",
            before,
            after
        );
    }

    Ok(revised)
}

/// JSON-LD structured data for the post, derived from the SEO strategy.
pub fn build_schema_markup(title: &str, description: &str, strategy: &SeoStrategy) -> String {
    let mut graph = vec![json!({
        "@type": "Article",
        "headline": title,
        "description": description,
        "keywords": strategy.keywords.join(", "),
    })];

    if !strategy.faqs.is_empty() {
        graph.push(json!({
            "@type": "FAQPage",
            "mainEntity": strategy.faqs.iter().map(|faq| json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {"@type": "Answer", "text": faq.answer},
            })).collect::<Vec<_>>(),
        }));
    }

    json!({
        "@context": "https://schema.org",
        "@graph": graph,
    })
    .to_string()
}
