//! Assembly stage: deterministic concatenation of the drafted article
//!
//! Pure string work, no provider calls. Given identical inputs the output is
//! byte-identical.

use crate::models::{AssembledDocument, ResearchContext, SectionResult};

/// Sentence emitted when the research context exposed no citable results
pub const NO_REFERENCES_SENTENCE: &str = "No references were detected for this article.";

/// Build the references block from the research context's citation markers.
/// One `[n] title — url` entry per citable result, in research order.
pub fn build_references(research: &ResearchContext) -> String {
    let entries: Vec<String> = research
        .results
        .iter()
        .enumerate()
        .filter(|(_, hit)| !hit.url.trim().is_empty())
        .map(|(i, hit)| format!("[{}] {} — {}", i + 1, hit.title, hit.url))
        .collect();

    if entries.is_empty() {
        NO_REFERENCES_SENTENCE.to_string()
    } else {
        entries.join("\n")
    }
}

/// Concatenate title, section bodies in order, and the references block into
/// the canonical draft document.
pub fn assemble_document(
    title: &str,
    sections: &[SectionResult],
    research: &ResearchContext,
) -> AssembledDocument {
    let mut markdown = format!("# {}\n\n", title.trim());

    for section in sections {
        markdown.push_str(&format!("## {}\n\n{}\n\n", section.heading, section.body));
    }

    markdown.push_str("## References\n\n");
    markdown.push_str(&build_references(research));
    markdown.push('\n');

    AssembledDocument {
        title: title.trim().to_string(),
        markdown,
    }
}
