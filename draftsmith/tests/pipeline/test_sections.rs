//! Section drafting: ordering, concurrency bound, failure isolation

use std::sync::atomic::Ordering;

use draftsmith::models::{
    ArticleLength, GenerationRequest, ModelTier, Outline, ResearchContext, SectionPlan,
    SectionStatus, Tone,
};
use draftsmith::pipeline::sections::draft_sections;
use draftsmith_sdk::ProgressReporter;

use super::common::{models, settings, MockGeneration, OUTLINE_HEADINGS};

fn request() -> GenerationRequest {
    GenerationRequest {
        topic: "AI agents in 2025 content workflows".to_string(),
        keywords: vec![],
        tone: Tone::Professional,
        length: ArticleLength::Medium,
        include_image: false,
        include_audio: false,
        model: ModelTier::Standard,
    }
}

fn outline() -> Outline {
    Outline {
        title: "AI Agents at Work".to_string(),
        sections: OUTLINE_HEADINGS
            .iter()
            .map(|h| SectionPlan {
                heading: h.to_string(),
                points: vec!["one".to_string()],
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_output_order_matches_outline_despite_reverse_completion() {
    let provider = MockGeneration {
        reverse_completion: true,
        ..Default::default()
    }
    .arc();

    let results = draft_sections(
        provider.as_ref(),
        &models(),
        &settings(),
        &request(),
        &outline(),
        &ResearchContext::default(),
        &ProgressReporter::default(),
    )
    .await;

    let headings: Vec<&str> = results.iter().map(|r| r.heading.as_str()).collect();
    assert_eq!(headings, OUTLINE_HEADINGS.to_vec());
    for result in &results {
        assert_eq!(result.status, SectionStatus::Done);
        assert!(result.body.contains(&result.heading));
    }

    // Within the first batch the second section finished first
    let completion = provider.completion_order.lock().unwrap().clone();
    assert_eq!(completion.len(), 5);
    assert_eq!(completion[0], OUTLINE_HEADINGS[1]);
    assert_eq!(completion[1], OUTLINE_HEADINGS[0]);
}

#[tokio::test]
async fn test_at_most_two_calls_in_flight() {
    let provider = MockGeneration {
        reverse_completion: true,
        ..Default::default()
    }
    .arc();

    draft_sections(
        provider.as_ref(),
        &models(),
        &settings(),
        &request(),
        &outline(),
        &ResearchContext::default(),
        &ProgressReporter::default(),
    )
    .await;

    assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 2);
    // And batches actually overlap calls, so concurrency is real
    assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_single_failure_is_isolated_to_a_placeholder() {
    let mut provider = MockGeneration::default();
    provider
        .fail_headings
        .insert("Adoption Patterns".to_string());
    let provider = provider.arc();

    let results = draft_sections(
        provider.as_ref(),
        &models(),
        &settings(),
        &request(),
        &outline(),
        &ResearchContext::default(),
        &ProgressReporter::default(),
    )
    .await;

    assert_eq!(results.len(), OUTLINE_HEADINGS.len());

    let errored: Vec<&str> = results
        .iter()
        .filter(|r| r.status == SectionStatus::Error)
        .map(|r| r.heading.as_str())
        .collect();
    assert_eq!(errored, vec!["Adoption Patterns"]);

    let placeholder = results
        .iter()
        .find(|r| r.status == SectionStatus::Error)
        .unwrap();
    assert!(placeholder.body.contains("Adoption Patterns"));
    assert!(placeholder.body.contains("could not be generated"));

    let done = results
        .iter()
        .filter(|r| r.status == SectionStatus::Done)
        .count();
    assert_eq!(done, OUTLINE_HEADINGS.len() - 1);
}

#[tokio::test]
async fn test_failure_does_not_stop_later_batches() {
    let mut provider = MockGeneration::default();
    // First batch fails entirely; later batches must still run
    provider.fail_headings.insert(OUTLINE_HEADINGS[0].to_string());
    provider.fail_headings.insert(OUTLINE_HEADINGS[1].to_string());
    let provider = provider.arc();

    let results = draft_sections(
        provider.as_ref(),
        &models(),
        &settings(),
        &request(),
        &outline(),
        &ResearchContext::default(),
        &ProgressReporter::default(),
    )
    .await;

    assert_eq!(results.len(), 5);
    assert_eq!(
        results
            .iter()
            .filter(|r| r.status == SectionStatus::Done)
            .count(),
        3
    );
    assert_eq!(provider.completion_order.lock().unwrap().len(), 5);
}
