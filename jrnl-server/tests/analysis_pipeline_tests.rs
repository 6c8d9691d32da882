//! End-to-end analysis pipeline tests with a stub provider

mod helpers;

use helpers::{StubProvider, HAPPY_RESPONSE};
use jrnl_common::db::AnalysisStatus;
use jrnl_common::{AnalysisResult, Mood};
use jrnl_server::analysis::{
    AnalysisError, FAILED_INSIGHT, NO_ENTRIES_INSIGHT, QUERY_APOLOGY,
};
use jrnl_server::JournalAnalyzer;

fn analyzer(stub: &std::sync::Arc<StubProvider>) -> JournalAnalyzer {
    JournalAnalyzer::new(stub.clone())
}

fn assert_well_formed(result: &AnalysisResult) {
    assert!((0..=100).contains(&result.mood_score));
    for pct in [
        result.positive_percentage,
        result.neutral_percentage,
        result.negative_percentage,
    ] {
        assert!((0..=100).contains(&pct));
    }
    assert_eq!(result.percentage_sum(), 100);
    assert!(!result.summary.trim().is_empty());
}

#[tokio::test]
async fn test_well_formed_response_analyzed() {
    let stub = StubProvider::replying(HAPPY_RESPONSE);
    let outcome = analyzer(&stub).analyze("A relaxed day outdoors.").await.unwrap();

    assert_eq!(outcome.status, AnalysisStatus::Analyzed);
    assert_eq!(outcome.result.mood, Mood::Happy);
    assert_eq!(outcome.result.mood_score, 88);
    assert_eq!(
        (
            outcome.result.positive_percentage,
            outcome.result.neutral_percentage,
            outcome.result.negative_percentage
        ),
        (75, 20, 5)
    );
    assert!(!outcome.result.negative);
    assert_well_formed(&outcome.result);
}

#[tokio::test]
async fn test_unbalanced_percentages_rebalanced() {
    let raw = "```json\n{\"summary\": \"Mixed\", \"mood\": \"ANXIOUS\", \"negative\": true, \"moodScore\": 40, \"positivePercentage\": 80, \"neutralPercentage\": 15, \"negativePercentage\": 15}\n```";
    let stub = StubProvider::replying(raw);
    let outcome = analyzer(&stub).analyze("Busy week.").await.unwrap();

    assert_eq!(outcome.status, AnalysisStatus::Analyzed);
    assert_eq!(outcome.result.mood, Mood::Anxious);
    assert!(outcome.result.negative);
    assert_eq!(
        (
            outcome.result.positive_percentage,
            outcome.result.neutral_percentage,
            outcome.result.negative_percentage
        ),
        (73, 14, 13)
    );
}

#[tokio::test]
async fn test_irregular_responses_still_well_formed() {
    let responses = [
        "```json\n\"summary\": \"no braces\", \"mood\": \"calm\", \"moodScore\": \"250\"\n```",
        "```json\n{\"moodScore\": -5, \"positivePercentage\": -10, \"neutralPercentage\": 0, \"negativePercentage\": 0}\n```",
        "```json\n{\"summary\": \"   \", \"mood\": \"EXCITED\", \"positivePercentage\": 1, \"neutralPercentage\": 7, \"negativePercentage\": 0}\n```",
    ];

    for raw in responses {
        let stub = StubProvider::replying(raw);
        let outcome = analyzer(&stub).analyze("Some text").await.unwrap();
        assert_eq!(outcome.status, AnalysisStatus::Analyzed, "raw: {}", raw);
        assert_well_formed(&outcome.result);
    }
}

#[tokio::test]
async fn test_lowercase_mood_becomes_neutral() {
    let raw = "```json\n{\"summary\": \"ok\", \"mood\": \"happy\", \"moodScore\": 70}\n```";
    let stub = StubProvider::replying(raw);
    let outcome = analyzer(&stub).analyze("Text").await.unwrap();

    assert_eq!(outcome.result.mood, Mood::Neutral);
    assert_eq!(outcome.result.mood_score, 70);
}

#[tokio::test]
async fn test_missing_json_block_falls_back() {
    let stub = StubProvider::replying("I think the writer is happy.");
    let analyzer = analyzer(&stub);
    let outcome = analyzer.analyze("Text").await.unwrap();

    assert_eq!(outcome.status, AnalysisStatus::Fallback);
    assert_eq!(outcome.result, AnalysisResult::fallback());
    assert_eq!(analyzer.last_failure().await.unwrap().operation, "analysis");
}

#[tokio::test]
async fn test_provider_failure_falls_back_and_is_recorded() {
    let stub = StubProvider::failing();
    let analyzer = analyzer(&stub);
    assert!(analyzer.last_failure().await.is_none());

    let outcome = analyzer.analyze("Text").await.unwrap();
    assert_eq!(outcome.status, AnalysisStatus::Fallback);
    assert_eq!(outcome.result.mood, Mood::Neutral);
    assert_eq!(outcome.result.mood_score, 50);
    assert_eq!(stub.calls(), 1);

    let failure = analyzer.last_failure().await.unwrap();
    assert!(failure.message.contains("connection refused"));
}

#[tokio::test]
async fn test_blank_content_never_reaches_provider() {
    let stub = StubProvider::replying(HAPPY_RESPONSE);
    let analyzer = analyzer(&stub);

    for content in ["", "   ", "\n\t"] {
        assert_eq!(analyzer.analyze(content).await, Err(AnalysisError::EmptyContent));
    }
    assert_eq!(analyzer.query("  ", &[]).await, Err(AnalysisError::EmptyQuery));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_content_trimmed_before_prompting() {
    let stub = StubProvider::replying(HAPPY_RESPONSE);
    analyzer(&stub).analyze("  Morning coffee.  \n").await.unwrap();

    assert_eq!(stub.last_prompt().unwrap().human, "Morning coffee.");
}

#[tokio::test]
async fn test_query_blank_reply_apologizes() {
    let stub = StubProvider::replying("   ");
    let answer = analyzer(&stub).query("How am I doing?", &[]).await.unwrap();
    assert_eq!(answer, QUERY_APOLOGY);

    let stub = StubProvider::failing();
    let answer = analyzer(&stub).query("How am I doing?", &[]).await.unwrap();
    assert_eq!(answer, QUERY_APOLOGY);
}

#[tokio::test]
async fn test_insights_paths() {
    let stub = StubProvider::replying("Unused");
    assert_eq!(analyzer(&stub).insights(&[]).await, NO_ENTRIES_INSIGHT);
    assert_eq!(stub.calls(), 0);

    let stub = StubProvider::replying("```json\n{\"insights\": \"Calm days follow long walks.\"}\n```");
    let text = analyzer(&stub).insights(&[AnalysisResult::fallback()]).await;
    assert_eq!(text, "Calm days follow long walks.");

    let stub = StubProvider::failing();
    let analyzer = analyzer(&stub);
    assert_eq!(analyzer.insights(&[AnalysisResult::fallback()]).await, FAILED_INSIGHT);
    assert_eq!(analyzer.last_failure().await.unwrap().operation, "insights");
}
