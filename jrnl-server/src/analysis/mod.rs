//! Journal analysis pipeline
//!
//! compose prompt → invoke provider → normalize, with a fixed fallback on
//! any provider or parse failure. Only blank input is reported as an error;
//! everything else resolves to a usable value.

use chrono::{DateTime, Utc};
use jrnl_common::db::{AnalysisStatus, EntryWithAnalysis};
use jrnl_common::AnalysisResult;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::llm::LlmProvider;

pub mod normalize;
pub mod prompt;

pub use normalize::{normalize, NormalizeError};

/// Returned to query callers when the provider fails or says nothing
pub const QUERY_APOLOGY: &str =
    "Sorry, I couldn't process your question at the moment. Please try again.";

pub const NO_ENTRIES_INSIGHT: &str =
    "No journal entries to analyze yet. Start writing to get personalized insights!";
pub const EMPTY_INSIGHT: &str = "Keep up the great work with your journaling!";
pub const FAILED_INSIGHT: &str = "Keep up the great work with your journaling! Regular reflection is a powerful tool for personal growth.";

/// Input rejected before any provider call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("Query cannot be empty")]
    EmptyQuery,
}

/// Analysis result plus how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub status: AnalysisStatus,
}

/// Most recent pipeline failure, reported by /health
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineFailure {
    /// "analysis", "query" or "insights"
    pub operation: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JournalAnalyzer {
    provider: Arc<dyn LlmProvider>,
    last_failure: Arc<RwLock<Option<PipelineFailure>>>,
}

impl JournalAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            last_failure: Arc::new(RwLock::new(None)),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn last_failure(&self) -> Option<PipelineFailure> {
        self.last_failure.read().await.clone()
    }

    /// Analyze one entry's text
    ///
    /// Blank content is an error and the provider is not called. Provider and
    /// parse failures yield `AnalysisResult::fallback()` with status `Fallback`.
    pub async fn analyze(&self, content: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let prompt = prompt::analysis_prompt(content)?;

        let outcome = match self.provider.invoke(&prompt).await {
            Ok(raw) => match normalize(&raw) {
                Ok(result) => {
                    debug!(mood = %result.mood, mood_score = result.mood_score, "Entry analyzed");
                    AnalysisOutcome {
                        result,
                        status: AnalysisStatus::Analyzed,
                    }
                }
                Err(e) => {
                    warn!(error = %e, raw = %raw, "Failed to parse analysis response, using fallback");
                    self.record_failure("analysis", e.to_string()).await;
                    fallback_outcome()
                }
            },
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Analysis request failed, using fallback");
                self.record_failure("analysis", e.to_string()).await;
                fallback_outcome()
            }
        };

        Ok(outcome)
    }

    /// Answer a free-form question over the most recent entries
    ///
    /// `entries` must be ordered newest first; only the first ten are used.
    pub async fn query(
        &self,
        question: &str,
        entries: &[EntryWithAnalysis],
    ) -> Result<String, AnalysisError> {
        let prompt = prompt::query_prompt(question, entries)?;

        match self.provider.invoke(&prompt).await {
            Ok(raw) => {
                let text = raw.trim();
                if text.is_empty() {
                    return Ok(QUERY_APOLOGY.to_string());
                }
                Ok(text.to_string())
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Query request failed");
                self.record_failure("query", e.to_string()).await;
                Ok(QUERY_APOLOGY.to_string())
            }
        }
    }

    /// Two or three encouraging sentences about the given analyses
    pub async fn insights(&self, analyses: &[AnalysisResult]) -> String {
        let Some(prompt) = prompt::insights_prompt(analyses) else {
            return NO_ENTRIES_INSIGHT.to_string();
        };

        match self.provider.invoke(&prompt).await {
            Ok(raw) => {
                let text = extract_insights(&raw);
                if text.is_empty() {
                    EMPTY_INSIGHT.to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Insights request failed");
                self.record_failure("insights", e.to_string()).await;
                FAILED_INSIGHT.to_string()
            }
        }
    }

    async fn record_failure(&self, operation: &'static str, message: String) {
        *self.last_failure.write().await = Some(PipelineFailure {
            operation,
            message,
            at: Utc::now(),
        });
    }
}

fn fallback_outcome() -> AnalysisOutcome {
    AnalysisOutcome {
        result: AnalysisResult::fallback(),
        status: AnalysisStatus::Fallback,
    }
}

/// Prefer the `insights` string of a fenced JSON block, else the raw text
pub fn extract_insights(raw: &str) -> String {
    normalize::parse_json_block(raw)
        .ok()
        .and_then(|value| {
            value
                .get("insights")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| raw.trim().to_string())
}
