//! Database models
//!
//! JSON field names are camelCase; `Mood` serializes as its uppercase label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Summary stored when analysis could not be performed
pub const FALLBACK_SUMMARY: &str = "Unable to analyze the journal entry content at this time.";

/// Dominant mood of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Neutral,
    Excited,
    Calm,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Neutral,
        Mood::Excited,
        Mood::Calm,
    ];

    /// Exact (case-sensitive) match against the uppercase label
    pub fn parse(label: &str) -> Option<Mood> {
        Self::ALL.into_iter().find(|m| m.as_str() == label)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "HAPPY",
            Mood::Sad => "SAD",
            Mood::Angry => "ANGRY",
            Mood::Neutral => "NEUTRAL",
            Mood::Excited => "EXCITED",
            Mood::Calm => "CALM",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::parse(s).ok_or_else(|| Error::InvalidInput(format!("Unknown mood: {}", s)))
    }
}

/// Validated mood analysis of one entry
///
/// Percentages always sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub mood: Mood,
    pub negative: bool,
    pub mood_score: i64,
    pub positive_percentage: i64,
    pub neutral_percentage: i64,
    pub negative_percentage: i64,
}

impl AnalysisResult {
    /// Fixed neutral result used whenever analysis fails
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            mood: Mood::Neutral,
            negative: false,
            mood_score: 50,
            positive_percentage: 33,
            neutral_percentage: 34,
            negative_percentage: 33,
        }
    }

    pub fn percentage_sum(&self) -> i64 {
        self.positive_percentage + self.neutral_percentage + self.negative_percentage
    }
}

/// How an analysis result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Parsed from a provider response
    Analyzed,
    /// Provider or parse failure; result is `AnalysisResult::fallback()`
    Fallback,
}

/// Local user record keyed by the identity provider's user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted analysis, at most one per entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: String,
    pub entry_id: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryWithAnalysis {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub analysis: Option<StoredAnalysis>,
}
