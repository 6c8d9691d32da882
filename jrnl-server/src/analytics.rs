//! Analytics over a user's analyzed entries
//!
//! Pure functions: the caller loads entries, this module aggregates.

use jrnl_common::db::EntryWithAnalysis;
use jrnl_common::time::short_date_label;
use jrnl_common::{AnalysisResult, Mood};
use serde::Serialize;

/// Points in the mood trend series
pub const MOOD_TREND_POINTS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTrendPoint {
    /// "Mon D", e.g. "Jul 7"
    pub date: String,
    pub mood_score: i64,
    pub mood: Mood,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionShare {
    pub mood: Mood,
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentCount {
    pub sentiment: Sentiment,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub mood_trend: Vec<MoodTrendPoint>,
    pub emotion_distribution: Vec<EmotionShare>,
    pub sentiment_distribution: Vec<SentimentCount>,
    pub average_mood_score: i64,
    pub total_entries: i64,
    pub analyzed_entries: i64,
}

/// Dominant sentiment of one analysis; ties resolve positive > neutral > negative
pub fn dominant_sentiment(result: &AnalysisResult) -> Sentiment {
    let (p, n, g) = (
        result.positive_percentage,
        result.neutral_percentage,
        result.negative_percentage,
    );
    if p >= n && p >= g {
        Sentiment::Positive
    } else if n >= g {
        Sentiment::Neutral
    } else {
        Sentiment::Negative
    }
}

/// Aggregate analytics; `entries` may be in any order
pub fn compute_analytics(entries: &[EntryWithAnalysis]) -> AnalyticsData {
    let mut analyzed: Vec<_> = entries
        .iter()
        .filter_map(|e| e.analysis.as_ref().map(|a| (e.entry.created_at, &a.result)))
        .collect();
    analyzed.sort_by_key(|(created_at, _)| *created_at);

    let total_entries = entries.len() as i64;
    let analyzed_entries = analyzed.len() as i64;

    if analyzed.is_empty() {
        return AnalyticsData {
            mood_trend: Vec::new(),
            emotion_distribution: Vec::new(),
            sentiment_distribution: Vec::new(),
            average_mood_score: 0,
            total_entries,
            analyzed_entries,
        };
    }

    let skip = analyzed.len().saturating_sub(MOOD_TREND_POINTS);
    let mood_trend = analyzed[skip..]
        .iter()
        .map(|(created_at, r)| MoodTrendPoint {
            date: short_date_label(created_at),
            mood_score: r.mood_score,
            mood: r.mood,
            positive: r.positive_percentage,
            neutral: r.neutral_percentage,
            negative: r.negative_percentage,
        })
        .collect();

    // First-appearance order
    let mut emotion_counts: Vec<(Mood, i64)> = Vec::new();
    for (_, r) in &analyzed {
        match emotion_counts.iter_mut().find(|(m, _)| *m == r.mood) {
            Some((_, count)) => *count += 1,
            None => emotion_counts.push((r.mood, 1)),
        }
    }
    let emotion_distribution = emotion_counts
        .into_iter()
        .map(|(mood, count)| EmotionShare {
            mood,
            count,
            percentage: (count as f64 / analyzed_entries as f64 * 100.0).round() as i64,
        })
        .collect();

    let mut sentiment_distribution = vec![
        SentimentCount { sentiment: Sentiment::Positive, count: 0 },
        SentimentCount { sentiment: Sentiment::Neutral, count: 0 },
        SentimentCount { sentiment: Sentiment::Negative, count: 0 },
    ];
    for (_, r) in &analyzed {
        let sentiment = dominant_sentiment(r);
        if let Some(slot) = sentiment_distribution.iter_mut().find(|s| s.sentiment == sentiment) {
            slot.count += 1;
        }
    }

    let score_sum: i64 = analyzed.iter().map(|(_, r)| r.mood_score).sum();
    let average_mood_score = (score_sum as f64 / analyzed_entries as f64).round() as i64;

    AnalyticsData {
        mood_trend,
        emotion_distribution,
        sentiment_distribution,
        average_mood_score,
        total_entries,
        analyzed_entries,
    }
}
