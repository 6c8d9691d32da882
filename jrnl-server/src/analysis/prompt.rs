//! Prompt composition for the three LLM calls: entry analysis, free-form
//! query over recent entries, and insights over stored analyses.

use jrnl_common::time::long_date_label;
use jrnl_common::{db::EntryWithAnalysis, AnalysisResult};

use super::AnalysisError;
use crate::llm::ChatPrompt;

/// Most recent entries embedded in a query prompt
pub const QUERY_CONTEXT_LIMIT: usize = 10;

/// Characters of entry content embedded per entry in a query prompt
pub const EXCERPT_CHARS: usize = 200;

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert AI psychologist analyzing a personal journal entry.
Your task is to analyze the emotional content, mood, and sentiment of the provided text.

Output your answer as JSON that matches the given schema: ```json
{
  "summary": "string - A concise summary of the journal entry content",
  "mood": "string - One of: HAPPY, SAD, ANGRY, NEUTRAL, EXCITED, CALM",
  "negative": "boolean - Whether the overall sentiment is negative",
  "moodScore": "number - Overall mood score from 0 (very negative) to 100 (very positive)",
  "positivePercentage": "number - Percentage of positive emotions (0-100)",
  "neutralPercentage": "number - Percentage of neutral emotions (0-100)",
  "negativePercentage": "number - Percentage of negative emotions (0-100)"
}
```

Make sure to wrap the answer in ```json and ``` tags. Do not add any explanation or extra text.

Example:
```json
{
  "summary": "Today was a productive and positive day. The author completed important tasks and felt accomplished.",
  "mood": "HAPPY",
  "negative": false,
  "moodScore": 85,
  "positivePercentage": 70,
  "neutralPercentage": 20,
  "negativePercentage": 10
}
```"#;

const QUERY_SYSTEM_PROMPT: &str = r#"You are a thoughtful AI journaling assistant with access to the user's most recent journal entries.
Answer the user's question using only the entries below. Refer to entries by date when it helps.
If the entries do not contain enough information to answer, say so honestly.
Be warm, concise and supportive. Respond in plain text without JSON or markdown headings.

Recent journal entries:
"#;

const INSIGHTS_SYSTEM_PROMPT: &str = r#"You are a helpful AI life coach. Based on the following journal analysis data, provide 2-3 brief, encouraging insights or suggestions for the user.

Provide practical, positive advice focusing on patterns, emotional well-being, and personal growth.
Keep it concise and encouraging (2-3 sentences maximum).

You can either respond in plain text or as JSON:
```json
{
  "insights": "Your insights here..."
}
```"#;

/// Analysis prompt for one entry; rejects blank content
pub fn analysis_prompt(content: &str) -> Result<ChatPrompt, AnalysisError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AnalysisError::EmptyContent);
    }
    Ok(ChatPrompt::new(ANALYSIS_SYSTEM_PROMPT, content))
}

/// Question prompt over at most `QUERY_CONTEXT_LIMIT` entries
///
/// `entries` must already be ordered newest first.
pub fn query_prompt(question: &str, entries: &[EntryWithAnalysis]) -> Result<ChatPrompt, AnalysisError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AnalysisError::EmptyQuery);
    }

    let context = if entries.is_empty() {
        "(no journal entries yet)".to_string()
    } else {
        entries
            .iter()
            .take(QUERY_CONTEXT_LIMIT)
            .enumerate()
            .map(|(i, e)| render_entry(i + 1, e))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    Ok(ChatPrompt::new(
        format!("{}{}", QUERY_SYSTEM_PROMPT, context),
        question,
    ))
}

/// Insights prompt; `None` when there is nothing to summarize
pub fn insights_prompt(analyses: &[AnalysisResult]) -> Option<ChatPrompt> {
    if analyses.is_empty() {
        return None;
    }

    let data = analyses
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "Entry {}: Mood: {}, Score: {}, Summary: {}",
                i + 1,
                a.mood,
                a.mood_score,
                a.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Some(ChatPrompt::new(INSIGHTS_SYSTEM_PROMPT, data))
}

fn render_entry(index: usize, item: &EntryWithAnalysis) -> String {
    let (mood, summary) = match &item.analysis {
        Some(a) => (a.result.mood.as_str(), a.result.summary.as_str()),
        None => ("Not analyzed", "No summary available"),
    };

    format!(
        "Entry {} ({}):\nMood: {}\nSummary: {}\nContent: {}",
        index,
        long_date_label(&item.entry.created_at),
        mood,
        summary,
        excerpt(&item.entry.content, EXCERPT_CHARS)
    )
}

/// First `max_chars` characters, with "..." appended when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
