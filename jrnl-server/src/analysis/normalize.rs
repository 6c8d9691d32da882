//! Response normalizer
//!
//! Turns raw model text into a validated `AnalysisResult`:
//! 1. Take the first ```` ```json ```` fenced block
//! 2. Parse it (bare members are wrapped in braces first)
//! 3. Coerce each field, falling back to per-field defaults
//! 4. Rebalance the three percentages to sum to exactly 100

use jrnl_common::{AnalysisResult, Mood};
use serde_json::{Map, Value};
use thiserror::Error;

/// Summary used when the model omits one
pub const MISSING_SUMMARY: &str = "Unable to analyze the entry content.";

pub const DEFAULT_MOOD_SCORE: i64 = 50;
pub const DEFAULT_POSITIVE: i64 = 33;
pub const DEFAULT_NEUTRAL: i64 = 34;
pub const DEFAULT_NEGATIVE: i64 = 33;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("No JSON block found in output")]
    MissingJsonBlock,

    #[error("Invalid JSON in output: {0}")]
    InvalidJson(String),
}

/// Normalize a raw analysis response
pub fn normalize(raw: &str) -> Result<AnalysisResult, NormalizeError> {
    let parsed = parse_json_block(raw)?;
    let fields = parsed
        .as_object()
        .ok_or_else(|| NormalizeError::InvalidJson("expected a JSON object".into()))?;

    let mut result = AnalysisResult {
        summary: summary_field(fields),
        mood: fields
            .get("mood")
            .and_then(Value::as_str)
            .and_then(Mood::parse)
            .unwrap_or(Mood::Neutral),
        negative: fields.get("negative").map(is_truthy).unwrap_or(false),
        mood_score: bounded_field(fields, "moodScore", DEFAULT_MOOD_SCORE),
        positive_percentage: bounded_field(fields, "positivePercentage", DEFAULT_POSITIVE),
        neutral_percentage: bounded_field(fields, "neutralPercentage", DEFAULT_NEUTRAL),
        negative_percentage: bounded_field(fields, "negativePercentage", DEFAULT_NEGATIVE),
    };

    rebalance(&mut result);
    Ok(result)
}

/// Text inside the first ```` ```json ... ``` ```` block, trimmed
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(rest[..end].trim())
}

/// Locate and parse the fenced JSON block
pub fn parse_json_block(text: &str) -> Result<Value, NormalizeError> {
    let block = extract_json_block(text).ok_or(NormalizeError::MissingJsonBlock)?;

    let json = if block.starts_with('{') {
        block.to_string()
    } else {
        format!("{{{}}}", block)
    };

    serde_json::from_str(&json).map_err(|e| NormalizeError::InvalidJson(e.to_string()))
}

/// Scale positive and neutral by 100/sum, derive negative from the remainder
///
/// A zero sum (every percentage clamped to 0) resets to the defaults.
pub fn rebalance(result: &mut AnalysisResult) {
    let sum = result.percentage_sum();
    if sum == 100 {
        return;
    }

    if sum <= 0 {
        result.positive_percentage = DEFAULT_POSITIVE;
        result.neutral_percentage = DEFAULT_NEUTRAL;
        result.negative_percentage = DEFAULT_NEGATIVE;
        return;
    }

    let factor = 100.0 / sum as f64;
    let positive = (result.positive_percentage as f64 * factor).round() as i64;
    let mut neutral = (result.neutral_percentage as f64 * factor).round() as i64;

    // Two halves rounding up together can overshoot by one
    if positive + neutral > 100 {
        neutral = 100 - positive;
    }

    result.positive_percentage = positive;
    result.neutral_percentage = neutral;
    result.negative_percentage = 100 - positive - neutral;
}

fn summary_field(fields: &Map<String, Value>) -> String {
    match fields.get("summary") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64().map(|v| v != 0.0).unwrap_or(false) => n.to_string(),
        _ => MISSING_SUMMARY.to_string(),
    }
}

/// Coerce, default on missing/zero/non-numeric, clamp to [0, 100], round
fn bounded_field(fields: &Map<String, Value>, key: &str, default: i64) -> i64 {
    let value = fields
        .get(key)
        .and_then(to_number)
        .filter(|v| *v != 0.0)
        .unwrap_or(default as f64);

    value.clamp(0.0, 100.0).round() as i64
}

/// Numeric coercion: numbers, numeric strings and booleans; NaN becomes None
fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        // Arrays coerce through their string form: [] is 0, [x] is x
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [Value::Null] => 0.0,
            [single @ (Value::Number(_) | Value::String(_) | Value::Array(_))] => {
                return to_number(single)
            }
            _ => return None,
        },
        Value::Object(_) => return None,
    };

    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// `false`, `0`, `""` and `null` are false; everything else is true
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
