//! Validation of raw model output into typed questions.
//!
//! Each raw item either becomes a complete `QuizQuestion` or is dropped.
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

use lessondb_core::types::QuizQuestion;

const OPTION_COUNT: usize = 4;

struct Candidate {
    question: String,
    options: [String; OPTION_COUNT],
    answer_index: usize,
    explanation: String,
}

/// Normalize the raw `questions` value. Survivors are renumbered `1..=k` in
/// generation order with ids `{topic_id}_{n}`, then the first `count` are kept.
pub fn normalize_questions(raw: &Value, topic_id: &str, count: usize) -> Vec<QuizQuestion> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(normalize_item)
        .take(count)
        .enumerate()
        .map(|(i, c)| QuizQuestion {
            id: format!("{}_{}", topic_id, i + 1),
            question: c.question,
            options: c.options,
            answer_index: c.answer_index,
            explanation: c.explanation,
        })
        .collect()
}

fn normalize_item(item: &Value) -> Option<Candidate> {
    let obj = item.as_object()?;

    let question = obj
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())?
        .to_string();

    let supplied: Vec<String> = obj
        .get("options")?
        .as_array()?
        .iter()
        .filter_map(scalar_text)
        .filter(|o| !o.is_empty())
        .collect();
    if supplied.len() < OPTION_COUNT {
        return None;
    }
    let options: [String; OPTION_COUNT] = [
        supplied[0].clone(),
        supplied[1].clone(),
        supplied[2].clone(),
        supplied[3].clone(),
    ];
    // Extra options were cut; refuse a first four that cannot be told apart.
    if supplied.len() > OPTION_COUNT && has_duplicates(&options) {
        return None;
    }

    let answer_index = resolve_answer(obj, &options)?;

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .map(|e| e.trim().to_string())
        .unwrap_or_default();

    Some(Candidate { question, options, answer_index, explanation })
}

/// Prefer an integral `answerIndex` in range; otherwise match `answer` text
/// case-insensitively against the options.
fn resolve_answer(obj: &Map<String, Value>, options: &[String; OPTION_COUNT]) -> Option<usize> {
    if let Some(index) = obj.get("answerIndex").and_then(integral_index) {
        if index < OPTION_COUNT {
            return Some(index);
        }
    }
    let answer = obj.get("answer").and_then(scalar_text)?.to_lowercase();
    options.iter().position(|o| o.to_lowercase() == answer)
}

fn integral_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f < OPTION_COUNT as f64 {
        return Some(f as usize);
    }
    None
}

/// Trimmed text of a scalar JSON value. Null and containers yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `1.0` renders as `1`, the way the model's answer text spells it.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn has_duplicates(options: &[String]) -> bool {
    let mut seen = HashSet::new();
    options.iter().any(|o| !seen.insert(o.to_lowercase()))
}
