use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::TranslationError;

fn fence_line() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"^\s*```[\w+-]*\s*$").expect("fence pattern is valid"))
}

/// Trim the reply and, if it is wrapped in a code fence, keep only the fenced body.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    trimmed
        .lines()
        .filter(|line| !fence_line().is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Byte ranges of balanced `[...]` spans that start at depth zero, in order.
/// Brackets inside JSON string literals are ignored.
fn top_level_arrays(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '[' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }
    spans
}

/// Find the first array literal embedded in surrounding text that parses as JSON.
pub fn extract_first_array(text: &str) -> Option<Value> {
    top_level_arrays(text)
        .into_iter()
        .find_map(|(start, end)| serde_json::from_str::<Value>(&text[start..end]).ok())
}

/// Parse cleaned model text: strict JSON first, then the first embedded array.
pub fn parse_json(cleaned: &str) -> Option<Value> {
    serde_json::from_str::<Value>(cleaned)
        .ok()
        .or_else(|| extract_first_array(cleaned))
}

/// Check that `value` is an array of strings.
pub fn validate_strings(value: Value, raw: &str) -> Result<Vec<String>, TranslationError> {
    let items = match value {
        Value::Array(items) => items,
        _ => {
            return Err(TranslationError::ModelOutputShape {
                raw: raw.to_string(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s),
            other => Err(TranslationError::ModelOutputElementType { index, value: other }),
        })
        .collect()
}

/// Turn raw model text into the list of translated strings.
pub fn parse_translations(raw: &str) -> Result<Vec<String>, TranslationError> {
    let cleaned = strip_code_fences(raw);
    let value = parse_json(&cleaned).ok_or_else(|| TranslationError::ModelOutputParse {
        raw: raw.to_string(),
    })?;
    validate_strings(value, raw)
}
