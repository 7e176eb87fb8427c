//! Dotted-path lookup into JSON responses.
//!
//! Completion APIs disagree on where the answer lives. A path such as
//! `choices.0.message.content` names it: numeric segments index arrays and
//! other segments select object keys.

use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};

/// Paths appended after the configured ones, in order.
pub const FALLBACK_PATHS: [&str; 8] = [
    "choices.0.message.final",
    "choices.0.message.answer",
    "choices.0.message.content",
    "choices.0.text",
    "response.output_text",
    "output_text",
    "data.text",
    "text",
];

/// Follow `path` through `value`. An empty path returns `value` itself.
///
/// # Errors
///
/// Returns [`Error::PathNavigate`] when a segment is not a valid index, a key
/// or index is missing, or the current value is a scalar.
pub fn extract_by_path<'a>(value: &'a Value, path: &str) -> Result<&'a Value> {
    if path.is_empty() {
        return Ok(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Array(items) => {
                let index: usize = part
                    .parse()
                    .map_err(|_| Error::path_navigate(part, "expected an array index"))?;
                items.get(index).ok_or_else(|| {
                    Error::path_navigate(part, format!("index out of range (len {})", items.len()))
                })?
            }
            Value::Object(map) => map
                .get(part)
                .ok_or_else(|| Error::path_navigate(part, "key not found"))?,
            other => {
                return Err(Error::path_navigate(
                    part,
                    format!("cannot descend into {}", type_name(other)),
                ))
            }
        };
    }
    Ok(current)
}

/// Configured paths followed by the fallbacks, without duplicates.
#[must_use]
pub fn candidate_paths(configured: &[String]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::with_capacity(configured.len() + FALLBACK_PATHS.len());
    for path in configured
        .iter()
        .map(String::as_str)
        .chain(FALLBACK_PATHS)
    {
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }
    paths
}

/// Return the value at the first path that resolves to a non-null value.
///
/// # Errors
///
/// Returns [`Error::ResponseExtract`] listing every path tried when none
/// resolves.
pub fn extract_first_available<'a>(value: &'a Value, paths: &[String]) -> Result<&'a Value> {
    let mut last = String::from("no response paths configured");
    for path in paths {
        match extract_by_path(value, path) {
            Ok(Value::Null) => {
                trace!(path = %path, "Response path resolved to null");
                last = format!("{path} is null");
            }
            Ok(found) => {
                trace!(path = %path, "Response path resolved");
                return Ok(found);
            }
            Err(e) => {
                trace!(path = %path, error = %e, "Response path missed");
                last = e.to_string();
            }
        }
    }
    Err(Error::ResponseExtract {
        paths: paths.to_vec(),
        last,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_by_path() {
        let obj = json!({"choices": [{"message": {"content": "ok"}}]});
        let found = extract_by_path(&obj, "choices.0.message.content").unwrap();
        assert_eq!(found, &json!("ok"));
    }

    #[test]
    fn test_extract_empty_path_returns_root() {
        let obj = json!({"a": 1});
        assert_eq!(extract_by_path(&obj, "").unwrap(), &obj);
    }

    #[test]
    fn test_extract_errors() {
        let obj = json!({"choices": [{"text": "x"}], "n": 3});

        let err = extract_by_path(&obj, "choices.first").unwrap_err();
        assert!(err.to_string().contains("array index"));

        let err = extract_by_path(&obj, "choices.4.text").unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = extract_by_path(&obj, "missing").unwrap_err();
        assert!(err.to_string().contains("key not found"));

        let err = extract_by_path(&obj, "n.value").unwrap_err();
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_candidate_paths_dedup_and_order() {
        let paths = candidate_paths(&["data.text".to_string(), "custom.out".to_string()]);
        assert_eq!(paths[0], "data.text");
        assert_eq!(paths[1], "custom.out");
        assert_eq!(paths.iter().filter(|p| *p == "data.text").count(), 1);
        assert_eq!(paths.len(), 2 + FALLBACK_PATHS.len() - 1);
        assert_eq!(paths.last().map(String::as_str), Some("text"));
    }

    #[test]
    fn test_extract_first_available_skips_null() {
        let obj = json!({"choices": [{"message": {"final": null, "content": "body"}}]});
        let paths = candidate_paths(&[]);
        assert_eq!(extract_first_available(&obj, &paths).unwrap(), &json!("body"));
    }

    #[test]
    fn test_extract_first_available_reports_all_paths() {
        let obj = json!({"unexpected": true});
        let paths = candidate_paths(&["result".to_string()]);
        let err = extract_first_available(&obj, &paths).unwrap_err();
        match err {
            Error::ResponseExtract { paths: tried, last } => {
                assert_eq!(tried.len(), paths.len());
                assert!(last.contains("text"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
