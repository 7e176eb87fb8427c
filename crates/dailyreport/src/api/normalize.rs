//! Flattening of extracted response values into plain text.

use serde_json::Value;

/// Item types treated as reasoning in multi-part content arrays.
const REASONING_TYPES: [&str; 3] = ["reasoning", "thought", "thinking"];

/// Object keys preferred when an answer is wrapped in an object.
const ANSWER_KEYS: [&str; 5] = ["final", "answer", "output_text", "text", "content"];

/// Convert an extracted value into text.
///
/// - Arrays are treated as multi-part content: text parts are joined by
///   newlines and, with `strip_think`, reasoning parts are skipped.
/// - Objects yield their first non-empty answer-like field, then `message`,
///   and are otherwise serialized as JSON.
/// - Scalars are converted and trimmed.
#[must_use]
pub fn normalize_to_text(value: &Value, strip_think: bool) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| part_text(item, strip_think))
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        Value::Object(map) => {
            for key in ANSWER_KEYS {
                if let Some(inner) = map.get(key).filter(|v| !is_blank(v)) {
                    return normalize_to_text(inner, strip_think);
                }
            }
            if let Some(message) = map.get("message").filter(|v| !is_blank(v)) {
                return normalize_to_text(message, strip_think);
            }
            value.to_string()
        }
        other => scalar_text(other).trim().to_string(),
    }
}

fn part_text(item: &Value, strip_think: bool) -> Option<String> {
    let Value::Object(map) = item else {
        return Some(scalar_text(item));
    };

    let item_type = map
        .get("type")
        .map(scalar_text)
        .unwrap_or_default()
        .to_lowercase();
    if strip_think && REASONING_TYPES.contains(&item_type.as_str()) {
        return None;
    }

    if item_type == "text" {
        return map.get("text").filter(|t| !is_blank(t)).map(scalar_text);
    }
    map.get("text")
        .or_else(|| map.get("content"))
        .map(scalar_text)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_is_trimmed() {
        assert_eq!(normalize_to_text(&json!("  body \n"), true), "body");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(normalize_to_text(&json!(42), true), "42");
        assert_eq!(normalize_to_text(&json!(null), true), "");
    }

    #[test]
    fn test_content_parts_skip_reasoning() {
        let value = json!([
            {"type": "reasoning", "text": "hidden"},
            {"type": "text", "text": "first"},
            {"type": "output", "content": "second"},
            "third",
        ]);
        assert_eq!(normalize_to_text(&value, true), "first\nsecond\nthird");
    }

    #[test]
    fn test_content_parts_keep_reasoning_when_not_stripping() {
        let value = json!([{"type": "Thinking", "text": "why"}, {"type": "text", "text": "what"}]);
        assert_eq!(normalize_to_text(&value, false), "why\nwhat");
    }

    #[test]
    fn test_object_prefers_final_answer() {
        let value = json!({"content": "draft", "final": "done"});
        assert_eq!(normalize_to_text(&value, true), "done");
    }

    #[test]
    fn test_object_skips_empty_fields() {
        let value = json!({"final": "", "answer": null, "text": "t"});
        assert_eq!(normalize_to_text(&value, true), "t");
    }

    #[test]
    fn test_object_message_nesting() {
        let value = json!({"message": {"role": "assistant", "content": "hi"}});
        assert_eq!(normalize_to_text(&value, true), "hi");
    }

    #[test]
    fn test_object_without_text_is_serialized() {
        let value = json!({"score": 1});
        assert_eq!(normalize_to_text(&value, true), r#"{"score":1}"#);
    }
}
