//! Request payload construction.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

/// Recursively replace `{{key}}` placeholders in every string of `template`.
#[must_use]
pub fn replace_placeholders(template: &Value, mapping: &HashMap<&str, &str>) -> Value {
    match template {
        Value::String(s) => {
            let mut out = s.clone();
            for (key, value) in mapping {
                out = out.replace(&format!("{{{{{key}}}}}"), value);
            }
            Value::String(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| replace_placeholders(item, mapping))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), replace_placeholders(v, mapping)))
                .collect::<Map<_, _>>(),
        ),
        other => other.clone(),
    }
}

/// Sampling parameters for the default chat-completion payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling.
    pub top_p: f64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}

/// OpenAI-style chat-completion payload. `model` is omitted when empty.
#[must_use]
pub fn build_default_payload(
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    sampling: Sampling,
) -> Value {
    let mut payload = json!({
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
        "temperature": sampling.temperature,
        "top_p": sampling.top_p,
        "stream": false,
    });
    if !model.is_empty() {
        payload["model"] = Value::String(model.to_string());
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_placeholders() {
        let template = json!({"a": "{{x}}", "b": [{"c": "{{y}}"}], "n": 1});
        let mapping = HashMap::from([("x", "1"), ("y", "2")]);

        let out = replace_placeholders(&template, &mapping);
        assert_eq!(out, json!({"a": "1", "b": [{"c": "2"}], "n": 1}));
    }

    #[test]
    fn test_replace_placeholders_leaves_unknown() {
        let template = json!("{{model}} / {{other}}");
        let mapping = HashMap::from([("model", "m1")]);
        assert_eq!(replace_placeholders(&template, &mapping), json!("m1 / {{other}}"));
    }

    #[test]
    fn test_default_payload_with_model() {
        let payload = build_default_payload("demo", "s", "u", Sampling::default());
        assert_eq!(payload["model"], "demo");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "u");
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["top_p"], 0.9);
        assert_eq!(payload["stream"], false);
    }

    #[test]
    fn test_default_payload_omits_empty_model() {
        let payload = build_default_payload("", "s", "u", Sampling::default());
        assert!(payload.get("model").is_none());
    }
}
