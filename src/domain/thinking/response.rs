//! Extraction of structured documents from raw model output.

use serde_json::Value;

/// Keys whose array elements count as shots.
pub const SHOT_KEYS: &[&str] = &["shots", "storyboard", "scene_formula", "chapter_beats"];

/// Pulls the JSON object out of a model response.
///
/// Models often wrap JSON in Markdown code fences or surround it with prose,
/// so this strips fences and takes the span from the first `{` to the last
/// `}`. The result must be a JSON object.
pub fn extract_json_object(raw: &str) -> Result<Value, String> {
    let text = strip_code_fences(raw.trim());
    let start = text.find('{').ok_or_else(|| "no JSON object found".to_string())?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| "unterminated JSON object".to_string())?;

    let value: Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| format!("invalid JSON: {}", e))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("top-level JSON value is not an object".to_string())
    }
}

fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Counts shots anywhere in a document.
///
/// Every array found under one of [`SHOT_KEYS`] contributes its length,
/// at any nesting depth.
pub fn count_shots(document: &Value) -> u32 {
    match document {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let own = match value {
                    Value::Array(items) if SHOT_KEYS.contains(&key.as_str()) => items.len() as u32,
                    _ => 0,
                };
                own + count_shots(value)
            })
            .sum(),
        Value::Array(items) => items.iter().map(count_shots).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_bare_object() {
        let value = extract_json_object(r#"{"title": "画符"}"#).unwrap();
        assert_eq!(value["title"], "画符");
    }

    #[test]
    fn extracts_from_code_fence() {
        let raw = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"title": "x"}));
    }

    #[test]
    fn extracts_from_surrounding_prose() {
        let raw = "好的，以下是蓝图：\n{\"a\": {\"b\": 1}}\n希望对你有帮助。";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn rejects_missing_object() {
        assert!(extract_json_object("no json here").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = extract_json_object("{\"a\": }").unwrap_err();
        assert!(err.starts_with("invalid JSON"));
    }

    #[test]
    fn counts_shots_at_any_depth() {
        let doc = json!({
            "opening": {"storyboard": [1, 2]},
            "chapters": [
                {"chapter_beats": ["a", "b", "c"]},
                {"shots": [{"id": 1}]}
            ],
            "notes": ["not", "counted"]
        });
        assert_eq!(count_shots(&doc), 6);
    }

    #[test]
    fn shot_key_with_non_array_counts_nothing() {
        assert_eq!(count_shots(&json!({"shots": "many"})), 0);
        assert_eq!(count_shots(&json!({})), 0);
    }
}
