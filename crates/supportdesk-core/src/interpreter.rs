//! Decoding of the model's raw text output into an [`AnalysisResult`].

use serde_json::{Map, Value};

use crate::analysis::AnalysisResult;
use crate::error::DecodeError;

/// Remove markdown code fences that models like to wrap JSON in.
///
/// A ```` ```json ```` opening is checked first, then a bare ```` ``` ````.
/// Every marker of the detected kind is removed, not only the outer pair.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with("```json") {
        return trimmed.replace("```json", "").replace("```", "").trim().to_string();
    }
    if trimmed.starts_with("```") {
        return trimmed.replace("```", "").trim().to_string();
    }

    trimmed.to_string()
}

fn field(object: &Map<String, Value>, name: &'static str, raw: &str) -> Result<String, DecodeError> {
    match object.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(DecodeError::MissingField {
            raw: raw.to_string(),
            field: name,
        }),
        // Rendered as opaque text, same as a string would be
        Some(other) => Ok(other.to_string()),
    }
}

/// Decode one model response. Single attempt, no repair.
pub fn interpret(raw: &str) -> Result<AnalysisResult, DecodeError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(&cleaned).map_err(|source| DecodeError::InvalidJson {
        raw: cleaned.clone(),
        source,
    })?;

    let object = match value {
        Value::Object(object) => object,
        _ => return Err(DecodeError::NotAnObject { raw: cleaned }),
    };

    let result = AnalysisResult {
        category: field(&object, "category", &cleaned)?,
        sentiment: field(&object, "sentiment", &cleaned)?,
        reply: field(&object, "reply", &cleaned)?,
    };

    if !result.has_known_category() {
        tracing::warn!(category = %result.category, "model returned a category outside the prompted list");
    }
    if !result.has_known_sentiment() {
        tracing::warn!(sentiment = %result.sentiment, "model returned a sentiment outside the prompted list");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks."}"#;

    fn expected() -> AnalysisResult {
        AnalysisResult {
            category: "Spam".to_string(),
            sentiment: "Neutral".to_string(),
            reply: "Thanks.".to_string(),
        }
    }

    #[test]
    fn test_strip_json_tagged_fence() {
        let raw = format!("```json\n{}\n```", CLEAN);
        assert_eq!(strip_code_fences(&raw), CLEAN);
    }

    #[test]
    fn test_strip_untagged_fence() {
        let raw = format!("  ```\n{}\n```  \n", CLEAN);
        assert_eq!(strip_code_fences(&raw), CLEAN);
    }

    #[test]
    fn test_strip_without_fence_only_trims() {
        assert_eq!(strip_code_fences(&format!("\n\t{} ", CLEAN)), CLEAN);
    }

    #[test]
    fn test_strip_ignores_fence_not_at_start() {
        let raw = format!("Here you go: ```json {} ```", CLEAN);
        assert_eq!(strip_code_fences(&raw), raw);
    }

    #[test]
    fn test_interpret_clean_json() {
        assert_eq!(interpret(CLEAN).unwrap(), expected());
    }

    #[test]
    fn test_interpret_fenced_matches_unfenced() {
        let fenced = format!("```json\n{}\n```", CLEAN);
        assert_eq!(interpret(&fenced).unwrap(), interpret(CLEAN).unwrap());

        let bare = format!("```\n{}\n```", CLEAN);
        assert_eq!(interpret(&bare).unwrap(), expected());
    }

    #[test]
    fn test_interpret_truncated_json() {
        let err = interpret(r#"{"category":"Spam""#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson { .. }));
        assert_eq!(err.raw(), r#"{"category":"Spam""#);
    }

    #[test]
    fn test_interpret_prose_is_invalid() {
        let err = interpret("I think this is spam.").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson { .. }));
    }

    #[test]
    fn test_interpret_missing_field() {
        let err = interpret(r#"{"category":"Spam","sentiment":"Neutral"}"#).unwrap_err();
        match err {
            DecodeError::MissingField { field, .. } => assert_eq!(field, "reply"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_interpret_null_field_counts_as_missing() {
        let err = interpret(r#"{"category":null,"sentiment":"Neutral","reply":"Hi"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "category", .. }));
    }

    #[test]
    fn test_interpret_array_is_rejected() {
        let err = interpret(r#"[{"category":"Spam"}]"#).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { .. }));
    }

    #[test]
    fn test_interpret_passes_unknown_values_through() {
        let raw = r#"{"category":"Billing","sentiment":"Mixed","reply":"On it."}"#;
        let result = interpret(raw).unwrap();
        assert_eq!(result.category, "Billing");
        assert_eq!(result.sentiment, "Mixed");
    }

    #[test]
    fn test_interpret_keeps_extra_fields_out() {
        let raw = r#"{"category":"Spam","sentiment":"Neutral","reply":"Thanks.","confidence":0.9}"#;
        assert_eq!(interpret(raw).unwrap(), expected());
    }

    #[test]
    fn test_interpret_non_string_field_rendered_as_text() {
        let raw = r#"{"category":"Spam","sentiment":"Neutral","reply":42}"#;
        assert_eq!(interpret(raw).unwrap().reply, "42");
    }
}
