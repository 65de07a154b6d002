//! Turning raw model replies into structured analysis results.
//!
//! Replies are expected to be a single JSON object, but models routinely wrap
//! them in markdown code fences or drop fields. Fence stripping happens first,
//! then a lenient parse into a partial record, then per-field coercion with
//! defaults for anything missing.
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AnalyzeError;
use crate::models::AnalysisResult;

/// Partial form of the model's reply: any field may be missing. Unknown extra
/// fields are ignored.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    readability: Option<Value>,
    seo: Option<Value>,
    grammar: Option<Value>,
    tone: Option<Value>,
    overall: Option<Value>,
    suggestion: Option<Value>,
}

/// Remove markdown code fences a model may wrap around its JSON output.
///
/// Strips a leading ``` (with an optional language tag such as `json`)
/// anchored at the start of the text and a trailing ``` anchored at the end,
/// tolerating surrounding whitespace. Text without fences passes through
/// trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Skip the language tag if one follows the opening fence
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        text = rest.trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

/// Parse a raw model reply into an [`AnalysisResult`].
///
/// Missing fields default (scores to 0, text to ""). A reply that is not a
/// JSON object, or a score field holding a non-numeric value, is an error
/// that carries the raw reply verbatim for diagnosis.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalyzeError> {
    let cleaned = strip_code_fences(raw);

    let parsed: RawAnalysis =
        serde_json::from_str(cleaned).map_err(|e| AnalyzeError::UnparsableReply {
            message: e.to_string(),
            raw: raw.to_string(),
        })?;

    Ok(AnalysisResult {
        readability: coerce_score("readability", parsed.readability.as_ref(), raw)?,
        seo: coerce_score("seo", parsed.seo.as_ref(), raw)?,
        grammar: coerce_score("grammar", parsed.grammar.as_ref(), raw)?,
        tone: coerce_text(parsed.tone.as_ref()),
        overall: coerce_text(parsed.overall.as_ref()),
        suggestion: coerce_text(parsed.suggestion.as_ref()),
    })
}

/// Absent scores default to 0. Numbers (floats truncate toward zero) and
/// numeric strings coerce; anything else present is an error. Values outside
/// 0-100 are passed through unchanged.
fn coerce_score(
    field: &'static str,
    value: Option<&Value>,
    raw: &str,
) -> Result<i64, AnalyzeError> {
    let not_numeric = |value: &Value| AnalyzeError::ScoreNotNumeric {
        field,
        value: value.to_string(),
        raw: raw.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| not_numeric(&Value::Number(n.clone()))),
        Some(v @ Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                .ok_or_else(|| not_numeric(v))
        }
        Some(other) => Err(not_numeric(other)),
    }
}

/// Absent text fields default to "". Strings pass through; any other JSON
/// value becomes its JSON text representation.
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_fences("{\"readability\": 80}", "{\"readability\": 80}")]
    #[case::leading_fence_only("```json\n{\"readability\": 80}", "{\"readability\": 80}")]
    #[case::fenced_with_tag("```json\n{\"readability\": 80}\n```", "{\"readability\": 80}")]
    #[case::fenced_without_tag("```\n{\"readability\": 80}\n```", "{\"readability\": 80}")]
    #[case::surrounding_whitespace(
        "  \n```json\n{\"readability\": 80}\n```  \n",
        "{\"readability\": 80}"
    )]
    fn strips_code_fences(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fences(input), expected);
    }

    #[test]
    fn parses_a_complete_reply() {
        let raw = r#"{
            "readability": 40,
            "seo": 55,
            "grammar": 30,
            "tone": "Casual",
            "overall": "Poor",
            "suggestion": "Fix grammar and tone."
        }"#;

        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.readability, 40);
        assert_eq!(result.seo, 55);
        assert_eq!(result.grammar, 30);
        assert_eq!(result.tone, "Casual");
        assert_eq!(result.overall, "Poor");
        assert_eq!(result.suggestion, "Fix grammar and tone.");
    }

    #[test]
    fn parses_a_fenced_reply() {
        let raw = "```json\n{\"readability\": 85, \"tone\": \"Formal\"}\n```";
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.readability, 85);
        assert_eq!(result.tone, "Formal");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let result = parse_analysis(r#"{"readability": 70, "tone": "Neutral"}"#).unwrap();
        assert_eq!(result.readability, 70);
        assert_eq!(result.seo, 0);
        assert_eq!(result.grammar, 0);
        assert_eq!(result.tone, "Neutral");
        assert_eq!(result.overall, "");
        assert_eq!(result.suggestion, "");
    }

    #[test]
    fn null_fields_get_defaults() {
        let raw = r#"{"readability": null, "seo": 60, "suggestion": null}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.readability, 0);
        assert_eq!(result.seo, 60);
        assert_eq!(result.suggestion, "");
    }

    #[test]
    fn float_scores_truncate_toward_zero() {
        let result = parse_analysis(r#"{"readability": 72.9, "seo": 55.1}"#).unwrap();
        assert_eq!(result.readability, 72);
        assert_eq!(result.seo, 55);
    }

    #[test]
    fn numeric_strings_coerce_to_scores() {
        let result = parse_analysis(r#"{"readability": "87", "seo": "61.5"}"#).unwrap();
        assert_eq!(result.readability, 87);
        assert_eq!(result.seo, 61);
    }

    #[test]
    fn out_of_range_scores_pass_through() {
        let result = parse_analysis(r#"{"readability": 150, "grammar": -10}"#).unwrap();
        assert_eq!(result.readability, 150);
        assert_eq!(result.grammar, -10);
    }

    #[test]
    fn non_numeric_score_is_an_error_naming_the_field() {
        let raw = r#"{"readability": 80, "seo": "high"}"#;
        let err = parse_analysis(raw).unwrap_err();
        match err {
            AnalyzeError::ScoreNotNumeric { field, value, raw: carried } => {
                assert_eq!(field, "seo");
                assert_eq!(value, "\"high\"");
                assert_eq!(carried, raw);
            }
            other => panic!("expected ScoreNotNumeric, got {other:?}"),
        }
    }

    #[test]
    fn boolean_score_is_an_error() {
        let err = parse_analysis(r#"{"grammar": true}"#).unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::ScoreNotNumeric { field: "grammar", .. }
        ));
    }

    #[test]
    fn non_string_text_fields_keep_their_json_form() {
        let result = parse_analysis(r#"{"tone": 5, "overall": ["Good"]}"#).unwrap();
        assert_eq!(result.tone, "5");
        assert_eq!(result.overall, "[\"Good\"]");
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let raw = r#"{"readability": 90, "confidence": 0.99, "model_notes": "n/a"}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.readability, 90);
    }

    #[test]
    fn prose_reply_is_unparsable_and_carries_the_raw_text() {
        let raw = "I cannot help with that.";
        let err = parse_analysis(raw).unwrap_err();
        match err {
            AnalyzeError::UnparsableReply { message, raw: carried } => {
                assert!(!message.is_empty());
                assert_eq!(carried, raw);
            }
            other => panic!("expected UnparsableReply, got {other:?}"),
        }
    }

    #[test]
    fn top_level_array_is_unparsable() {
        let err = parse_analysis(r#"[{"readability": 80}]"#).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnparsableReply { .. }));
    }

    #[test]
    fn fenced_prose_error_still_carries_the_original_text() {
        // The fences are stripped for parsing but the error body reports what
        // the model actually sent.
        let raw = "```json\nnot json at all\n```";
        let err = parse_analysis(raw).unwrap_err();
        match err {
            AnalyzeError::UnparsableReply { raw: carried, .. } => assert_eq!(carried, raw),
            other => panic!("expected UnparsableReply, got {other:?}"),
        }
    }
}
