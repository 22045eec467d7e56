//! Rule set parsing.
//!
//! Normalizes the single-rule inputs (`match`, `retention`, `minimum`) and
//! the list inputs (`multiple`, `unless`) into one [`RuleSet`]. List entries
//! deserialize into strict raw structs: unknown keys and wrongly typed values
//! are rejected with the entry's location, and missing required fields are
//! reported by name rather than silently skipped.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ExceptionRule, RetentionRule, RuleSet, TagMatcher};
use crate::error::{RetentionError, Result};
use crate::window::RetentionWindow;

/// A list input, either serialized as JSON text or already structured
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Serialized(String),
    Structured(Value),
}

impl ListInput {
    fn is_blank(&self) -> bool {
        matches!(self, ListInput::Serialized(text) if text.trim().is_empty())
    }
}

/// Raw rule inputs before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleInputs {
    pub match_pattern: Option<String>,
    pub retention: Option<String>,
    pub minimum: Option<String>,
    pub multiple: Option<ListInput>,
    pub unless: Option<ListInput>,
}

/// One `multiple` entry as written by the user
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetentionEntry {
    #[serde(rename = "match")]
    pattern: Option<String>,
    retention: Option<String>,
    minimum: Option<MinimumInput>,
}

/// One `unless` entry as written by the user
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExceptionEntry {
    #[serde(rename = "match")]
    pattern: Option<String>,
}

/// `minimum` is accepted as a JSON number or as numeric text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MinimumInput {
    Number(serde_json::Number),
    Text(String),
}

impl MinimumInput {
    fn count(&self, location: &str) -> Result<Option<usize>> {
        match self {
            MinimumInput::Number(number) => number
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    RetentionError::invalid_field(
                        location,
                        "minimum",
                        format!("expected a non-negative integer, found {}", number),
                    )
                }),
            MinimumInput::Text(text) if text.trim().is_empty() => Ok(None),
            MinimumInput::Text(text) => parse_minimum_text(location, text).map(Some),
        }
    }
}

/// Validates `inputs` and produces the ordered retention and exception rules.
///
/// A `multiple` list takes precedence over the single-rule inputs, which are
/// only consulted when no list is given. Blank inputs count as absent.
pub fn parse_rule_set(inputs: &RuleInputs) -> Result<RuleSet> {
    let retention = match inputs.multiple.as_ref().filter(|list| !list.is_blank()) {
        Some(list) => list_entries("multiple", list)?
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_retention_entry(index, entry))
            .collect::<Result<Vec<_>>>()?,
        None => vec![parse_single_rule(inputs)?],
    };

    let exceptions = match inputs.unless.as_ref().filter(|list| !list.is_blank()) {
        Some(list) => list_entries("unless", list)?
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_exception_entry(index, entry))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(RuleSet {
        retention,
        exceptions,
    })
}

fn parse_single_rule(inputs: &RuleInputs) -> Result<RetentionRule> {
    let matcher = TagMatcher::from_optional(non_blank(&inputs.match_pattern))?;

    let retention = non_blank(&inputs.retention)
        .map(str::parse::<RetentionWindow>)
        .transpose()?;

    let minimum = non_blank(&inputs.minimum)
        .map(|text| parse_minimum_text("inputs", text))
        .transpose()?;

    Ok(RetentionRule::new(matcher, retention, minimum))
}

fn parse_retention_entry(index: usize, entry: Value) -> Result<RetentionRule> {
    let location = format!("multiple[{}]", index);
    let raw: RawRetentionEntry = deserialize_entry(&location, entry)?;

    let pattern = non_blank(&raw.pattern);
    let retention = non_blank(&raw.retention);

    let missing: Vec<&str> = [("match", pattern.is_none()), ("retention", retention.is_none())]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();
    if !missing.is_empty() {
        return Err(RetentionError::missing_fields(location, &missing));
    }

    let matcher = TagMatcher::from_optional(pattern)?;
    let retention = retention
        .map(str::parse::<RetentionWindow>)
        .transpose()?;
    let minimum = match &raw.minimum {
        Some(minimum) => minimum.count(&location)?,
        None => None,
    };

    Ok(RetentionRule::new(matcher, retention, minimum))
}

fn parse_exception_entry(index: usize, entry: Value) -> Result<ExceptionRule> {
    let location = format!("unless[{}]", index);
    let raw: RawExceptionEntry = deserialize_entry(&location, entry)?;
    let matcher = TagMatcher::from_optional(non_blank(&raw.pattern))?;
    Ok(ExceptionRule::new(matcher))
}

fn deserialize_entry<T>(location: &str, entry: Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(entry)
        .map_err(|e| RetentionError::invalid_field(location, "entry", e.to_string()))
}

fn list_entries(input: &str, list: &ListInput) -> Result<Vec<Value>> {
    let value = match list {
        ListInput::Serialized(text) => {
            serde_json::from_str::<Value>(text).map_err(|e| RetentionError::ConfigNotArray {
                input: input.to_string(),
                reason: format!("not valid JSON ({})", e),
            })?
        }
        ListInput::Structured(value) => value.clone(),
    };

    match value {
        Value::Array(entries) => Ok(entries),
        other => Err(RetentionError::ConfigNotArray {
            input: input.to_string(),
            reason: format!("found {}", kind(&other)),
        }),
    }
}

fn parse_minimum_text(location: &str, text: &str) -> Result<usize> {
    text.trim().parse::<usize>().map_err(|_| {
        RetentionError::invalid_field(
            location,
            "minimum",
            format!("expected a non-negative integer, found '{}'", text),
        )
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowUnit;
    use serde_json::json;

    fn serialized(text: &str) -> Option<ListInput> {
        Some(ListInput::Serialized(text.to_string()))
    }

    #[test]
    fn test_single_rule() {
        let inputs = RuleInputs {
            match_pattern: Some("^v".to_string()),
            retention: Some("30d".to_string()),
            minimum: Some("3".to_string()),
            ..Default::default()
        };
        let rules = parse_rule_set(&inputs).unwrap();
        assert_eq!(rules.retention.len(), 1);
        let rule = &rules.retention[0];
        assert_eq!(rule.matcher.pattern(), Some("^v"));
        assert_eq!(rule.retention, Some(RetentionWindow::new(30, WindowUnit::Days)));
        assert_eq!(rule.minimum, Some(3));
        assert!(rules.exceptions.is_empty());
    }

    #[test]
    fn test_single_rule_with_nothing_set_is_kept() {
        let rules = parse_rule_set(&RuleInputs::default()).unwrap();
        assert_eq!(rules.retention.len(), 1);
        let rule = &rules.retention[0];
        assert!(rule.matcher.matches_everything());
        assert_eq!(rule.retention, None);
        assert_eq!(rule.minimum, None);
    }

    #[test]
    fn test_single_rule_blank_fields_are_absent() {
        let inputs = RuleInputs {
            match_pattern: Some(String::new()),
            retention: Some("  ".to_string()),
            minimum: Some(String::new()),
            multiple: serialized(""),
            unless: serialized(""),
        };
        let rules = parse_rule_set(&inputs).unwrap();
        assert_eq!(rules.retention.len(), 1);
        assert_eq!(rules.retention[0].retention, None);
        assert!(rules.exceptions.is_empty());
    }

    #[test]
    fn test_single_rule_bad_retention() {
        let inputs = RuleInputs {
            retention: Some("30 days".to_string()),
            ..Default::default()
        };
        let err = parse_rule_set(&inputs).unwrap_err();
        assert!(matches!(err, RetentionError::InvalidRetentionFormat { .. }));
    }

    #[test]
    fn test_single_rule_bad_minimum() {
        let inputs = RuleInputs {
            minimum: Some("-1".to_string()),
            ..Default::default()
        };
        let err = parse_rule_set(&inputs).unwrap_err();
        assert!(matches!(
            err,
            RetentionError::ConfigInvalidField { ref field, .. } if field == "minimum"
        ));
    }

    #[test]
    fn test_multiple_supersedes_single() {
        let inputs = RuleInputs {
            match_pattern: Some("^ignored".to_string()),
            retention: Some("1d".to_string()),
            multiple: serialized(
                r#"[{"match": "^v", "retention": "6m", "minimum": 2},
                    {"match": "^dev-", "retention": "7d"}]"#,
            ),
            ..Default::default()
        };
        let rules = parse_rule_set(&inputs).unwrap();
        assert_eq!(rules.retention.len(), 2);
        assert_eq!(rules.retention[0].matcher.pattern(), Some("^v"));
        assert_eq!(rules.retention[0].minimum, Some(2));
        assert_eq!(rules.retention[1].matcher.pattern(), Some("^dev-"));
        assert_eq!(
            rules.retention[1].retention,
            Some(RetentionWindow::new(7, WindowUnit::Days))
        );
        assert_eq!(rules.retention[1].minimum, None);
    }

    #[test]
    fn test_multiple_accepts_structured_list() {
        let inputs = RuleInputs {
            multiple: Some(ListInput::Structured(json!([
                {"match": "^v", "retention": "1y", "minimum": "5"}
            ]))),
            ..Default::default()
        };
        let rules = parse_rule_set(&inputs).unwrap();
        assert_eq!(rules.retention[0].minimum, Some(5));
    }

    #[test]
    fn test_multiple_missing_retention() {
        let inputs = RuleInputs {
            multiple: serialized(r#"[{"match": "^v", "retention": "1y"}, {"match": "^dev"}]"#),
            ..Default::default()
        };
        match parse_rule_set(&inputs).unwrap_err() {
            RetentionError::ConfigMissingFields { location, fields } => {
                assert_eq!(location, "multiple[1]");
                assert_eq!(fields, vec!["retention".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_multiple_missing_both_fields() {
        let inputs = RuleInputs {
            multiple: serialized(r#"[{"minimum": 1, "match": null}]"#),
            ..Default::default()
        };
        match parse_rule_set(&inputs).unwrap_err() {
            RetentionError::ConfigMissingFields { fields, .. } => {
                assert_eq!(fields, vec!["match".to_string(), "retention".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_multiple_not_array() {
        for text in [r#"{"match": "^v", "retention": "1y"}"#, "42", "not json"] {
            let inputs = RuleInputs {
                multiple: serialized(text),
                ..Default::default()
            };
            let err = parse_rule_set(&inputs).unwrap_err();
            assert!(
                matches!(err, RetentionError::ConfigNotArray { ref input, .. } if input == "multiple"),
                "{} should not be accepted: {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_multiple_rejects_unknown_field() {
        let inputs = RuleInputs {
            multiple: serialized(r#"[{"match": "^v", "retention": "1y", "retain": 3}]"#),
            ..Default::default()
        };
        match parse_rule_set(&inputs).unwrap_err() {
            RetentionError::ConfigInvalidField { location, reason, .. } => {
                assert_eq!(location, "multiple[0]");
                assert!(reason.contains("retain"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_multiple_rejects_wrong_types() {
        let cases = [
            (r#"[{"match": 5, "retention": "1y"}]"#, "entry"),
            (r#"[{"match": "^v", "retention": ["1y"]}]"#, "entry"),
            (r#"[{"match": "^v", "retention": "1y", "minimum": true}]"#, "entry"),
            (r#"[{"match": "^v", "retention": "1y", "minimum": -2}]"#, "minimum"),
            (r#"[{"match": "^v", "retention": "1y", "minimum": 1.5}]"#, "minimum"),
            (r#"[{"match": "^v", "retention": "1y", "minimum": "two"}]"#, "minimum"),
            (r#"["^v"]"#, "entry"),
        ];
        for (text, expected_field) in cases {
            let inputs = RuleInputs {
                multiple: serialized(text),
                ..Default::default()
            };
            match parse_rule_set(&inputs).unwrap_err() {
                RetentionError::ConfigInvalidField {
                    location, field, ..
                } => {
                    assert_eq!(location, "multiple[0]", "input {}", text);
                    assert_eq!(field, expected_field, "input {}", text);
                }
                other => panic!("unexpected error for {}: {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_multiple_blank_fields_are_missing() {
        let cases = [
            (r#"[{"match": "", "retention": "1d"}]"#, vec!["match"]),
            (r#"[{"match": "^v", "retention": "  "}]"#, vec!["retention"]),
            (r#"[{"match": " ", "retention": ""}]"#, vec!["match", "retention"]),
        ];
        for (text, expected) in cases {
            let inputs = RuleInputs {
                multiple: serialized(text),
                ..Default::default()
            };
            match parse_rule_set(&inputs).unwrap_err() {
                RetentionError::ConfigMissingFields { location, fields } => {
                    assert_eq!(location, "multiple[0]");
                    assert_eq!(fields, expected, "input {}", text);
                }
                other => panic!("unexpected error for {}: {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_multiple_blank_minimum_is_absent() {
        let inputs = RuleInputs {
            multiple: serialized(r#"[{"match": "^v", "retention": "1y", "minimum": ""}]"#),
            ..Default::default()
        };
        assert_eq!(parse_rule_set(&inputs).unwrap().retention[0].minimum, None);
    }

    #[test]
    fn test_multiple_invalid_pattern() {
        let inputs = RuleInputs {
            multiple: serialized(r#"[{"match": "(", "retention": "1y"}]"#),
            ..Default::default()
        };
        let err = parse_rule_set(&inputs).unwrap_err();
        assert!(matches!(err, RetentionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_multiple_list_yields_no_rules() {
        let inputs = RuleInputs {
            multiple: serialized("[]"),
            ..Default::default()
        };
        assert!(parse_rule_set(&inputs).unwrap().retention.is_empty());
    }

    #[test]
    fn test_exceptions() {
        let inputs = RuleInputs {
            retention: Some("30d".to_string()),
            unless: serialized(r#"[{"match": "^stable$"}, {}]"#),
            ..Default::default()
        };
        let rules = parse_rule_set(&inputs).unwrap();
        assert_eq!(rules.exceptions.len(), 2);
        assert_eq!(rules.exceptions[0].matcher.pattern(), Some("^stable$"));
        assert!(rules.exceptions[1].matcher.matches_everything());
    }

    #[test]
    fn test_exceptions_not_array() {
        let inputs = RuleInputs {
            unless: serialized(r#"{"match": "^stable$"}"#),
            ..Default::default()
        };
        let err = parse_rule_set(&inputs).unwrap_err();
        assert!(matches!(
            err,
            RetentionError::ConfigNotArray { ref input, .. } if input == "unless"
        ));
    }

    #[test]
    fn test_exception_rejects_retention_fields() {
        let inputs = RuleInputs {
            unless: serialized(r#"[{"match": "^stable$", "retention": "1y"}]"#),
            ..Default::default()
        };
        match parse_rule_set(&inputs).unwrap_err() {
            RetentionError::ConfigInvalidField { location, reason, .. } => {
                assert_eq!(location, "unless[0]");
                assert!(reason.contains("retention"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
