use crate::context::ValidationContext;
use crate::validator::CheckMode;
use crate::value::{Kind, Value};

pub(crate) struct EnumChecker {
    mode: CheckMode,
}

impl EnumChecker {
    pub(crate) fn new(mode: CheckMode) -> Self {
        Self { mode }
    }

    pub(crate) fn check(&self, value: &Value, schema: &Value, context: &mut ValidationContext) {
        if value.is_missing() && schema.get("required") != Some(&Value::Bool(true)) {
            return;
        }
        let Some(candidates) = schema.get("enum") else {
            return;
        };

        let matched = match candidates {
            Value::Array(candidates) => candidates.iter().any(|candidate| self.matches(value, candidate)),
            single => self.matches(value, single),
        };
        if !matched {
            context.append_error(format!(
                "Does not have a value in the enumeration {candidates}"
            ));
        }
    }

    fn matches(&self, value: &Value, candidate: &Value) -> bool {
        if value.kind() == candidate.kind() {
            return value == candidate;
        }
        if self.mode != CheckMode::TypeCast {
            return false;
        }
        match (value, candidate) {
            (Value::String(text), other) | (other, Value::String(text)) => coerces_to(text, other),
            _ => false,
        }
    }
}

/// Whether the string, read as the kind of `other`, equals `other`
fn coerces_to(text: &str, other: &Value) -> bool {
    match other.kind() {
        Kind::Number => Value::from(text)
            .numeric()
            .zip(other.as_f64())
            .is_some_and(|(a, b)| a == b),
        Kind::Boolean => match text {
            "true" => other.as_bool() == Some(true),
            "false" => other.as_bool() == Some(false),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn messages(mode: CheckMode, value: Value, schema: serde_json::Value) -> Vec<String> {
        let mut context = ValidationContext::new();
        EnumChecker::new(mode).check(&value, &Value::from(schema), &mut context);
        context.into_errors().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let schema = json!({"enum": ["a", 1, {"x": [1, 2]}, null]});
        assert!(messages(CheckMode::Normal, Value::from("a"), schema.clone()).is_empty());
        assert!(messages(CheckMode::Normal, Value::from(json!(1.0)), schema.clone()).is_empty());
        assert!(messages(CheckMode::Normal, Value::from(json!({"x": [1, 2]})), schema.clone()).is_empty());
        assert!(messages(CheckMode::Normal, Value::Null, schema).is_empty());
    }

    #[test]
    fn test_no_match_lists_candidates() {
        let schema = json!({"enum": ["a", 1]});
        assert_eq!(
            messages(CheckMode::Normal, Value::from("b"), schema),
            [r#"Does not have a value in the enumeration ["a",1]"#]
        );
    }

    #[test]
    fn test_kinds_must_agree() {
        let schema = json!({"enum": [1, true]});
        assert_eq!(messages(CheckMode::Normal, Value::from("1"), schema.clone()).len(), 1);
        assert_eq!(messages(CheckMode::Normal, Value::from("true"), schema).len(), 1);
    }

    #[test]
    fn test_type_cast_coerces_strings() {
        let schema = json!({"enum": [1, true]});
        assert!(messages(CheckMode::TypeCast, Value::from("1"), schema.clone()).is_empty());
        assert!(messages(CheckMode::TypeCast, Value::from("true"), schema.clone()).is_empty());
        assert_eq!(messages(CheckMode::TypeCast, Value::from("false"), schema).len(), 1);

        let string_candidates = json!({"enum": ["2"]});
        assert!(messages(CheckMode::TypeCast, Value::from(json!(2)), string_candidates).is_empty());
    }

    #[test]
    fn test_missing_values() {
        let schema = json!({"enum": ["a"]});
        assert!(messages(CheckMode::Normal, Value::Missing, schema).is_empty());

        let required = json!({"enum": ["a"], "required": true});
        assert_eq!(messages(CheckMode::Normal, Value::Missing, required).len(), 1);
    }
}
