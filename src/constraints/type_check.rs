use crate::context::ValidationContext;
use crate::validator::CheckMode;
use crate::value::Value;

/// Resolves `type` (a name or a draft-3 union array) against a value
pub(crate) struct TypeChecker {
    mode: CheckMode,
}

impl TypeChecker {
    pub(crate) fn new(mode: CheckMode) -> Self {
        Self { mode }
    }

    pub(crate) fn check(&self, value: &Value, schema: &Value, context: &mut ValidationContext) {
        if let Some(declared) = schema.get("type") {
            self.check_type(value, declared, context);
        }
    }

    /// Check `value` against a declared type, as found under `type` or `disallow`
    pub(crate) fn check_type(&self, value: &Value, declared: &Value, context: &mut ValidationContext) {
        let names: Vec<&str> = match declared {
            Value::String(name) => vec![name.as_str()],
            // Schema objects inside a union never match
            Value::Array(union) => union.iter().filter_map(Value::as_str).collect(),
            _ => return,
        };

        if names.iter().any(|name| self.is_of_type(value, name)) {
            return;
        }

        let expected = names
            .iter()
            .map(|name| with_article(name))
            .collect::<Vec<_>>()
            .join(" or ");
        context.append_error(format!(
            "{} value found, but {} is required",
            found_name(value),
            if expected.is_empty() { "a valid type".to_string() } else { expected }
        ));
    }

    fn is_of_type(&self, value: &Value, name: &str) -> bool {
        let cast = self.mode == CheckMode::TypeCast;
        match name {
            "any" => true,
            "null" => matches!(value, Value::Null),
            "object" => matches!(value, Value::Object(_)),
            "array" => matches!(value, Value::Array(_)),
            "string" => matches!(value, Value::String(_)),
            "number" => match value {
                Value::Number(_) => true,
                Value::String(_) => cast && value.numeric().is_some(),
                _ => false,
            },
            "integer" => match value {
                Value::Number(_) => value.is_integer(),
                Value::String(_) => cast && value.numeric().is_some_and(|n| n.fract() == 0.0),
                _ => false,
            },
            "boolean" => match value {
                Value::Bool(_) => true,
                Value::String(text) => cast && matches!(text.as_str(), "true" | "false"),
                _ => false,
            },
            _ => false,
        }
    }
}

fn found_name(value: &Value) -> &'static str {
    if value.is_integer() {
        "integer"
    } else {
        value.kind().name()
    }
}

fn with_article(name: &str) -> String {
    match name.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {name}"),
        _ => format!("a {name}"),
    }
}
