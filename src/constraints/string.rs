use super::{FormatChecker, PatternCache, numeric_keyword};
use crate::context::ValidationContext;
use crate::value::Value;

/// `minLength`, `maxLength` and `pattern`, then `format`
pub(crate) struct StringChecker<'a> {
    patterns: &'a PatternCache,
}

impl<'a> StringChecker<'a> {
    pub(crate) fn new(patterns: &'a PatternCache) -> Self {
        Self { patterns }
    }

    pub(crate) fn check(&self, text: &str, value: &Value, schema: &Value, context: &mut ValidationContext) {
        // Lengths count characters, not bytes
        let length = text.chars().count() as f64;

        if let Some((minimum, argument)) = numeric_keyword(schema, "minLength")
            && length < minimum
        {
            context.append_error(format!("Must be at least {argument} characters long"));
        }
        if let Some((maximum, argument)) = numeric_keyword(schema, "maxLength")
            && length > maximum
        {
            context.append_error(format!("Must be at most {argument} characters long"));
        }

        if let Some(Value::String(pattern)) = schema.get("pattern") {
            match self.patterns.compile(pattern) {
                Some(regex) if regex.is_match(text) => {}
                Some(_) => {
                    context.append_error(format!("Does not match the regex pattern {pattern}"))
                }
                None => context.append_error(format!("The pattern \"{pattern}\" is invalid")),
            }
        }

        FormatChecker::check(value, schema, context);
    }
}
