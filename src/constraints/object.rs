use std::collections::HashSet;

use super::Dispatcher;
use crate::context::ValidationContext;
use crate::error::Result;
use crate::value::{Map, Value};

static MISSING: Value = Value::Missing;

/// Object keywords: `properties` (with draft-3 `requires`), `patternProperties`
/// and `additionalProperties`
pub(crate) struct ObjectChecker<'d, 'a> {
    dispatcher: &'d Dispatcher<'a>,
}

impl<'d, 'a> ObjectChecker<'d, 'a> {
    pub(crate) fn new(dispatcher: &'d Dispatcher<'a>) -> Self {
        Self { dispatcher }
    }

    pub(crate) fn check(
        &self,
        object: &Map,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let mut covered: HashSet<&str> = HashSet::new();

        if let Some(Value::Object(properties)) = schema.get("properties") {
            for (name, definition) in properties {
                let value = object.get(name).unwrap_or(&MISSING);
                if !value.is_missing() {
                    covered.insert(name.as_str());
                }
                context.descend(name.as_str(), |context| {
                    self.dispatcher.check(value, definition, context)
                })?;

                if let Some(Value::String(required)) = definition.get("requires")
                    && !value.is_missing()
                    && !object.contains_key(required)
                {
                    context.append_error(format!(
                        "The presence of the property {name} requires that {required} also be present"
                    ));
                }
            }
        }

        if let Some(Value::Object(patterns)) = schema.get("patternProperties") {
            for (pattern, definition) in patterns {
                let Some(regex) = self.dispatcher.patterns().compile(pattern) else {
                    context.append_error(format!("The pattern \"{pattern}\" is invalid"));
                    continue;
                };
                for (name, value) in object.iter().filter(|(name, _)| regex.is_match(name)) {
                    covered.insert(name.as_str());
                    context.descend(name.as_str(), |context| {
                        self.dispatcher.check(value, definition, context)
                    })?;
                }
            }
        }

        match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => {
                for name in object.keys().filter(|name| !covered.contains(name.as_str())) {
                    context.append_error(format!(
                        "The property {name} is not defined and the definition does not allow additional properties"
                    ));
                }
            }
            Some(additional @ Value::Object(_)) => {
                for (name, value) in object
                    .iter()
                    .filter(|(name, _)| !covered.contains(name.as_str()))
                {
                    context.descend(name.as_str(), |context| {
                        self.dispatcher.check(value, additional, context)
                    })?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}
