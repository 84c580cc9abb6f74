use std::collections::HashSet;

use super::{Dispatcher, numeric_keyword};
use crate::context::ValidationContext;
use crate::error::Result;
use crate::value::{Map, Value};

/// Array keywords: `minItems`, `maxItems`, `uniqueItems`, `items`, `additionalItems`
pub(crate) struct CollectionChecker<'d, 'a> {
    dispatcher: &'d Dispatcher<'a>,
}

impl<'d, 'a> CollectionChecker<'d, 'a> {
    pub(crate) fn new(dispatcher: &'d Dispatcher<'a>) -> Self {
        Self { dispatcher }
    }

    pub(crate) fn check(
        &self,
        items: &[Value],
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let count = items.len() as f64;
        if let Some((minimum, argument)) = numeric_keyword(schema, "minItems")
            && count < minimum
        {
            context.append_error(format!(
                "There must be a minimum of {argument} items in the array"
            ));
        }
        if let Some((maximum, argument)) = numeric_keyword(schema, "maxItems")
            && count > maximum
        {
            context.append_error(format!(
                "There must be a maximum of {argument} items in the array"
            ));
        }

        if schema.get("uniqueItems") == Some(&Value::Bool(true)) {
            let distinct: HashSet<String> = items.iter().map(Value::canonical).collect();
            if distinct.len() != items.len() {
                context.append_error("There are no duplicates allowed in the array");
            }
        }

        match schema.get("items") {
            Some(Value::Array(tuple)) => self.check_tuple(items, tuple, schema, context),
            Some(item_schema) => self.check_list(items, item_schema, schema, context),
            None => Ok(()),
        }
    }

    fn check_list(
        &self,
        items: &[Value],
        item_schema: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let fallback = schema
            .get("additionalItems")
            .filter(|additional| **additional != Value::Bool(false));

        for (index, item) in items.iter().enumerate() {
            context.descend(index, |context| -> Result<()> {
                let mut attempt = context.fork();
                self.dispatcher.check(item, item_schema, &mut attempt)?;

                if let Some(fallback) = fallback
                    && !attempt.is_clean()
                {
                    let mut retry = context.fork();
                    self.dispatcher.check(item, fallback, &mut retry)?;
                    if retry.added() < attempt.added() {
                        attempt = retry;
                    }
                }

                context.merge(attempt);
                Ok(())
            })?;
        }
        Ok(())
    }

    fn check_tuple(
        &self,
        items: &[Value],
        tuple: &[Value],
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let empty_schema = Value::Object(Map::new());
        let additional = schema.get("additionalItems");

        for (index, item) in items.iter().enumerate() {
            let item_schema = match (tuple.get(index), additional) {
                (Some(item_schema), _) => item_schema,
                (None, Some(Value::Bool(false))) => {
                    context.append_error(format!(
                        "The item [{index}] is not defined and the definition does not allow additional items"
                    ));
                    continue;
                }
                (None, Some(additional)) => additional,
                (None, None) => &empty_schema,
            };
            context.descend(index, |context| {
                self.dispatcher.check(item, item_schema, context)
            })?;
        }

        // Unused tuple slots may still carry `required`
        if !items.is_empty() {
            for (index, slot_schema) in tuple.iter().enumerate().skip(items.len()) {
                context.descend(index, |context| {
                    self.dispatcher.check(&Value::Missing, slot_schema, context)
                })?;
            }
        }
        Ok(())
    }
}
