use tracing::{debug, trace};

use super::{
    CollectionChecker, EnumChecker, NumberChecker, ObjectChecker, PatternCache, StringChecker,
    TypeChecker, numeric_keyword,
};
use crate::context::{SchemaKey, ValidationContext};
use crate::error::{Result, UnresolvableReference};
use crate::resolver::{SchemaResolver, join_uri};
use crate::validator::ValidationOptions;
use crate::value::Value;

/// Evaluates one schema node against one value.
///
/// Keywords run in a fixed order: `$ref`, `extends`, `required`, `type`,
/// `disallow`, `not`, property counts, `dependencies`, the `allOf`/`anyOf`/
/// `oneOf` combinators, and finally the checkers selected by the runtime kind
/// of the value. Kind selection is not exclusive: a numeric string is checked
/// both as a string and as a number.
pub(crate) struct Dispatcher<'a> {
    options: &'a ValidationOptions,
    resolver: &'a dyn SchemaResolver,
    patterns: &'a PatternCache,
    /// Document that local `#` references point into
    document: &'a Value,
    base_uri: Option<&'a str>,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(
        options: &'a ValidationOptions,
        resolver: &'a dyn SchemaResolver,
        patterns: &'a PatternCache,
        document: &'a Value,
        base_uri: Option<&'a str>,
    ) -> Self {
        Self {
            options,
            resolver,
            patterns,
            document,
            base_uri,
        }
    }

    pub(crate) fn patterns(&self) -> &'a PatternCache {
        self.patterns
    }

    pub(crate) fn check(
        &self,
        value: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        self.enter(SchemaKey::node(schema), value, context)?;
        let outcome = self.check_node(value, schema, context);
        context.leave();
        outcome
    }

    fn enter(&self, key: SchemaKey, value: &Value, context: &mut ValidationContext) -> Result<()> {
        context.enter(key, value, self.options.max_depth).inspect_err(|_| {
            debug!(path = context.path(), "recursion limit reached");
        })
    }

    fn check_node(
        &self,
        value: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        trace!(path = context.path(), kind = value.kind().name(), "checking schema node");

        if let Some(Value::String(reference)) = schema.get("$ref") {
            return self.follow_reference(reference, value, context);
        }

        self.check_extends(value, schema, context)?;
        Self::check_required(value, schema, context);

        let types = TypeChecker::new(self.options.check_mode);
        if !value.is_missing() {
            types.check(value, schema, context);
        }

        // Absent properties are checked too: `not: {}` or `disallow: "any"` reject them
        if let Some(disallowed) = schema.get("disallow") {
            let mut fork = context.fork();
            types.check_type(value, disallowed, &mut fork);
            if fork.is_clean() {
                context.append_error("Disallowed value was matched");
            }
        }

        if let Some(forbidden) = schema.get("not") {
            let mut fork = context.fork();
            self.check(value, forbidden, &mut fork)?;
            if fork.is_clean() {
                context.append_error("Matched a schema which it should not");
            }
        }

        Self::check_property_counts(value, schema, context);
        self.check_dependencies(value, schema, context)?;

        if !value.is_missing() {
            self.check_combinators(value, schema, context)?;
        }

        self.check_kinds(value, schema, context)
    }

    fn check_extends(
        &self,
        value: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        match schema.get("extends") {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Array(parents)) => {
                for parent in parents {
                    self.check_parent(value, parent, context)?;
                }
                Ok(())
            }
            Some(parent) => self.check_parent(value, parent, context),
        }
    }

    fn check_parent(
        &self,
        value: &Value,
        parent: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        match parent {
            Value::String(uri) => self.follow_reference(uri, value, context),
            schema => self.check(value, schema, context),
        }
    }

    /// Validate against the schema a `$ref`/`extends` URI points at.
    ///
    /// Local references (`#/definitions/x`) are looked up in the current
    /// document. Anything else goes through the resolver, and the resolved
    /// document becomes the target of local references below it.
    fn follow_reference(
        &self,
        reference: &str,
        value: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let (location, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let uri = if location.is_empty() {
            None
        } else {
            Some(join_uri(self.base_uri, location))
        };

        let Some(uri) = uri.filter(|uri| Some(uri.as_str()) != self.base_uri) else {
            return match self.document.pointer(fragment) {
                Some(target) => self.check(value, target, context),
                None => {
                    Self::unresolvable(reference, "pointer does not exist in the document", context);
                    Ok(())
                }
            };
        };

        let document = match self.resolver.resolve(&uri) {
            Ok(document) => document,
            Err(err) => {
                debug!(uri = %uri, "schema reference could not be resolved");
                context.append_error(err.to_string());
                return Ok(());
            }
        };

        let nested = Dispatcher::new(
            self.options,
            self.resolver,
            self.patterns,
            document.as_ref(),
            Some(&uri),
        );
        let Some(target) = document.pointer(fragment) else {
            Self::unresolvable(reference, "pointer does not exist in the document", context);
            return Ok(());
        };

        self.enter(SchemaKey::Reference(format!("{uri}#{fragment}")), value, context)?;
        let outcome = nested.check(value, target, context);
        context.leave();
        outcome
    }

    fn unresolvable(reference: &str, reason: &str, context: &mut ValidationContext) {
        debug!(reference, reason, "schema reference could not be resolved");
        context.append_error(UnresolvableReference::new(reference, reason).to_string());
    }

    fn check_required(value: &Value, schema: &Value, context: &mut ValidationContext) {
        match schema.get("required") {
            // Draft 4: list of property names on the object schema
            Some(Value::Array(names)) => {
                if let Value::Object(object) = value {
                    for name in names.iter().filter_map(Value::as_str) {
                        if !object.contains_key(name) {
                            context.append_error(format!("The property {name} is required"));
                        }
                    }
                }
            }
            // Draft 3: flag on the property schema itself
            Some(Value::Bool(true)) if value.is_missing() => {
                context.append_error("Is missing and it is required");
            }
            _ => {}
        }
    }

    fn check_property_counts(value: &Value, schema: &Value, context: &mut ValidationContext) {
        let Value::Object(object) = value else {
            return;
        };
        let count = object.len() as f64;

        if let Some((minimum, argument)) = numeric_keyword(schema, "minProperties")
            && count < minimum
        {
            context.append_error(format!("Must contain a minimum of {argument} properties"));
        }
        if let Some((maximum, argument)) = numeric_keyword(schema, "maxProperties")
            && count > maximum
        {
            context.append_error(format!("Must contain no more than {argument} properties"));
        }
    }

    fn check_dependencies(
        &self,
        value: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        let (Value::Object(object), Some(Value::Object(dependencies))) =
            (value, schema.get("dependencies"))
        else {
            return Ok(());
        };

        for (key, dependency) in dependencies {
            if !object.contains_key(key) {
                continue;
            }
            match dependency {
                Value::String(name) => {
                    if !object.contains_key(name) {
                        context.append_error(format!("{key} depends on {name} and {name} is missing"));
                    }
                }
                Value::Array(names) => {
                    for name in names.iter().filter_map(Value::as_str) {
                        if !object.contains_key(name) {
                            context.append_error(format!(
                                "{key} depends on {name} and {name} is missing"
                            ));
                        }
                    }
                }
                Value::Object(_) => self.check(value, dependency, context)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn check_combinators(
        &self,
        value: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        if let Some(Value::Array(schemas)) = schema.get("allOf") {
            let mut matched_all = true;
            for subschema in schemas {
                let before = context.len();
                self.check(value, subschema, context)?;
                matched_all &= context.len() == before;
            }
            if !matched_all {
                context.append_error("Failed to match all schemas");
            }
        }

        if let Some(Value::Array(schemas)) = schema.get("anyOf") {
            let mut matched = false;
            for subschema in schemas {
                let mut fork = context.fork();
                self.check(value, subschema, &mut fork)?;
                if fork.is_clean() {
                    matched = true;
                    break;
                }
            }
            if !matched {
                context.append_error("Failed to match at least one schema");
            }
        }

        if let Some(Value::Array(schemas)) = schema.get("oneOf") {
            let mut cumulating = context.fork();
            let mut matches = 0;
            for subschema in schemas {
                let mut fork = context.fork();
                self.check(value, subschema, &mut fork)?;
                if fork.is_clean() {
                    matches += 1;
                } else {
                    cumulating.merge(fork);
                }
            }
            if matches != 1 {
                context.merge(cumulating);
                context.append_error("Failed to match exactly one schema");
            }
        }

        Ok(())
    }

    fn check_kinds(
        &self,
        value: &Value,
        schema: &Value,
        context: &mut ValidationContext,
    ) -> Result<()> {
        match value {
            Value::Array(items) => CollectionChecker::new(self).check(items, schema, context)?,
            Value::Object(object) => {
                if schema.has_property("properties") || schema.has_property("patternProperties") {
                    ObjectChecker::new(self).check(object, schema, context)?;
                }
            }
            Value::String(text) => {
                StringChecker::new(self.patterns).check(text, value, schema, context)
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Missing => {}
        }

        // Numeric strings land here as well as in the string checker
        if value.numeric().is_some() {
            NumberChecker::check(value, schema, context);
        }

        if schema.has_property("enum") {
            EnumChecker::new(self.options.check_mode).check(value, schema, context);
        }

        Ok(())
    }
}
