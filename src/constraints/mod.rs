//! Constraint checkers.
//!
//! [`Dispatcher`] is the entry point for every schema node. The array and
//! object checkers call back into it for nested values; the remaining
//! checkers are leaves that only write to the context.

mod collection;
mod dispatcher;
mod enum_check;
mod format;
mod number;
mod object;
mod string;
mod type_check;

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;

use crate::value::Value;

pub(crate) use collection::CollectionChecker;
pub(crate) use dispatcher::Dispatcher;
pub(crate) use enum_check::EnumChecker;
pub use format::FormatChecker;
pub(crate) use number::NumberChecker;
pub(crate) use object::ObjectChecker;
pub(crate) use string::StringChecker;
pub(crate) use type_check::TypeChecker;

/// Compiled `pattern`/`patternProperties` expressions for one validation run
#[derive(Default)]
pub(crate) struct PatternCache {
    compiled: RefCell<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    /// The compiled expression, or `None` when the pattern is invalid
    pub(crate) fn compile(&self, pattern: &str) -> Option<Regex> {
        self.compiled
            .borrow_mut()
            .entry(pattern.to_string())
            .or_insert_with(|| Regex::new(pattern).ok())
            .clone()
    }
}

/// Numeric keyword argument together with the value for messages
pub(crate) fn numeric_keyword<'s>(schema: &'s Value, keyword: &str) -> Option<(f64, &'s Value)> {
    let argument = schema.get(keyword)?;
    argument.as_f64().map(|n| (n, argument))
}
