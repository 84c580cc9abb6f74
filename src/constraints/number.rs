use super::{FormatChecker, numeric_keyword};
use crate::context::ValidationContext;
use crate::value::Value;

const REMAINDER_EPSILON: f64 = 1e-10;

/// Numeric keywords; also applied to strings that look like numbers
pub(crate) struct NumberChecker;

impl NumberChecker {
    pub(crate) fn check(value: &Value, schema: &Value, context: &mut ValidationContext) {
        let Some(number) = value.numeric() else {
            return;
        };

        Self::check_bound(number, schema, context, Bound::Minimum);
        Self::check_bound(number, schema, context, Bound::Maximum);

        if let Some((divisor, argument)) = numeric_keyword(schema, "divisibleBy")
            && !is_multiple(value, number, divisor, argument)
        {
            context.append_error(format!("Is not divisible by {argument}"));
        }
        if let Some((divisor, argument)) = numeric_keyword(schema, "multipleOf")
            && !is_multiple(value, number, divisor, argument)
        {
            context.append_error(format!("Must be a multiple of {argument}"));
        }

        FormatChecker::check(value, schema, context);
    }

    fn check_bound(number: f64, schema: &Value, context: &mut ValidationContext, bound: Bound) {
        let (keyword, flag, adjective, relation) = match bound {
            Bound::Minimum => ("minimum", "exclusiveMinimum", "minimum", "greater"),
            Bound::Maximum => ("maximum", "exclusiveMaximum", "maximum", "less"),
        };
        let exclusive = schema.get(flag) == Some(&Value::Bool(true));

        let Some((limit, argument)) = numeric_keyword(schema, keyword) else {
            if exclusive {
                context.append_error(format!("Use of {flag} requires presence of {keyword}"));
            }
            return;
        };

        if exclusive && number == limit {
            context.append_error(format!(
                "Must have a {adjective} value {relation} than boundary value of {argument}"
            ));
            return;
        }

        let violated = match bound {
            Bound::Minimum => number < limit,
            Bound::Maximum => number > limit,
        };
        if violated {
            context.append_error(format!("Must have a {adjective} value of {argument}"));
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Minimum,
    Maximum,
}

/// Floating remainder test tolerant of binary rounding noise
fn is_multiple(value: &Value, number: f64, divisor: f64, argument: &Value) -> bool {
    if divisor == 0.0 {
        return false;
    }
    let remainder = number % divisor;
    if remainder == 0.0 || (remainder.abs() - divisor.abs()).abs() < REMAINDER_EPSILON {
        return true;
    }

    let places = decimal_places(value).max(decimal_places(argument)).min(300);
    let scale = 10f64.powi(places as i32);
    (remainder * scale).round() / scale == 0.0
}

/// Digits after the decimal point in the written form, exponent included
fn decimal_places(value: &Value) -> u32 {
    let Some(text) = value.numeric_text() else {
        return 0;
    };
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], text[at + 1..].parse::<i64>().unwrap_or(0)),
        None => (text.as_str(), 0),
    };
    let fraction = mantissa
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len() as i64);
    (fraction - exponent).max(0) as u32
}
