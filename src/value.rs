//! Generic value tree shared by instances and schemas.
//!
//! Instances and schemas both arrive as decoded JSON and are converted into
//! [`Value`], which adds the [`Value::Missing`] sentinel used by the container
//! checkers to describe a property or tuple slot that the instance lacks.

use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Number;

/// Ordered object map, keys kept in document order
pub type Map = IndexMap<String, Value>;

static NUMERIC_STRING_REGEX: OnceLock<Regex> = OnceLock::new();

fn numeric_string_regex() -> &'static Regex {
    NUMERIC_STRING_REGEX.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$")
            .expect("Failed to compile numeric string regex")
    })
}

/// A node of an instance or schema tree
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    /// The property or slot does not exist in the instance
    Missing,
}

/// Runtime kind of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Missing,
}

impl Kind {
    /// Name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Missing => "undefined",
        }
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Missing => Kind::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Look up a key on an object; `None` for every other kind
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Whether an object carries the key (an explicit `null` counts as present)
    pub fn has_property(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The value of a JSON number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Numeric reading of the value: numbers, and strings that look like numbers
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if numeric_string_regex().is_match(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Decimal text of a numeric value, as written in the document
    pub fn numeric_text(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if numeric_string_regex().is_match(s) => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// A number with zero fractional part
    pub fn is_integer(&self) -> bool {
        match self {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
            }
            _ => false,
        }
    }

    /// Resolve a JSON pointer (`/definitions/a`) against this value
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return Some(self);
        }
        if !pointer.starts_with('/') {
            return None;
        }
        pointer
            .split('/')
            .skip(1)
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .try_fold(self, |target, token| match target {
                Value::Object(map) => map.get(&token),
                Value::Array(items) => parse_index(&token).and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Convert back into a `serde_json::Value`; `Missing` becomes `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Missing => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Deterministic string form used to compare values for equality.
    ///
    /// Object keys are sorted, so two objects holding the same members in a
    /// different order share a canonical form. Numbers are compared by value,
    /// `1` and `1.0` share a canonical form.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Missing => out.push_str("missing"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => {
                out.push_str("n:");
                out.push_str(&canonical_number(n));
            }
            Value::String(s) => {
                out.push_str("s:");
                out.push_str(&serde_json::Value::String(s.clone()).to_string());
            }
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                out.push('{');
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&serde_json::Value::String(key.clone()).to_string());
                    out.push(':');
                    map[key].write_canonical(out);
                }
                out.push('}');
            }
        }
    }
}

fn parse_index(token: &str) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Numeric equality across integer and float representations
pub(crate) fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v == w))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("undefined"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Value::from(value.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversion_preserves_document_order() {
        let value = Value::from(json!({"b": 1, "a": 2, "c": 3}));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(Value::from("12").numeric(), Some(12.0));
        assert_eq!(Value::from(" 1.5e2").numeric(), Some(150.0));
        assert_eq!(Value::from(".5").numeric(), Some(0.5));
        assert_eq!(Value::from("abc").numeric(), None);
        assert_eq!(Value::from("0x1A").numeric(), None);
        assert_eq!(Value::from("").numeric(), None);
        assert_eq!(Value::Bool(true).numeric(), None);
    }

    #[test]
    fn test_integer_detection() {
        assert!(Value::from(json!(3)).is_integer());
        assert!(Value::from(json!(3.0)).is_integer());
        assert!(!Value::from(json!(3.5)).is_integer());
        assert!(!Value::from("3").is_integer());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::from(json!({"a": 1, "b": [1, 2]})), Value::from(json!({"b": [1, 2], "a": 1})));
        assert_eq!(Value::from(json!(1)), Value::from(json!(1.0)));
        assert_ne!(Value::from(json!([1, 2])), Value::from(json!([2, 1])));
        assert_ne!(Value::Null, Value::Missing);
    }

    #[test]
    fn test_canonical_form_ignores_key_order() {
        let a = Value::from(json!({"x": 1, "y": {"p": true, "q": null}}));
        let b = Value::from(json!({"y": {"q": null, "p": true}, "x": 1.0}));
        assert_eq!(a.canonical(), b.canonical());
        assert_ne!(Value::from("1").canonical(), Value::from(json!(1)).canonical());
    }

    #[test]
    fn test_pointer() {
        let doc = Value::from(json!({"definitions": {"a/b": {"type": "string"}}, "list": [10, 20]}));
        assert_eq!(doc.pointer("/definitions/a~1b/type"), Some(&Value::from("string")));
        assert_eq!(doc.pointer("/list/1"), Some(&Value::from(json!(20))));
        assert_eq!(doc.pointer("/list/01"), None);
        assert_eq!(doc.pointer(""), Some(&doc));
        assert!(doc.pointer("definitions").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
        assert_eq!(Value::Missing.to_string(), "undefined");
    }
}
