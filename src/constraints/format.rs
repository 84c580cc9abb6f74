//! `format` keyword predicates.
//!
//! Unknown format names are accepted so that consumers can layer their own
//! formats on top. The `phone` and `hostname` checks are deliberately loose
//! (North-American phone layout, dot-separated letter segments).

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use url::Url;

use crate::context::ValidationContext;
use crate::value::Value;

static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_TIME_REGEX: OnceLock<Regex> = OnceLock::new();
static MILLISEC_REGEX: OnceLock<Regex> = OnceLock::new();
static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
static STYLE_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static HOSTNAME_REGEX: OnceLock<Regex> = OnceLock::new();

const NAMED_COLORS: &[&str] = &[
    "aqua", "black", "blue", "fuchsia", "gray", "green", "lime", "maroon", "navy", "olive",
    "orange", "purple", "red", "silver", "teal", "white", "yellow",
];

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Failed to compile format regex"))
}

/// Checks string and numeric values against the schema's `format`
pub struct FormatChecker;

impl FormatChecker {
    /// Append an error when `value` violates `schema.format`
    pub fn check(value: &Value, schema: &Value, context: &mut ValidationContext) {
        if let Some(Value::String(format)) = schema.get("format")
            && let Some(message) = Self::violation(format, value)
        {
            context.append_error(message);
        }
    }

    /// The error message for `value` under `format`, or `None` when it conforms.
    ///
    /// Only strings and numbers are inspected; numbers are checked through
    /// their decimal text.
    pub fn violation(format: &str, value: &Value) -> Option<String> {
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return None,
        };

        let valid = match format {
            "date" => is_date(&text),
            "time" => is_time(&text),
            "date-time" => is_date_time(&text),
            "utc-millisec" => cached(&MILLISEC_REGEX, r"^-?\d+$").is_match(&text),
            "regex" => Regex::new(&text).is_ok(),
            "color" => is_color(&text),
            "style" => is_style(&text),
            "phone" => cached(&PHONE_REGEX, r"^\+?(\(\d{3}\)|\d{3}) \d{3} \d{4}$").is_match(&text),
            "uri" => is_uri(&text),
            "email" => is_email(&text),
            "ip-address" | "ipv4" => text.parse::<Ipv4Addr>().is_ok(),
            "ipv6" => text.parse::<Ipv6Addr>().is_ok(),
            "host-name" | "hostname" => {
                cached(&HOSTNAME_REGEX, r"(?i)^[_a-z]+\.([_a-z]+\.?)+$").is_match(&text)
            }
            _ => true,
        };
        if valid {
            return None;
        }

        Some(match format {
            "date" => format!("Invalid date {value}, expected format YYYY-MM-DD"),
            "time" => format!("Invalid time {value}, expected format hh:mm:ss"),
            "date-time" => format!(
                "Invalid date-time {value}, expected format YYYY-MM-DDThh:mm:ssZ or YYYY-MM-DDThh:mm:ss+hh:mm"
            ),
            "utc-millisec" => {
                format!("Invalid time {value}, expected integer of milliseconds since Epoch")
            }
            "regex" => format!("Invalid regex format {text}"),
            "color" => "Invalid color".to_string(),
            "style" => "Invalid style".to_string(),
            "phone" => "Invalid phone number".to_string(),
            "uri" => "Invalid URL format".to_string(),
            "email" => "Invalid email".to_string(),
            "host-name" | "hostname" => "Invalid hostname".to_string(),
            _ => "Invalid IP address".to_string(),
        })
    }
}

fn is_date(text: &str) -> bool {
    cached(&DATE_REGEX, r"^\d{4}-\d{2}-\d{2}$").is_match(text)
        && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

fn is_time(text: &str) -> bool {
    cached(&TIME_REGEX, r"^\d{2}:\d{2}:\d{2}$").is_match(text)
        && NaiveTime::parse_from_str(text, "%H:%M:%S").is_ok()
}

/// `Z`, fractional `Z`, `+hh:mm` and `+hhmm` forms
fn is_date_time(text: &str) -> bool {
    if !cached(
        &DATE_TIME_REGEX,
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})$",
    )
    .is_match(text)
    {
        return false;
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%SZ").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.fZ").is_ok()
        || DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%:z").is_ok()
        || DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z").is_ok()
}

fn is_color(text: &str) -> bool {
    NAMED_COLORS.contains(&text.to_lowercase().as_str())
        || cached(&COLOR_REGEX, r"(?i)^#([a-f0-9]{3}|[a-f0-9]{6})$").is_match(text)
}

fn is_style(text: &str) -> bool {
    let declaration = cached(&STYLE_REGEX, r"(?i)^\s*[-a-z]+\s*:\s*.+$");
    text.trim_end_matches(';')
        .split(';')
        .all(|segment| declaration.is_match(segment))
}

/// Absolute URL with a host; `mailto:`, `news:` and `file:` may omit it
fn is_uri(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| {
        url.has_host() || matches!(url.scheme(), "mailto" | "news" | "file")
    })
}

fn is_email(text: &str) -> bool {
    cached(
        &EMAIL_REGEX,
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .is_match(text)
}
