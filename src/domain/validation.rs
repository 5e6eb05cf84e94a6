use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

// local@domain.tld, nothing more.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Email pattern is a valid regex")
});

/// Check that `s` has the shape `local@domain.tld`.
/// This rejects obviously malformed input; it is not RFC 5322 complete.
pub fn validate_email(s: &str) -> bool {
    EMAIL_SHAPE.is_match(s)
}

/// Trim a raw form field.
/// # Arguments
/// * `value` - The raw JSON value, if the field was present at all.
/// # Returns
/// The trimmed string, or an empty string for missing and non-string input.
pub fn sanitize(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Like [`sanitize`], additionally lower-casing the result.
pub fn sanitize_email(value: Option<&Value>) -> String {
    sanitize(value).to_lowercase()
}
