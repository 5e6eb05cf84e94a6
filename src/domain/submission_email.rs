use std::fmt;

use crate::domain::validation::validate_email;

// Normalized (trimmed, lower-cased) and shape-checked email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEmail(String);

impl SubmissionEmail {
    pub fn parse(s: String) -> Result<Self, String> {
        let normalized = s.trim().to_lowercase();
        if validate_email(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(format!("'{}' is not a valid email address.", s))
        }
    }
}

impl AsRef<str> for SubmissionEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
