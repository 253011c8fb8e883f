//! Notation validation — rejects empty input and markup that must never
//! reach the renderer (scripts, embedded frames, inline event handlers).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static UNSAFE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<\s*script\b",
        r"(?i)<\s*iframe\b",
        r"(?i)<\s*object\b",
        r"(?i)<\s*embed\b",
        r"(?i)javascript\s*:",
        r"(?i)\bon[a-z]+\s*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("unsafe-content pattern must compile"))
    .collect()
});

/// Check that `notation` is non-empty and free of unsafe content.
///
/// Whitespace-only input counts as empty.
pub fn validate_notation(notation: &str) -> Result<(), ValidationError> {
    if notation.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    if UNSAFE_PATTERNS.iter().any(|re| re.is_match(notation)) {
        return Err(ValidationError::UnsafeContent);
    }
    Ok(())
}
