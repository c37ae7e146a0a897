//! Client-side email shape check.
//!
//! # Responsibility
//! - Decide whether a candidate string looks like `local@domain.tld`.
//!
//! # Invariants
//! - The whole candidate must match; partial matches are rejected.
//! - Never panics and never allocates per call.
//! - Shape only: deliverability is not checked.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$")
        .expect("valid email regex")
});

/// Returns whether `candidate` has an acceptable email shape.
///
/// Empty and whitespace-only input is rejected before matching. Surrounding
/// whitespace is not stripped, so `" a@b.io"` does not match.
pub fn is_valid(candidate: &str) -> bool {
    if candidate.trim().is_empty() {
        return false;
    }
    EMAIL_RE.is_match(candidate)
}

/// Same as [`is_valid`], treating a missing value as invalid.
pub fn is_valid_opt(candidate: Option<&str>) -> bool {
    candidate.is_some_and(is_valid)
}
