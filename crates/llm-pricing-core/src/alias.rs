//! Canonical aliases for dated or build-numbered model identifiers.
//!
//! The three-digit rule is purely syntactic: a model whose name legitimately
//! ends in `-NNN` gets an alias too.

use std::sync::LazyLock;

use regex::Regex;

static DATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)-\d{4}(?:-\d{2}-\d{2}|\d{4})$").expect("valid date suffix regex")
});

static BUILD_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-\d{3}$").expect("valid build suffix regex"));

/// `gpt-5-2025-08-07` → `gpt-5`, `gemini-2.0-flash-001` → `gemini-2.0-flash`,
/// anything else → `None`.
pub fn detect_alias(model: &str) -> Option<String> {
    [&*DATE_SUFFIX, &*BUILD_SUFFIX]
        .into_iter()
        .find_map(|re| re.captures(model))
        .and_then(|caps| caps.get(1))
        .map(|stem| stem.as_str().to_string())
}
