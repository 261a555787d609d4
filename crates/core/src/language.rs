//! Page language tags and their DeepL target codes.

/// Language used when a visitor has not picked one.
pub const DEFAULT_PAGE_LANGUAGE: &str = "es";

/// Map a page language tag (e.g. `en-US`, `pt-BR`) to a DeepL `target_lang`.
///
/// Only the languages offered by the translation widget are distinguished;
/// anything else falls back to English.
#[must_use]
pub fn deepl_target(tag: &str) -> &'static str {
    let tag = tag.trim().to_ascii_lowercase();
    if tag.starts_with("en") {
        "EN"
    } else if tag.starts_with("pt") {
        "PT-BR"
    } else if tag.starts_with("fr") {
        "FR"
    } else {
        "EN"
    }
}

/// Whether a string looks like a language tag we can put in `<html lang>`.
///
/// Accepts ASCII letters, digits and `-`, 2 to 35 characters long.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    (2..=35).contains(&tag.len())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
