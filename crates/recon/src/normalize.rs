//! Text cleanup applied to both sides before any comparison.

use std::fmt::Display;

/// Lowercase, turn anything that is not `[a-z0-9]` or whitespace into a
/// space, then collapse runs of whitespace and trim.
///
/// Non-ASCII letters survive lowercasing but are then replaced, so
/// `"Café"` becomes `"caf"`.
pub fn normalize(text: impl AsRef<str>) -> String {
    let lowered = text.as_ref().to_lowercase();
    let mapped: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stringify then normalize. For cells that arrive as numbers or other values.
pub fn normalize_value(value: impl Display) -> String {
    normalize(value.to_string())
}

/// Normalized text with its tokens sorted, ready for order-insensitive comparison.
pub fn sorted_tokens(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
