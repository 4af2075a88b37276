//! Shared utility functions for markdown rendering.

use std::borrow::Cow;

use pulldown_cmark::HeadingLevel;

/// Rewrite literal `\n` escape sequences (backslash followed by `n`) to newlines.
///
/// Text stored in JSON or database columns often arrives with newlines escaped.
/// The substitution is plain and runs once, before parsing.
///
/// # Examples
///
/// ```
/// use mdrun_renderer::unescape_newlines;
///
/// assert_eq!(unescape_newlines(r"First line\nSecond line"), "First line\nSecond line");
/// assert_eq!(unescape_newlines("no escapes"), "no escapes");
/// ```
pub fn unescape_newlines(input: &str) -> Cow<'_, str> {
    if input.contains("\\n") {
        Cow::Owned(input.replace("\\n", "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_borrows_when_clean() {
        assert!(matches!(unescape_newlines("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_multiple_sequences() {
        assert_eq!(unescape_newlines(r"a\nb\n\nc"), "a\nb\n\nc");
    }

    #[test]
    fn test_unescape_keeps_other_escapes() {
        assert_eq!(unescape_newlines(r"tab\there"), r"tab\there");
    }

    #[test]
    fn test_unescape_keeps_real_newlines() {
        assert_eq!(unescape_newlines("a\nb"), "a\nb");
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }
}
