//! Link and image reference handling.

use url::{ParseError, Url};

/// Check that `reference` is a usable link or image target.
///
/// Absolute URIs must parse. Relative references are accepted when they
/// contain no whitespace or control characters and resolve against a base.
pub fn is_valid_reference(reference: &str) -> bool {
    match Url::parse(reference) {
        Ok(_) => true,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let clean = !reference.is_empty()
                && !reference
                    .chars()
                    .any(|ch| ch.is_whitespace() || ch.is_control());
            clean
                && Url::parse("http://localhost/")
                    .is_ok_and(|base| base.join(reference).is_ok())
        }
        Err(_) => false,
    }
}

/// Recognizes links to internal entity pages and rewrites them as mentions.
///
/// A destination starting with `path_prefix` (for example `/user/42?tab=x`)
/// yields the identifier `42` and the target `mention://42`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MentionRule {
    pub path_prefix: String,
    pub scheme: String,
}

/// An entity mention extracted from a link destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mention {
    pub id: String,
    /// Synthetic link target, `{scheme}://{id}`.
    pub uri: String,
}

impl Default for MentionRule {
    fn default() -> Self {
        Self {
            path_prefix: "/user/".to_owned(),
            scheme: "mention".to_owned(),
        }
    }
}

impl MentionRule {
    #[must_use]
    pub fn new(path_prefix: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            scheme: scheme.into(),
        }
    }

    /// Extract the mention carried by `destination`, if any.
    ///
    /// The identifier is the last path segment, ignoring query and fragment.
    /// An empty identifier is not a mention.
    #[must_use]
    pub fn resolve(&self, destination: &str) -> Option<Mention> {
        if self.path_prefix.is_empty() || !destination.starts_with(&self.path_prefix) {
            return None;
        }
        let path = destination
            .split(['?', '#'])
            .next()
            .unwrap_or(destination);
        let id = path.rsplit('/').next().unwrap_or_default();
        if id.is_empty() {
            return None;
        }
        Some(Mention {
            id: id.to_owned(),
            uri: format!("{}://{id}", self.scheme),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_are_valid() {
        assert!(is_valid_reference("https://example.com/image.jpg"));
        assert!(is_valid_reference("mailto:team@example.com"));
    }

    #[test]
    fn test_relative_references_are_valid() {
        assert!(is_valid_reference("/user/42"));
        assert!(is_valid_reference("images/pic.png"));
        assert!(is_valid_reference("#section"));
    }

    #[test]
    fn test_malformed_references_are_invalid() {
        assert!(!is_valid_reference("not a url"));
        assert!(!is_valid_reference("http://exa mple.com"));
        assert!(!is_valid_reference("http://[::1"));
        assert!(!is_valid_reference(""));
    }

    #[test]
    fn test_mention_with_query() {
        let rule = MentionRule::default();
        let mention = rule
            .resolve("/user/664c2f2a9ec522b1fa11c059?profile-tab=profile")
            .unwrap();
        assert_eq!(mention.id, "664c2f2a9ec522b1fa11c059");
        assert_eq!(mention.uri, "mention://664c2f2a9ec522b1fa11c059");
    }

    #[test]
    fn test_mention_ignores_fragment() {
        let mention = MentionRule::default().resolve("/user/7#about").unwrap();
        assert_eq!(mention.id, "7");
    }

    #[test]
    fn test_non_matching_prefix() {
        let rule = MentionRule::default();
        assert_eq!(rule.resolve("https://example.com/user/7"), None);
        assert_eq!(rule.resolve("/users/7"), None);
    }

    #[test]
    fn test_empty_identifier_is_not_a_mention() {
        let rule = MentionRule::default();
        assert_eq!(rule.resolve("/user/"), None);
        assert_eq!(rule.resolve("/user/?tab=1"), None);
    }

    #[test]
    fn test_custom_rule() {
        let rule = MentionRule::new("/team/", "team");
        let mention = rule.resolve("/team/core").unwrap();
        assert_eq!(mention.uri, "team://core");
    }
}
