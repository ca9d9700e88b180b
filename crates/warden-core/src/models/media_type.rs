use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A `type/subtype` string derived from file content, never from client metadata.
///
/// The empty value is the "unknown" media type; it never matches any category prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_lowercase())
    }

    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this media type starts with any of `prefixes`. Unknown never matches.
    pub fn matches_any_prefix<S: AsRef<str>>(&self, prefixes: &[S]) -> bool {
        !self.is_unknown()
            && prefixes
                .iter()
                .any(|prefix| !prefix.as_ref().is_empty() && self.0.starts_with(prefix.as_ref()))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_case() {
        assert_eq!(MediaType::new(" Image/PNG ").as_str(), "image/png");
    }

    #[test]
    fn test_prefix_match() {
        let mt = MediaType::new("application/vnd.oasis.opendocument.text");
        assert!(mt.matches_any_prefix(&["application/pdf", "application/vnd."][..]));
        assert!(!mt.matches_any_prefix(&["image/"][..]));
    }

    #[test]
    fn test_unknown_never_matches() {
        let mt = MediaType::unknown();
        assert!(mt.is_unknown());
        assert!(!mt.matches_any_prefix(&[""][..]));
        assert!(!mt.matches_any_prefix(&["image/"][..]));
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let mt = MediaType::new("application/x-executable");
        assert!(!mt.matches_any_prefix(&[""][..]));
    }
}
