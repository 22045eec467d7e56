use std::fmt;

use regex::Regex;

use crate::error::{RetentionError, Result};

/// Predicate over tag names.
///
/// Patterns are regular expressions searched anywhere in the name and
/// matched case-sensitively; anchor with `^`/`$` to match a whole name.
/// An absent or empty pattern matches every tag.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    regex: Option<Regex>,
}

impl TagMatcher {
    /// A matcher that accepts every tag name
    pub fn any() -> Self {
        TagMatcher { regex: None }
    }

    /// Compile `pattern` into a matcher
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::any());
        }

        let regex = Regex::new(pattern).map_err(|source| RetentionError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(TagMatcher { regex: Some(regex) })
    }

    /// Compile an optional pattern, treating `None` as "match everything"
    pub fn from_optional(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            Some(pattern) => Self::new(pattern),
            None => Ok(Self::any()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(name))
    }

    pub fn matches_everything(&self) -> bool {
        self.regex.is_none()
    }

    /// The source pattern, if any
    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(|re| re.as_str())
    }
}

impl fmt::Display for TagMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern() {
            Some(pattern) => write!(f, "/{}/", pattern),
            None => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_matches_everything() {
        let matcher = TagMatcher::any();
        assert!(matcher.matches("latest"));
        assert!(matcher.matches(""));
        assert!(matcher.matches_everything());
    }

    #[test]
    fn test_empty_pattern_is_any() {
        assert!(TagMatcher::new("").unwrap().matches_everything());
        assert!(TagMatcher::from_optional(None).unwrap().matches_everything());
    }

    #[test]
    fn test_unanchored_search() {
        let matcher = TagMatcher::new("rc").unwrap();
        assert!(matcher.matches("v1.0.0-rc1"));
        assert!(!matcher.matches("v1.0.0"));
    }

    #[test]
    fn test_anchored_pattern() {
        let matcher = TagMatcher::new("^v").unwrap();
        assert!(matcher.matches("v1"));
        assert!(!matcher.matches("dev-v1"));
    }

    #[test]
    fn test_case_sensitive() {
        let matcher = TagMatcher::new("^v").unwrap();
        assert!(!matcher.matches("V1"));
        assert!(TagMatcher::new("(?i)^v").unwrap().matches("V1"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = TagMatcher::new("(unclosed").unwrap_err();
        assert!(matches!(err, RetentionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_display() {
        assert_eq!(TagMatcher::new("^v").unwrap().to_string(), "/^v/");
        assert_eq!(TagMatcher::any().to_string(), "*");
    }
}
