use std::fmt;

use crate::domain::pattern::TagMatcher;
use crate::window::RetentionWindow;

/// One retention policy entry
#[derive(Debug, Clone)]
pub struct RetentionRule {
    pub matcher: TagMatcher,
    /// `None` means tags under this rule never expire
    pub retention: Option<RetentionWindow>,
    /// Number of most recently pushed matching tags kept regardless of age
    pub minimum: Option<usize>,
}

impl RetentionRule {
    pub fn new(matcher: TagMatcher, retention: Option<RetentionWindow>, minimum: Option<usize>) -> Self {
        RetentionRule {
            matcher,
            retention,
            minimum,
        }
    }
}

impl fmt::Display for RetentionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match={}", self.matcher)?;
        match &self.retention {
            Some(window) => write!(f, " retention={}", window)?,
            None => write!(f, " retention=never")?,
        }
        if let Some(minimum) = self.minimum {
            write!(f, " minimum={}", minimum)?;
        }
        Ok(())
    }
}

/// A pattern whose matching tags' digests are protected from deletion
#[derive(Debug, Clone)]
pub struct ExceptionRule {
    pub matcher: TagMatcher,
}

impl ExceptionRule {
    pub fn new(matcher: TagMatcher) -> Self {
        ExceptionRule { matcher }
    }
}

impl fmt::Display for ExceptionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unless match={}", self.matcher)
    }
}

/// Ordered retention rules plus ordered exception rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub retention: Vec<RetentionRule>,
    pub exceptions: Vec<ExceptionRule>,
}
