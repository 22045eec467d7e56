//! Exception digest collection.
//!
//! Exception rules protect images, not tag names: every digest attached to
//! a tag that matches an exception rule is shielded under every retention
//! rule, including tags with other names that share that digest.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{ExceptionRule, Tag};

/// Set of image digests that must never be deleted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedDigests {
    digests: HashSet<String>,
}

impl ProtectedDigests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, digest: impl Into<String>) -> bool {
        self.digests.insert(digest.into())
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.digests.contains(digest)
    }

    /// A tag is protected when any one of its images is protected
    pub fn protects(&self, tag: &Tag) -> bool {
        tag.digests().any(|digest| self.contains(digest))
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl FromIterator<String> for ProtectedDigests {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ProtectedDigests {
            digests: iter.into_iter().collect(),
        }
    }
}

/// Builds the protected digest set from the full tag inventory.
pub fn collect_protected_digests(tags: &[Tag], exceptions: &[ExceptionRule]) -> ProtectedDigests {
    let mut protected = ProtectedDigests::new();

    for (index, rule) in exceptions.iter().enumerate() {
        let mut matched = 0;
        for tag in tags.iter().filter(|tag| rule.matcher.matches(&tag.name)) {
            matched += 1;
            for digest in tag.digests() {
                protected.insert(digest);
            }
        }
        debug!(rule = index, matcher = %rule.matcher, matched, "Applied exception rule");
    }

    protected
}
