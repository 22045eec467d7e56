use std::fmt;

/// Non-fatal conditions found while evaluating or executing a retention run.
/// These are reported to the user but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RetentionWarning {
    /// An exception rule without a pattern protects every image
    ProtectsEverything { exception: usize },
    /// A retention rule without a window never expires anything
    NeverExpires { rule: usize },
    /// A tag was selected by more than one rule
    DuplicateCandidate { tag: String, occurrences: usize },
    /// The registry refused to delete a tag
    DeleteFailed { tag: String, reason: String },
}

impl fmt::Display for RetentionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionWarning::ProtectsEverything { exception } => write!(
                f,
                "Exception rule {} has no match pattern and protects every tag",
                exception
            ),
            RetentionWarning::NeverExpires { rule } => write!(
                f,
                "Retention rule {} has no retention window; no tag under it will expire",
                rule
            ),
            RetentionWarning::DuplicateCandidate { tag, occurrences } => write!(
                f,
                "Tag '{}' was selected by {} rules and will be deleted once",
                tag, occurrences
            ),
            RetentionWarning::DeleteFailed { tag, reason } => {
                write!(f, "Could not delete tag '{}': {}", tag, reason)
            }
        }
    }
}
