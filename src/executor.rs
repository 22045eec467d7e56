//! Deletion execution over a [RegistryClient].

use tracing::{info, warn};

use crate::domain::Tag;
use crate::registry::RegistryClient;

/// What happened to the tags handed to [execute_deletions]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub dry_run: bool,
    /// Deleted tags, or the tags that would be deleted in a dry run
    pub deleted: Vec<String>,
    /// Tags whose deletion failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl DeletionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes `tags` one at a time, in order.
///
/// In a dry run nothing is deleted and the report lists what would be.
/// A failed deletion is recorded and the remaining deletions still run.
pub async fn execute_deletions<C>(client: &C, tags: &[&Tag], dry_run: bool) -> DeletionReport
where
    C: RegistryClient + ?Sized,
{
    let mut report = DeletionReport {
        dry_run,
        ..Default::default()
    };

    if dry_run {
        info!(count = tags.len(), "Dry run: {} tag(s) would be deleted", tags.len());
        for tag in tags {
            info!(tag = %tag.name, "Would delete");
            report.deleted.push(tag.name.clone());
        }
        return report;
    }

    info!(count = tags.len(), "Deleting {} tag(s)", tags.len());
    for tag in tags {
        info!(tag = %tag.name, "Deleting");
        match client.delete_tag(&tag.name).await {
            Ok(()) => report.deleted.push(tag.name.clone()),
            Err(e) => {
                warn!(tag = %tag.name, error = %e, "Failed to delete tag");
                report.failed.push((tag.name.clone(), e.to_string()));
            }
        }
    }

    report
}
