//! Main workflow orchestration logic
//!
//! Runs one retention pass against a registry client, separate from CLI
//! argument parsing so it can be driven programmatically and in tests.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::RuleSet;
use crate::error::Result;
use crate::evaluator::{dedupe_by_name, evaluate};
use crate::exceptions::collect_protected_digests;
use crate::executor::{execute_deletions, DeletionReport};
use crate::registry::RegistryClient;
use crate::warnings::RetentionWarning;

/// Result of a completed retention run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub repository: String,

    /// Number of tags listed by the registry
    pub inventory: usize,

    /// Number of distinct protected image digests
    pub protected_digests: usize,

    /// Tags selected across all rules, before removing repeats
    pub candidates: usize,

    pub report: DeletionReport,

    /// Non-fatal conditions, each already logged when it arose
    pub warnings: Vec<RetentionWarning>,
}

/// Warnings that follow from the rule set alone
pub fn rule_warnings(rules: &RuleSet) -> Vec<RetentionWarning> {
    let never_expires = rules
        .retention
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.retention.is_none())
        .map(|(rule, _)| RetentionWarning::NeverExpires { rule });

    let protects_everything = rules
        .exceptions
        .iter()
        .enumerate()
        .filter(|(_, exception)| exception.matcher.matches_everything())
        .map(|(exception, _)| RetentionWarning::ProtectsEverything { exception });

    never_expires.chain(protects_everything).collect()
}

/// Main retention workflow
///
/// 1. Authenticate, when credentials are configured
/// 2. List the repository's tags once
/// 3. Collect digests protected by exception rules
/// 4. Evaluate each retention rule in order
/// 5. Drop repeated tag names
/// 6. Delete (or report, in a dry run) the selected tags
///
/// # Arguments
///
/// * `client` - Registry client bound to `settings.repository`
/// * `settings` - Validated settings
/// * `now` - Instant retention windows are measured back from
///
/// # Returns
///
/// The run summary, or the first login, listing or evaluation error.
/// Individual delete failures do not fail the run; they appear in
/// [RunSummary::report].
pub async fn run_retention<C>(client: &C, settings: &Settings, now: DateTime<Utc>) -> Result<RunSummary>
where
    C: RegistryClient + ?Sized,
{
    info!(repository = %settings.repository, dry_run = settings.dry_run, "Starting retention run");
    for (index, rule) in settings.rules.retention.iter().enumerate() {
        info!(rule = index, "Retention rule: {}", rule);
    }
    for (index, exception) in settings.rules.exceptions.iter().enumerate() {
        info!(exception = index, "Exception rule: {}", exception);
    }

    let mut warnings = rule_warnings(&settings.rules);
    for warning in &warnings {
        warn!("{}", warning);
    }

    if let Some(credentials) = &settings.credentials {
        client
            .login(&credentials.username, &credentials.password)
            .await?;
        info!(username = %credentials.username, "Logged in");
    }

    let tags = client.list_tags().await?;
    info!(count = tags.len(), "Listed tags");

    let protected = collect_protected_digests(&tags, &settings.rules.exceptions);
    info!(count = protected.len(), "Collected protected digests");

    let candidates = evaluate(&tags, &settings.rules.retention, &protected, now)?;
    let candidate_count = candidates.len();

    let (to_delete, duplicates) = dedupe_by_name(candidates);
    for (tag, occurrences) in duplicates {
        let warning = RetentionWarning::DuplicateCandidate { tag, occurrences };
        warn!("{}", warning);
        warnings.push(warning);
    }
    info!(count = to_delete.len(), "Selected {} tag(s) for deletion", to_delete.len());

    let report = execute_deletions(client, &to_delete, settings.dry_run).await;
    warnings.extend(
        report
            .failed
            .iter()
            .map(|(tag, reason)| RetentionWarning::DeleteFailed {
                tag: tag.clone(),
                reason: reason.clone(),
            }),
    );

    Ok(RunSummary {
        repository: settings.repository.clone(),
        inventory: tags.len(),
        protected_digests: protected.len(),
        candidates: candidate_count,
        report,
        warnings,
    })
}
