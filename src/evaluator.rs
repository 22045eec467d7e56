//! Retention evaluation.
//!
//! Each rule is evaluated independently against the full inventory:
//!
//! 1. resolve the rule's cutoff relative to `now`
//! 2. keep tags whose name matches the rule
//! 3. drop tags with any protected image digest
//! 4. sort by last push, most recent first (stable, so inventory order
//!    breaks ties)
//! 5. set aside the `minimum` most recent tags
//! 6. select the rest whose last push and last pull are both before the cutoff
//!
//! Rules only interact through the shared protected digest set.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{RetentionRule, Tag};
use crate::error::Result;
use crate::exceptions::ProtectedDigests;

/// Outcome of evaluating one retention rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation<'a> {
    /// Position of the rule in the rule set
    pub rule: usize,
    /// `None` when the rule has no retention window
    pub cutoff: Option<DateTime<Utc>>,
    /// Tags whose name matched the rule
    pub matched: usize,
    /// Matching tags shielded by an exception digest
    pub protected: usize,
    /// Tags retained by the minimum-keep count, most recent first
    pub kept_by_minimum: Vec<&'a Tag>,
    /// Tags selected for deletion, most recent first
    pub expired: Vec<&'a Tag>,
}

/// Evaluates a single rule against the inventory.
pub fn evaluate_rule<'a>(
    index: usize,
    tags: &'a [Tag],
    rule: &RetentionRule,
    protected: &ProtectedDigests,
    now: DateTime<Utc>,
) -> Result<RuleEvaluation<'a>> {
    let cutoff = rule
        .retention
        .as_ref()
        .map(|window| window.cutoff_from(now))
        .transpose()?;

    let matching: Vec<&Tag> = tags
        .iter()
        .filter(|tag| rule.matcher.matches(&tag.name))
        .collect();
    let matched = matching.len();

    let mut candidates: Vec<&Tag> = matching
        .into_iter()
        .filter(|tag| !protected.protects(tag))
        .collect();
    let protected_count = matched - candidates.len();

    // sort_by is stable
    candidates.sort_by(|a, b| b.last_pushed.cmp(&a.last_pushed));

    let keep = rule.minimum.unwrap_or(0).min(candidates.len());
    let remaining = candidates.split_off(keep);
    let kept_by_minimum = candidates;

    let expired = match cutoff {
        Some(cutoff) => remaining
            .into_iter()
            .filter(|tag| tag.is_idle_since(cutoff))
            .collect(),
        None => Vec::new(),
    };

    Ok(RuleEvaluation {
        rule: index,
        cutoff,
        matched,
        protected: protected_count,
        kept_by_minimum,
        expired,
    })
}

/// Evaluates every rule in order and concatenates the tags each selects.
///
/// A tag selected by several rules appears once per rule; see
/// [`dedupe_by_name`].
pub fn evaluate<'a>(
    tags: &'a [Tag],
    rules: &[RetentionRule],
    protected: &ProtectedDigests,
    now: DateTime<Utc>,
) -> Result<Vec<&'a Tag>> {
    let mut to_delete = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let evaluation = evaluate_rule(index, tags, rule, protected, now)?;
        info!(
            rule = index,
            matched = evaluation.matched,
            protected = evaluation.protected,
            kept_by_minimum = evaluation.kept_by_minimum.len(),
            expired = evaluation.expired.len(),
            "Evaluated rule {}",
            rule
        );
        to_delete.extend(evaluation.expired);
    }

    Ok(to_delete)
}

/// Removes repeated tag names, keeping the first occurrence.
///
/// Returns the unique tags in their original order along with each name
/// that appeared more than once and how often it appeared.
pub fn dedupe_by_name<'a>(tags: Vec<&'a Tag>) -> (Vec<&'a Tag>, Vec<(String, usize)>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(tags.len());

    for tag in tags {
        let count = seen.entry(tag.name.as_str()).or_insert(0);
        *count += 1;
        if *count == 1 {
            unique.push(tag);
        }
    }

    let duplicates = unique
        .iter()
        .filter_map(|tag| {
            let count = seen[tag.name.as_str()];
            (count > 1).then(|| (tag.name.clone(), count))
        })
        .collect();

    (unique, duplicates)
}
