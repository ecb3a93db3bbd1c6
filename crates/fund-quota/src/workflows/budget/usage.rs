use super::domain::{StatusSets, Submission, UsageAggregate, UsageKey, UsageRow, UsageScope};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Usage keyed by (year, subcategory, user), ordered for stable output.
pub type UsageMap = BTreeMap<UsageKey, UsageAggregate>;

/// Which source ended up backing an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    Precomputed,
    Recomputed,
    Merged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    pub source: UsageSource,
    pub usage: UsageMap,
}

impl UsageReport {
    /// Flattened rows for serialization; map keys are structs.
    pub fn entries(&self) -> Vec<UsageEntry> {
        self.usage
            .iter()
            .map(|(key, usage)| UsageEntry {
                key: *key,
                usage: *usage,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageEntry {
    #[serde(flatten)]
    pub key: UsageKey,
    #[serde(flatten)]
    pub usage: UsageAggregate,
}

/// Combine the precomputed usage view with a recomputation from approved submissions.
///
/// When the view has no rows in scope the recomputation is used wholesale;
/// otherwise each metric takes the larger of the two readings per key.
pub fn aggregate_usage(
    precomputed: &[UsageRow],
    submissions: &[Submission],
    status_sets: &StatusSets,
    scope: &UsageScope,
) -> UsageReport {
    let primary = collect_precomputed(precomputed, scope);
    let fallback = recompute_usage(submissions, status_sets, scope);

    if primary.is_empty() {
        info!(
            keys = fallback.len(),
            "usage view returned no rows; using recomputed usage"
        );
        return UsageReport {
            source: UsageSource::Recomputed,
            usage: fallback,
        };
    }

    if fallback.is_empty() {
        return UsageReport {
            source: UsageSource::Precomputed,
            usage: primary,
        };
    }

    let mut merged = primary;
    for (key, recomputed) in fallback {
        merged
            .entry(key)
            .and_modify(|existing| {
                let combined = existing.merge_max(recomputed);
                if combined != *existing {
                    debug!(?key, "usage view under-reports; taking recomputed maximum");
                }
                *existing = combined;
            })
            .or_insert(recomputed);
    }

    UsageReport {
        source: UsageSource::Merged,
        usage: merged,
    }
}

fn collect_precomputed(rows: &[UsageRow], scope: &UsageScope) -> UsageMap {
    let mut usage = UsageMap::new();
    for row in rows {
        let key = row.key();
        if !scope.contains(&key) {
            continue;
        }
        let entry = usage.entry(key).or_default();
        entry.used_grants = entry.used_grants.saturating_add(row.used_grants);
        entry.used_amount += row.used_amount;
    }
    usage
}

/// Group approved submissions by key, counting each submission id once.
pub fn recompute_usage(
    submissions: &[Submission],
    status_sets: &StatusSets,
    scope: &UsageScope,
) -> UsageMap {
    let mut unique: BTreeMap<i64, &Submission> = BTreeMap::new();
    for submission in submissions {
        if status_sets.approved.contains(&submission.status_id) {
            unique.entry(submission.submission_id).or_insert(submission);
        }
    }

    let mut usage = UsageMap::new();
    for submission in unique.into_values() {
        let key = UsageKey {
            year_id: submission.year_id,
            subcategory_id: submission.subcategory_id,
            user_id: submission.user_id,
        };
        if !scope.contains(&key) {
            continue;
        }
        let entry = usage.entry(key).or_default();
        entry.used_grants = entry.used_grants.saturating_add(1);
        entry.used_amount += submission.approved_amount_for_type();
    }
    usage
}

/// Per-status submission counts within a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub other: usize,
}

pub fn tally_statuses(
    submissions: &[Submission],
    status_sets: &StatusSets,
    scope: &UsageScope,
) -> StatusTally {
    let mut unique: BTreeMap<i64, &Submission> = BTreeMap::new();
    for submission in submissions {
        unique.entry(submission.submission_id).or_insert(submission);
    }

    let mut tally = StatusTally::default();
    for submission in unique.into_values() {
        let key = UsageKey {
            year_id: submission.year_id,
            subcategory_id: submission.subcategory_id,
            user_id: submission.user_id,
        };
        if !scope.contains(&key) {
            continue;
        }

        let status = submission.status_id;
        if status_sets.approved.contains(&status) {
            tally.approved += 1;
        } else if status_sets.pending.contains(&status) {
            tally.pending += 1;
        } else if status_sets.rejected.contains(&status) {
            tally.rejected += 1;
        } else {
            tally.other += 1;
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::budget::domain::SubmissionType;
    use rust_decimal::Decimal;
    use std::collections::BTreeSet;

    fn statuses() -> StatusSets {
        StatusSets {
            approved: BTreeSet::from([2]),
            pending: BTreeSet::from([1, 5]),
            rejected: BTreeSet::from([3]),
        }
    }

    fn key(year_id: i64, subcategory_id: i64, user_id: i64) -> UsageKey {
        UsageKey {
            year_id,
            subcategory_id,
            user_id,
        }
    }

    fn view_row(user_id: i64, grants: u32, amount: i64) -> UsageRow {
        UsageRow {
            year_id: 3,
            subcategory_id: 10,
            user_id,
            used_grants: grants,
            used_amount: Decimal::from(amount),
        }
    }

    fn submission(id: i64, user_id: i64, status_id: i64, kind: SubmissionType) -> Submission {
        Submission {
            submission_id: id,
            year_id: 3,
            subcategory_id: 10,
            user_id,
            submission_type: kind,
            status_id,
            approved_amount: Some(Decimal::from(1_000)),
            reward_approve_amount: Some(Decimal::from(3_000)),
        }
    }

    #[test]
    fn merge_takes_per_metric_maximum() {
        let view = vec![view_row(7, 3, 20_000)];
        let submissions: Vec<Submission> = (1..=5)
            .map(|id| submission(id, 7, 2, SubmissionType::FundApplication))
            .collect();

        let report = aggregate_usage(&view, &submissions, &statuses(), &UsageScope::default());
        assert_eq!(report.source, UsageSource::Merged);
        let usage = report.usage[&key(3, 10, 7)];
        assert_eq!(usage.used_grants, 5);
        assert_eq!(usage.used_amount, Decimal::from(20_000));
    }

    #[test]
    fn empty_view_falls_back_wholesale() {
        let submissions = vec![
            submission(1, 7, 2, SubmissionType::PublicationReward),
            submission(2, 8, 2, SubmissionType::FundApplication),
        ];
        let report = aggregate_usage(&[], &submissions, &statuses(), &UsageScope::default());

        assert_eq!(report.source, UsageSource::Recomputed);
        assert_eq!(
            report.usage,
            recompute_usage(&submissions, &statuses(), &UsageScope::default())
        );
        assert_eq!(report.usage[&key(3, 10, 7)].used_amount, Decimal::from(3_000));
        assert_eq!(report.usage[&key(3, 10, 8)].used_amount, Decimal::from(1_000));
    }

    #[test]
    fn keys_only_in_one_source_survive_the_merge() {
        let view = vec![view_row(7, 1, 500)];
        let submissions = vec![submission(1, 9, 2, SubmissionType::FundApplication)];
        let report = aggregate_usage(&view, &submissions, &statuses(), &UsageScope::default());

        assert_eq!(report.usage.len(), 2);
        assert_eq!(report.usage[&key(3, 10, 7)].used_grants, 1);
        assert_eq!(report.usage[&key(3, 10, 9)].used_grants, 1);
    }

    #[test]
    fn recomputation_counts_each_submission_once_and_only_approved() {
        let duplicated = submission(1, 7, 2, SubmissionType::FundApplication);
        let submissions = vec![
            duplicated.clone(),
            duplicated,
            submission(2, 7, 1, SubmissionType::FundApplication),
            submission(3, 7, 3, SubmissionType::FundApplication),
        ];
        let usage = recompute_usage(&submissions, &statuses(), &UsageScope::default());

        let entry = usage[&key(3, 10, 7)];
        assert_eq!(entry.used_grants, 1);
        assert_eq!(entry.used_amount, Decimal::from(1_000));
    }

    #[test]
    fn scope_filters_both_sources() {
        let mut other_year = view_row(7, 4, 4_000);
        other_year.year_id = 2;
        let view = vec![other_year];
        let submissions = vec![submission(1, 7, 2, SubmissionType::FundApplication)];

        let report = aggregate_usage(
            &view,
            &submissions,
            &statuses(),
            &UsageScope::for_years(vec![3]),
        );
        assert_eq!(report.source, UsageSource::Recomputed);
        assert_eq!(report.usage.len(), 1);
    }

    #[test]
    fn view_rows_for_one_key_are_summed() {
        let view = vec![view_row(7, 1, 100), view_row(7, 2, 200)];
        let report = aggregate_usage(&view, &[], &statuses(), &UsageScope::default());

        assert_eq!(report.source, UsageSource::Precomputed);
        let entry = report.usage[&key(3, 10, 7)];
        assert_eq!(entry.used_grants, 3);
        assert_eq!(entry.used_amount, Decimal::from(300));
    }

    #[test]
    fn oversized_grant_counts_saturate() {
        let view = vec![view_row(7, u32::MAX, 100), view_row(7, 5, 200)];
        let report = aggregate_usage(&view, &[], &statuses(), &UsageScope::default());

        let entry = report.usage[&key(3, 10, 7)];
        assert_eq!(entry.used_grants, u32::MAX);
        assert_eq!(entry.used_amount, Decimal::from(300));
    }

    #[test]
    fn tally_uses_supplied_status_sets() {
        let submissions = vec![
            submission(1, 7, 2, SubmissionType::FundApplication),
            submission(1, 7, 2, SubmissionType::FundApplication),
            submission(2, 7, 1, SubmissionType::FundApplication),
            submission(3, 7, 5, SubmissionType::PublicationReward),
            submission(4, 7, 3, SubmissionType::PublicationReward),
            submission(5, 7, 99, SubmissionType::PublicationReward),
        ];
        let tally = tally_statuses(&submissions, &statuses(), &UsageScope::default());
        assert_eq!(
            tally,
            StatusTally {
                pending: 2,
                approved: 1,
                rejected: 1,
                other: 1,
            }
        );
    }
}
