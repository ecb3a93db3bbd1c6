use super::classifier::classify_description;
use super::domain::{BudgetRecord, NormalizedTier, RecordScope, TierCode};
use super::normalizer::normalize_tier;
use std::cmp::Ordering;

/// Resolve the tier a budget line stands for: its stored level code first,
/// falling back to the fund description when the code is absent or unknown.
pub fn resolve_record_tier(record: &BudgetRecord) -> Option<TierCode> {
    let explicit = record
        .level_code
        .as_deref()
        .map(normalize_tier)
        .and_then(|normalized| match normalized {
            NormalizedTier::Canonical(code) => Some(code),
            NormalizedTier::Unrecognized(_) => None,
        });

    explicit.or_else(|| classify_description(&record.fund_description))
}

/// Pick the authoritative budget line for `code` among possible duplicates.
///
/// Active lines win over inactive ones, then the larger remaining budget,
/// then the lower budget id, so the result never depends on input order.
/// Subcategory-wide `overall` rows are not tier lines and are skipped.
pub fn select_budget_record(records: &[BudgetRecord], code: TierCode) -> Option<&BudgetRecord> {
    records
        .iter()
        .filter(|record| record.record_scope == RecordScope::Rule)
        .filter(|record| resolve_record_tier(record) == Some(code))
        .fold(None, |best: Option<&BudgetRecord>, candidate| match best {
            Some(current) if compare_candidates(current, candidate) != Ordering::Less => {
                Some(current)
            }
            _ => Some(candidate),
        })
}

// `Greater` means `left` is the better pick.
fn compare_candidates(left: &BudgetRecord, right: &BudgetRecord) -> Ordering {
    left.is_active()
        .cmp(&right.is_active())
        .then_with(|| left.remaining_budget.cmp(&right.remaining_budget))
        .then_with(|| right.budget_id.cmp(&left.budget_id))
}
