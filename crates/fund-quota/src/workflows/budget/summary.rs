use super::domain::{QuotaSummaryRow, SubcategoryMetadata, UsageKey};
use super::usage::UsageMap;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::warn;

/// Row cap applied when no explicit limit is configured.
pub const DEFAULT_SUMMARY_LIMIT: usize = 100;

/// Join usage against subcategory caps, keeping the `limit` heaviest consumers.
///
/// Keys without metadata for their (year, subcategory) are logged and dropped.
pub fn build_quota_summary<F>(usage: &UsageMap, metadata_lookup: F, limit: usize) -> Vec<QuotaSummaryRow>
where
    F: Fn(&UsageKey) -> Option<SubcategoryMetadata>,
{
    let mut rows: Vec<QuotaSummaryRow> = usage
        .iter()
        .filter_map(|(key, aggregate)| {
            let Some(metadata) = metadata_lookup(key) else {
                warn!(
                    year_id = key.year_id,
                    subcategory_id = key.subcategory_id,
                    user_id = key.user_id,
                    "no subcategory metadata for usage key; row dropped"
                );
                return None;
            };

            let allocated_amount = metadata.effective_allocation();
            let max_grants = metadata.max_grants.unwrap_or(0);
            let remaining_budget = (allocated_amount - aggregate.used_amount).max(Decimal::ZERO);

            Some(QuotaSummaryRow {
                year_id: key.year_id,
                subcategory_id: key.subcategory_id,
                user_id: key.user_id,
                category_name: metadata.category_name,
                subcategory_name: metadata.subcategory_name,
                allocated_amount,
                used_amount: aggregate.used_amount,
                remaining_budget,
                max_grants,
                used_grants: aggregate.used_grants,
                remaining_grants: max_grants.saturating_sub(aggregate.used_grants),
            })
        })
        .collect();

    rows.sort_by(compare_rows);
    rows.truncate(limit);
    rows
}

// Heaviest usage first; the key order only settles exact ties.
fn compare_rows(left: &QuotaSummaryRow, right: &QuotaSummaryRow) -> Ordering {
    right
        .used_amount
        .cmp(&left.used_amount)
        .then_with(|| right.used_grants.cmp(&left.used_grants))
        .then_with(|| {
            (left.year_id, left.subcategory_id, left.user_id).cmp(&(
                right.year_id,
                right.subcategory_id,
                right.user_id,
            ))
        })
}
