use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{QuotaSummaryRow, RewardRate, TierAvailability, TierCode, UsageScope};
use super::error::QuotaError;
use super::mapping::{build_mapping, BudgetValidationReport, MappingMode};
use super::rates::rates_with_fallback;
use super::repository::{BudgetStore, StoreError};
use super::summary::{build_quota_summary, DEFAULT_SUMMARY_LIMIT};
use super::usage::{aggregate_usage, tally_statuses, StatusTally, UsageReport};
use super::validator::{
    derive_submission_selection, require_reward_amount, validate_selection, validate_submission,
    AuthorRouting, SubmissionForm, SubmissionSelection,
};

/// Tunables for quota resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub mapping_mode: MappingMode,
    pub summary_limit: usize,
    pub author_routing: AuthorRouting,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            mapping_mode: MappingMode::FixedSet,
            summary_limit: DEFAULT_SUMMARY_LIMIT,
            author_routing: AuthorRouting::default(),
        }
    }
}

/// Budget resolved for a submission together with how it was derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResolution {
    pub selection: SubmissionSelection,
    pub budget: TierAvailability,
}

/// Service composing the collaborator store with the pure resolution engine.
///
/// Every call reads fresh records; nothing is cached between calls.
pub struct BudgetQuotaService<S> {
    store: Arc<S>,
    policy: QuotaPolicy,
}

impl<S> BudgetQuotaService<S>
where
    S: BudgetStore + 'static,
{
    pub fn new(store: Arc<S>, policy: QuotaPolicy) -> Self {
        Self { store, policy }
    }

    /// Per-tier availability table for a subcategory.
    pub fn mapping(
        &self,
        subcategory_id: i64,
        year: Option<&str>,
        author_status: Option<&str>,
    ) -> Result<Vec<TierAvailability>, QuotaServiceError> {
        let budgets = self.store.budgets_for_subcategory(subcategory_id)?;
        let rates = self.rates_for_year(year)?;
        Ok(build_mapping(
            subcategory_id,
            &budgets,
            &rates,
            author_status,
            self.policy.mapping_mode,
        ))
    }

    pub fn validation_report(
        &self,
        subcategory_id: i64,
        year: Option<&str>,
    ) -> Result<BudgetValidationReport, QuotaServiceError> {
        let mapping = self.mapping(subcategory_id, year, None)?;
        Ok(BudgetValidationReport::from_mapping(subcategory_id, &mapping))
    }

    pub fn available_quartiles(
        &self,
        subcategory_id: i64,
        year: Option<&str>,
    ) -> Result<Vec<TierCode>, QuotaServiceError> {
        Ok(self
            .validation_report(subcategory_id, year)?
            .available_codes())
    }

    /// Validate a single tier claim against the subcategory's budget lines.
    pub fn validate(
        &self,
        subcategory_id: i64,
        raw_code: &str,
        year: Option<&str>,
        author_status: Option<&str>,
    ) -> Result<TierAvailability, QuotaServiceError> {
        let budgets = self.store.budgets_for_subcategory(subcategory_id)?;
        let rates = self.rates_for_year(year)?;
        let resolved = validate_selection(subcategory_id, raw_code, &budgets, &rates, author_status)?;
        Ok(resolved)
    }

    /// Resolve the budget line a submission form should be charged to.
    ///
    /// With `require_price` a tier without a configured rate is rejected
    /// instead of being priced at zero.
    pub fn resolve_submission(
        &self,
        form: &SubmissionForm,
        subcategory_id: i64,
        year: Option<&str>,
        require_price: bool,
    ) -> Result<SubmissionResolution, QuotaServiceError> {
        let selection =
            derive_submission_selection(form, subcategory_id, self.policy.author_routing);
        if selection.rerouted {
            debug!(
                from = subcategory_id,
                to = selection.subcategory_id,
                "lead-author claim routed to dedicated subcategory"
            );
        }

        let budgets = self.store.budgets_for_subcategory(selection.subcategory_id)?;
        let rates = self.rates_for_year(year)?;
        let budget = validate_submission(&selection, &budgets, &rates)?;

        if require_price {
            require_reward_amount(&rates, budget.code, selection.author_status.as_deref())?;
        }

        Ok(SubmissionResolution { selection, budget })
    }

    pub fn usage(&self, scope: &UsageScope) -> Result<UsageReport, QuotaServiceError> {
        let view = self.store.usage_view(&scope.year_ids)?;
        let submissions = self.store.submissions(&scope.year_ids)?;
        let status_sets = self.store.status_sets()?;
        Ok(aggregate_usage(&view, &submissions, &status_sets, scope))
    }

    pub fn quota_summary(
        &self,
        scope: &UsageScope,
    ) -> Result<Vec<QuotaSummaryRow>, QuotaServiceError> {
        let report = self.usage(scope)?;

        let mut metadata = BTreeMap::new();
        for key in report.usage.keys() {
            let lookup_key = (key.year_id, key.subcategory_id);
            if metadata.contains_key(&lookup_key) {
                continue;
            }
            let found = self
                .store
                .subcategory_metadata(key.year_id, key.subcategory_id)?;
            metadata.insert(lookup_key, found);
        }

        let rows = build_quota_summary(
            &report.usage,
            |key| {
                metadata
                    .get(&(key.year_id, key.subcategory_id))
                    .cloned()
                    .flatten()
            },
            self.policy.summary_limit,
        );
        Ok(rows)
    }

    pub fn status_tally(&self, scope: &UsageScope) -> Result<StatusTally, QuotaServiceError> {
        let submissions = self.store.submissions(&scope.year_ids)?;
        let status_sets = self.store.status_sets()?;
        Ok(tally_statuses(&submissions, &status_sets, scope))
    }

    /// Rates effective for a year: the year's active rows, with pairs it
    /// doesn't price taken from the most recent year that does.
    fn rates_for_year(&self, year: Option<&str>) -> Result<Vec<RewardRate>, StoreError> {
        let all_rates = self.store.reward_rates(None)?;
        let year_rates = match year.map(str::trim).filter(|year| !year.is_empty()) {
            Some(year) => {
                let rates = self.store.reward_rates(Some(year))?;
                if !rates.iter().any(|rate| rate.is_active) {
                    info!(year, "no active reward rates for year; using latest configured year");
                }
                rates
            }
            None => Vec::new(),
        };

        Ok(rates_with_fallback(&year_rates, &all_rates))
    }
}

/// Total reward across a mapping's available tiers, used by reports.
pub fn available_reward_total(mapping: &[TierAvailability]) -> Decimal {
    mapping
        .iter()
        .filter(|entry| entry.is_available)
        .map(|entry| entry.reward_amount)
        .sum()
}

/// Error raised by the quota service.
#[derive(Debug, thiserror::Error)]
pub enum QuotaServiceError {
    #[error(transparent)]
    Quota(#[from] QuotaError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
