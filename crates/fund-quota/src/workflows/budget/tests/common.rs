use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::workflows::budget::domain::{
    BudgetRecord, BudgetStatus, RecordScope, RewardRate, StatusSets, SubcategoryMetadata,
    Submission, SubmissionType, UsageRow,
};
use crate::workflows::budget::repository::{BudgetStore, StoreError};
use crate::workflows::budget::{BudgetQuotaService, QuotaPolicy};

pub(super) const SUBCATEGORY: i64 = 10;
pub(super) const APPROVED: i64 = 2;
pub(super) const PENDING: i64 = 1;
pub(super) const REJECTED: i64 = 3;

pub(super) fn budget_line(
    budget_id: i64,
    level_code: Option<&str>,
    description: &str,
    remaining: i64,
    status: BudgetStatus,
) -> BudgetRecord {
    BudgetRecord {
        budget_id,
        subcategory_id: SUBCATEGORY,
        record_scope: RecordScope::Rule,
        level_code: level_code.map(str::to_string),
        fund_description: description.to_string(),
        allocated_amount: Decimal::from(100_000),
        remaining_budget: Decimal::from(remaining),
        max_grants: None,
        remaining_grants: None,
        status,
    }
}

/// Subcategory 10: an active T5 line with 5000 left and an exhausted Q1 line.
pub(super) fn budgets() -> Vec<BudgetRecord> {
    vec![
        budget_line(101, Some("T5"), "Top 5% journals", 5_000, BudgetStatus::Active),
        budget_line(102, Some("Q1"), "Quartile 1 journals", 0, BudgetStatus::Active),
        BudgetRecord {
            record_scope: RecordScope::Overall,
            level_code: None,
            ..budget_line(100, None, "Subcategory ceiling", 250_000, BudgetStatus::Active)
        },
    ]
}

pub(super) fn rate(year: &str, author_status: &str, tier: &str, amount: i64) -> RewardRate {
    RewardRate {
        year: year.to_string(),
        author_status: author_status.to_string(),
        journal_quartile: tier.to_string(),
        amount: Decimal::from(amount),
        is_active: true,
    }
}

pub(super) fn rates() -> Vec<RewardRate> {
    vec![
        rate("2568", "first_author", "T5", 3_000),
        rate("2568", "co_author", "T5", 1_500),
        rate("2567", "first_author", "Q1", 2_000),
    ]
}

pub(super) fn submission(
    submission_id: i64,
    user_id: i64,
    status_id: i64,
    amount: i64,
) -> Submission {
    Submission {
        submission_id,
        year_id: 2568,
        subcategory_id: SUBCATEGORY,
        user_id,
        submission_type: SubmissionType::PublicationReward,
        status_id,
        approved_amount: None,
        reward_approve_amount: Some(Decimal::from(amount)),
    }
}

pub(super) fn status_sets() -> StatusSets {
    StatusSets {
        approved: BTreeSet::from([APPROVED]),
        pending: BTreeSet::from([PENDING]),
        rejected: BTreeSet::from([REJECTED]),
    }
}

pub(super) fn metadata() -> SubcategoryMetadata {
    SubcategoryMetadata {
        year_id: 2568,
        subcategory_id: SUBCATEGORY,
        subcategory_name: "Journal publication reward".to_string(),
        category_name: "Publication".to_string(),
        allocated_amount: Decimal::from(10_000),
        max_amount_per_year: None,
        max_amount_per_grant: None,
        max_grants: Some(3),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) budgets: Vec<BudgetRecord>,
    pub(super) rates: Vec<RewardRate>,
    pub(super) usage: Vec<UsageRow>,
    pub(super) submissions: Vec<Submission>,
    pub(super) metadata: Vec<SubcategoryMetadata>,
    pub(super) status_sets: StatusSets,
}

impl MemoryStore {
    pub(super) fn seeded() -> Self {
        Self {
            budgets: budgets(),
            rates: rates(),
            usage: Vec::new(),
            submissions: vec![
                submission(1, 7, APPROVED, 3_000),
                submission(2, 7, PENDING, 1_500),
                submission(3, 8, REJECTED, 2_000),
            ],
            metadata: vec![metadata()],
            status_sets: status_sets(),
        }
    }
}

fn in_years(year_ids: &[i64], year_id: i64) -> bool {
    year_ids.is_empty() || year_ids.contains(&year_id)
}

impl BudgetStore for MemoryStore {
    fn budgets_for_subcategory(
        &self,
        subcategory_id: i64,
    ) -> Result<Vec<BudgetRecord>, StoreError> {
        Ok(self
            .budgets
            .iter()
            .filter(|record| record.subcategory_id == subcategory_id)
            .cloned()
            .collect())
    }

    fn reward_rates(&self, year: Option<&str>) -> Result<Vec<RewardRate>, StoreError> {
        Ok(self
            .rates
            .iter()
            .filter(|rate| year.map_or(true, |year| rate.year == year))
            .cloned()
            .collect())
    }

    fn usage_view(&self, year_ids: &[i64]) -> Result<Vec<UsageRow>, StoreError> {
        Ok(self
            .usage
            .iter()
            .filter(|row| in_years(year_ids, row.year_id))
            .cloned()
            .collect())
    }

    fn submissions(&self, year_ids: &[i64]) -> Result<Vec<Submission>, StoreError> {
        Ok(self
            .submissions
            .iter()
            .filter(|submission| in_years(year_ids, submission.year_id))
            .cloned()
            .collect())
    }

    fn subcategory_metadata(
        &self,
        year_id: i64,
        subcategory_id: i64,
    ) -> Result<Option<SubcategoryMetadata>, StoreError> {
        Ok(self
            .metadata
            .iter()
            .find(|meta| meta.year_id == year_id && meta.subcategory_id == subcategory_id)
            .cloned())
    }

    fn status_sets(&self) -> Result<StatusSets, StoreError> {
        Ok(self.status_sets.clone())
    }
}

pub(super) struct UnavailableStore;

impl BudgetStore for UnavailableStore {
    fn budgets_for_subcategory(&self, _: i64) -> Result<Vec<BudgetRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn reward_rates(&self, _: Option<&str>) -> Result<Vec<RewardRate>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn usage_view(&self, _: &[i64]) -> Result<Vec<UsageRow>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn submissions(&self, _: &[i64]) -> Result<Vec<Submission>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn subcategory_metadata(
        &self,
        _: i64,
        _: i64,
    ) -> Result<Option<SubcategoryMetadata>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn status_sets(&self) -> Result<StatusSets, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

pub(super) fn build_service() -> BudgetQuotaService<MemoryStore> {
    BudgetQuotaService::new(Arc::new(MemoryStore::seeded()), QuotaPolicy::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
