use super::domain::{
    BudgetRecord, RewardRate, StatusSets, SubcategoryMetadata, Submission, UsageRow,
};

/// Read-only view of the collaborator store the engine consumes.
///
/// Implementations own persistence and any balance deduction; the engine
/// never writes through this trait.
pub trait BudgetStore: Send + Sync {
    fn budgets_for_subcategory(&self, subcategory_id: i64)
        -> Result<Vec<BudgetRecord>, StoreError>;

    /// Rates for `year`, or every configured rate when `year` is `None`.
    fn reward_rates(&self, year: Option<&str>) -> Result<Vec<RewardRate>, StoreError>;

    /// Rows of the precomputed usage view. An empty `year_ids` means all years.
    fn usage_view(&self, year_ids: &[i64]) -> Result<Vec<UsageRow>, StoreError>;

    fn submissions(&self, year_ids: &[i64]) -> Result<Vec<Submission>, StoreError>;

    fn subcategory_metadata(
        &self,
        year_id: i64,
        subcategory_id: i64,
    ) -> Result<Option<SubcategoryMetadata>, StoreError>;

    fn status_sets(&self) -> Result<StatusSets, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("budget store unavailable: {0}")]
    Unavailable(String),
}
