//! Budget quota resolution: tier normalization, budget-line selection,
//! availability mapping, claim validation and usage aggregation.
//!
//! The pure functions take caller-supplied record sets; [`BudgetQuotaService`]
//! wires them to a read-only [`BudgetStore`].

pub mod classifier;
pub mod domain;
pub mod error;
pub mod mapping;
pub mod normalizer;
pub mod rates;
pub mod repository;
pub mod router;
pub mod selector;
pub mod service;
pub mod summary;
pub mod usage;
pub mod validator;

#[cfg(test)]
mod tests;

pub use classifier::classify_description;
pub use domain::{
    BudgetRecord, BudgetStatus, NormalizedTier, QuotaSummaryRow, RecordScope, RewardRate,
    StatusSets, SubcategoryMetadata, Submission, SubmissionType, TierAvailability, TierCode,
    UsageAggregate, UsageKey, UsageRow, UsageScope, UNKNOWN_TIER,
};
pub use error::QuotaError;
pub use mapping::{build_mapping, BudgetValidationReport, MappingMode};
pub use normalizer::{canonical_tier, normalize_tier};
pub use repository::{BudgetStore, StoreError};
pub use router::{budget_router, ResolveRequest};
pub use selector::{resolve_record_tier, select_budget_record};
pub use service::{
    available_reward_total, BudgetQuotaService, QuotaPolicy, QuotaServiceError,
    SubmissionResolution,
};
pub use summary::{build_quota_summary, DEFAULT_SUMMARY_LIMIT};
pub use usage::{
    aggregate_usage, recompute_usage, tally_statuses, StatusTally, UsageEntry, UsageMap,
    UsageReport, UsageSource,
};
pub use validator::{
    derive_submission_selection, require_reward_amount, tier_from_keyword, validate_selection,
    validate_submission, AuthorRouting, SubmissionForm, SubmissionSelection,
};
