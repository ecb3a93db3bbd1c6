use super::domain::{BudgetRecord, NormalizedTier, RewardRate, TierAvailability, TierCode};
use super::error::QuotaError;
use super::mapping::availability_for;
use super::normalizer::normalize_tier;
use super::rates::price_for_tier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validate one (subcategory, tier) claim and resolve it to a budget line.
///
/// A missing reward rate prices the claim at zero rather than failing.
pub fn validate_selection(
    subcategory_id: i64,
    raw_code: &str,
    budgets: &[BudgetRecord],
    rates: &[RewardRate],
    author_status: Option<&str>,
) -> Result<TierAvailability, QuotaError> {
    let normalized = normalize_tier(raw_code);
    let code = normalized.canonical().ok_or_else(|| QuotaError::NotFound {
        code: normalized.to_string(),
        subcategory_id,
    })?;

    let scoped: Vec<BudgetRecord> = budgets
        .iter()
        .filter(|record| record.subcategory_id == subcategory_id)
        .cloned()
        .collect();

    let reward_amount = price_for_tier(rates, code, author_status).unwrap_or(Decimal::ZERO);
    let availability = availability_for(&scoped, code, reward_amount);

    if availability.budget_id == 0 {
        return Err(QuotaError::NotFound {
            code: code.to_string(),
            subcategory_id,
        });
    }
    if !availability.is_available {
        return Err(QuotaError::Unavailable {
            code: code.to_string(),
        });
    }

    Ok(availability)
}

/// Price lookup for callers that cannot proceed without a configured rate.
pub fn require_reward_amount(
    rates: &[RewardRate],
    code: TierCode,
    author_status: Option<&str>,
) -> Result<Decimal, QuotaError> {
    price_for_tier(rates, code, author_status).ok_or_else(|| QuotaError::TemplateMissing {
        code: code.to_string(),
    })
}

/// Tier-related fields of a submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionForm {
    #[serde(default)]
    pub author_status: Option<String>,
    #[serde(default)]
    pub journal_quartile: Option<String>,
    #[serde(default)]
    pub journal_tier: Option<String>,
}

impl SubmissionForm {
    pub fn from_map(fields: &HashMap<String, String>) -> Self {
        Self {
            author_status: fields.get("author_status").cloned(),
            journal_quartile: fields.get("journal_quartile").cloned(),
            journal_tier: fields.get("journal_tier").cloned(),
        }
    }

    /// The explicit quartile wins; a tier keyword is consulted only when it is absent.
    pub fn tier(&self) -> NormalizedTier {
        if let Some(quartile) = self.journal_quartile.as_deref().and_then(explicit_value) {
            return normalize_tier(quartile);
        }

        self.journal_tier
            .as_deref()
            .and_then(tier_from_keyword)
            .map(NormalizedTier::Canonical)
            .unwrap_or_else(NormalizedTier::unknown)
    }

    pub fn author_status(&self) -> Option<&str> {
        self.author_status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
    }

    fn is_lead_author(&self) -> bool {
        self.author_status().map_or(false, |status| {
            status.eq_ignore_ascii_case("first_author")
                || status.eq_ignore_ascii_case("corresponding_author")
        })
    }
}

fn explicit_value(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" {
        None
    } else {
        Some(trimmed)
    }
}

/// Map the `journal_tier` keyword vocabulary onto canonical codes.
pub fn tier_from_keyword(keyword: &str) -> Option<TierCode> {
    match keyword.trim().to_ascii_lowercase().as_str() {
        "top_5_percent" | "top5" | "t5" => Some(TierCode::T5),
        "top_10_percent" | "top10" | "t10" => Some(TierCode::T10),
        "tci" | "tci_1" | "tci_2" | "tci1" | "tci2" => Some(TierCode::Tci),
        "na" | "n/a" | "not_applicable" => Some(TierCode::NotApplicable),
        _ => None,
    }
}

/// Routing rule for first/corresponding-author claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorRouting {
    pub dedicated_subcategory_id: Option<i64>,
}

/// Subcategory and tier a submission resolves against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionSelection {
    pub subcategory_id: i64,
    pub code: NormalizedTier,
    pub author_status: Option<String>,
    pub rerouted: bool,
}

pub fn derive_submission_selection(
    form: &SubmissionForm,
    subcategory_id: i64,
    routing: AuthorRouting,
) -> SubmissionSelection {
    let routed = routing
        .dedicated_subcategory_id
        .filter(|_| form.is_lead_author());

    SubmissionSelection {
        subcategory_id: routed.unwrap_or(subcategory_id),
        code: form.tier(),
        author_status: form.author_status().map(str::to_string),
        rerouted: routed.is_some_and(|id| id != subcategory_id),
    }
}

/// Final budget assignment for a submission. `budgets` must be the lines of
/// `selection.subcategory_id`. Incomplete forms fail with `NotFound`.
pub fn validate_submission(
    selection: &SubmissionSelection,
    budgets: &[BudgetRecord],
    rates: &[RewardRate],
) -> Result<TierAvailability, QuotaError> {
    validate_selection(
        selection.subcategory_id,
        selection.code.as_str(),
        budgets,
        rates,
        selection.author_status.as_deref(),
    )
}
