use super::domain::{BudgetRecord, RewardRate, TierAvailability, TierCode};
use super::rates::{configured_tiers, price_for_tier};
use super::selector::select_budget_record;
use rust_decimal::Decimal;
use serde::Serialize;

/// Which tiers a mapping iterates. A single call never mixes the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Every tier of the fixed presentation sequence.
    #[default]
    FixedSet,
    /// Only tiers declared by the active reward-rate configuration.
    Configured,
}

impl MappingMode {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fixed_set" => Some(Self::FixedSet),
            "configured" | "config" | "rates" => Some(Self::Configured),
            _ => None,
        }
    }
}

/// Assemble the per-tier availability table for one subcategory.
pub fn build_mapping(
    subcategory_id: i64,
    budgets: &[BudgetRecord],
    rates: &[RewardRate],
    author_status: Option<&str>,
    mode: MappingMode,
) -> Vec<TierAvailability> {
    let scoped: Vec<BudgetRecord> = budgets
        .iter()
        .filter(|record| record.subcategory_id == subcategory_id)
        .cloned()
        .collect();

    let tiers = match mode {
        MappingMode::FixedSet => TierCode::ordered().to_vec(),
        MappingMode::Configured => configured_tiers(rates),
    };

    tiers
        .into_iter()
        .map(|code| {
            let reward_amount = price_for_tier(rates, code, author_status).unwrap_or(Decimal::ZERO);
            availability_for(&scoped, code, reward_amount)
        })
        .collect()
}

pub(crate) fn availability_for(
    budgets: &[BudgetRecord],
    code: TierCode,
    reward_amount: Decimal,
) -> TierAvailability {
    match select_budget_record(budgets, code) {
        Some(record) => {
            let description = if record.fund_description.trim().is_empty() {
                code.label().to_string()
            } else {
                record.fund_description.clone()
            };

            TierAvailability {
                code,
                budget_id: record.budget_id,
                description,
                reward_amount,
                remaining_budget: record.remaining_budget,
                is_available: record.is_available(),
            }
        }
        None => TierAvailability::unbudgeted(code, reward_amount),
    }
}

/// Coverage of a subcategory's budget lines against the fixed tier set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetValidationReport {
    pub subcategory_id: i64,
    pub expected_count: usize,
    pub budget_count: usize,
    pub available_budgets: Vec<TierAvailability>,
    pub missing_budgets: Vec<TierCode>,
    pub is_fully_available: bool,
}

impl BudgetValidationReport {
    pub fn from_mapping(subcategory_id: i64, mapping: &[TierAvailability]) -> Self {
        let mut available_budgets: Vec<TierAvailability> = Vec::with_capacity(mapping.len());
        for entry in mapping {
            let duplicate = available_budgets
                .iter()
                .any(|existing| existing.code == entry.code);
            if entry.is_available && entry.budget_id > 0 && !duplicate {
                available_budgets.push(entry.clone());
            }
        }

        let missing_budgets: Vec<TierCode> = TierCode::ordered()
            .into_iter()
            .filter(|code| !available_budgets.iter().any(|entry| entry.code == *code))
            .collect();

        let expected_count = TierCode::ordered().len();
        Self {
            subcategory_id,
            expected_count,
            budget_count: available_budgets.len(),
            is_fully_available: missing_budgets.is_empty(),
            available_budgets,
            missing_budgets,
        }
    }

    pub fn available_codes(&self) -> Vec<TierCode> {
        self.available_budgets.iter().map(|entry| entry.code).collect()
    }
}
