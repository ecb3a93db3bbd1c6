use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Sentinel used when a claim carries neither an explicit nor a keyword tier.
pub const UNKNOWN_TIER: &str = "UNKNOWN";

/// Reward tiers a publication claim can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TierCode {
    Q1,
    Q2,
    Q3,
    Q4,
    T5,
    T10,
    #[serde(rename = "TCI")]
    Tci,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl TierCode {
    pub const fn all() -> [Self; 8] {
        [
            Self::Q1,
            Self::Q2,
            Self::Q3,
            Self::Q4,
            Self::T5,
            Self::T10,
            Self::Tci,
            Self::NotApplicable,
        ]
    }

    /// Presentation order used for availability tables and missing-budget lists.
    pub const fn ordered() -> [Self; 7] {
        [
            Self::T5,
            Self::T10,
            Self::Q1,
            Self::Q2,
            Self::Q3,
            Self::Q4,
            Self::Tci,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::T5 => "T5",
            Self::T10 => "T10",
            Self::Tci => "TCI",
            Self::NotApplicable => "N/A",
        }
    }

    /// Exact match against the canonical spelling; synonyms go through the normalizer.
    pub fn from_code(value: &str) -> Option<Self> {
        Self::all().into_iter().find(|code| code.as_str() == value)
    }

    /// Placeholder description for budget lines stored without one.
    pub const fn label(self) -> &'static str {
        match self {
            Self::T5 => "International journal, quartile 1 (top 5%), indexed in WOS, ISI or SCOPUS",
            Self::T10 => {
                "International journal, quartile 1 (top 10%), indexed in WOS, ISI or SCOPUS"
            }
            Self::Q1 => "International journal, quartile 1, indexed in WOS, ISI or SCOPUS",
            Self::Q2 => "International journal, quartile 2, indexed in WOS, ISI or SCOPUS",
            Self::Q3 => "International journal, quartile 3, indexed in WOS, ISI or SCOPUS",
            Self::Q4 => "International journal, quartile 4, indexed in WOS, ISI or SCOPUS",
            Self::Tci => "Journal indexed in WOS, ISI, SCOPUS or the TCI database",
            Self::NotApplicable => "Journal without a ranked quartile",
        }
    }
}

impl fmt::Display for TierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of tier normalization: either a canonical code or the cleaned raw text.
///
/// An `Unrecognized` value never matches a budget line, even when its text
/// happens to resemble one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedTier {
    Canonical(TierCode),
    Unrecognized(String),
}

impl NormalizedTier {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canonical(code) => code.as_str(),
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }

    pub fn canonical(&self) -> Option<TierCode> {
        match self {
            Self::Canonical(code) => Some(*code),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn unknown() -> Self {
        Self::Unrecognized(UNKNOWN_TIER.to_string())
    }
}

impl fmt::Display for NormalizedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NormalizedTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Active,
    Inactive,
}

impl BudgetStatus {
    pub fn from_label(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

/// `overall` rows carry a subcategory-wide cap, `rule` rows a per-tier line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordScope {
    Overall,
    #[default]
    Rule,
}

impl RecordScope {
    pub fn from_label(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("overall") {
            Self::Overall
        } else {
            Self::Rule
        }
    }
}

/// One funding line as stored by the collaborator store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub budget_id: i64,
    pub subcategory_id: i64,
    #[serde(default, deserialize_with = "deserialize_scope")]
    pub record_scope: RecordScope,
    #[serde(default)]
    pub level_code: Option<String>,
    #[serde(default)]
    pub fund_description: String,
    pub allocated_amount: Decimal,
    pub remaining_budget: Decimal,
    #[serde(default)]
    pub max_grants: Option<u32>,
    #[serde(default)]
    pub remaining_grants: Option<u32>,
    #[serde(deserialize_with = "deserialize_status")]
    pub status: BudgetStatus,
}

impl BudgetRecord {
    pub fn is_active(&self) -> bool {
        self.status == BudgetStatus::Active
    }

    pub fn is_available(&self) -> bool {
        self.is_active() && self.remaining_budget > Decimal::ZERO
    }
}

/// Configured payout for a tier, independent of remaining capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRate {
    pub year: String,
    pub author_status: String,
    pub journal_quartile: String,
    pub amount: Decimal,
    pub is_active: bool,
}

/// Availability of one tier within a subcategory, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAvailability {
    pub code: TierCode,
    pub budget_id: i64,
    pub description: String,
    pub reward_amount: Decimal,
    pub remaining_budget: Decimal,
    pub is_available: bool,
}

impl TierAvailability {
    pub(crate) fn unbudgeted(code: TierCode, reward_amount: Decimal) -> Self {
        Self {
            code,
            budget_id: 0,
            description: code.label().to_string(),
            reward_amount,
            remaining_budget: Decimal::ZERO,
            is_available: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    FundApplication,
    PublicationReward,
}

/// Submission joined with the approved amount of its type-specific detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: i64,
    pub year_id: i64,
    pub subcategory_id: i64,
    pub user_id: i64,
    pub submission_type: SubmissionType,
    pub status_id: i64,
    #[serde(default)]
    pub approved_amount: Option<Decimal>,
    #[serde(default)]
    pub reward_approve_amount: Option<Decimal>,
}

impl Submission {
    /// Fund applications record `approved_amount`; publication rewards record
    /// `reward_approve_amount`.
    pub fn approved_amount_for_type(&self) -> Decimal {
        let amount = match self.submission_type {
            SubmissionType::FundApplication => self.approved_amount,
            SubmissionType::PublicationReward => self.reward_approve_amount,
        };
        amount.unwrap_or(Decimal::ZERO)
    }
}

/// Row of the precomputed per-user usage view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRow {
    pub year_id: i64,
    pub subcategory_id: i64,
    pub user_id: i64,
    pub used_grants: u32,
    pub used_amount: Decimal,
}

impl UsageRow {
    pub fn key(&self) -> UsageKey {
        UsageKey {
            year_id: self.year_id,
            subcategory_id: self.subcategory_id,
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UsageKey {
    pub year_id: i64,
    pub subcategory_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageAggregate {
    pub used_grants: u32,
    pub used_amount: Decimal,
}

impl UsageAggregate {
    /// Per-metric maximum of two readings for the same key.
    pub fn merge_max(self, other: Self) -> Self {
        Self {
            used_grants: self.used_grants.max(other.used_grants),
            used_amount: self.used_amount.max(other.used_amount),
        }
    }
}

/// Filters applied to usage queries. An empty `year_ids` list means every year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageScope {
    pub year_ids: Vec<i64>,
    pub subcategory_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl UsageScope {
    pub fn for_years(year_ids: Vec<i64>) -> Self {
        Self {
            year_ids,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &UsageKey) -> bool {
        (self.year_ids.is_empty() || self.year_ids.contains(&key.year_id))
            && self.subcategory_id.map_or(true, |id| id == key.subcategory_id)
            && self.user_id.map_or(true, |id| id == key.user_id)
    }
}

/// Externally resolved status identifiers; the engine never interprets codes itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSets {
    pub approved: BTreeSet<i64>,
    pub pending: BTreeSet<i64>,
    pub rejected: BTreeSet<i64>,
}

/// Display names and caps for a subcategory in a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryMetadata {
    pub year_id: i64,
    pub subcategory_id: i64,
    pub subcategory_name: String,
    pub category_name: String,
    pub allocated_amount: Decimal,
    #[serde(default)]
    pub max_amount_per_year: Option<Decimal>,
    #[serde(default)]
    pub max_amount_per_grant: Option<Decimal>,
    #[serde(default)]
    pub max_grants: Option<u32>,
}

impl SubcategoryMetadata {
    /// Allocation falls back to the yearly cap, then to per-grant cap times grant count.
    pub fn effective_allocation(&self) -> Decimal {
        if !self.allocated_amount.is_zero() {
            return self.allocated_amount;
        }

        if let Some(per_year) = self.max_amount_per_year.filter(|value| !value.is_zero()) {
            return per_year;
        }

        match (self.max_amount_per_grant, self.max_grants) {
            (Some(per_grant), Some(grants)) => per_grant * Decimal::from(grants),
            _ => Decimal::ZERO,
        }
    }
}

/// Remaining capacity for one user within one subcategory and year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaSummaryRow {
    pub year_id: i64,
    pub subcategory_id: i64,
    pub user_id: i64,
    pub category_name: String,
    pub subcategory_name: String,
    pub allocated_amount: Decimal,
    pub used_amount: Decimal,
    pub remaining_budget: Decimal,
    pub max_grants: u32,
    pub used_grants: u32,
    pub remaining_grants: u32,
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<BudgetStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(BudgetStatus::from_label(&raw))
}

fn deserialize_scope<'de, D>(deserializer: D) -> Result<RecordScope, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(RecordScope::from_label)
        .unwrap_or_default())
}
