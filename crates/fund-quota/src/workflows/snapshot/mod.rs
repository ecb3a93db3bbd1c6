//! CSV snapshots of the collaborator store, loaded into memory.

mod parser;

use crate::workflows::budget::domain::{
    BudgetRecord, RewardRate, StatusSets, SubcategoryMetadata, Submission, UsageRow,
};
use crate::workflows::budget::repository::{BudgetStore, StoreError};
use parser::{parse_rows, StatusGroup, StatusRow};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub enum SnapshotImportError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io { path, source } => {
                write!(f, "failed to read snapshot {}: {}", path.display(), source)
            }
            SnapshotImportError::Csv { path, source } => {
                write!(f, "invalid snapshot data in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io { source, .. } => Some(source),
            SnapshotImportError::Csv { source, .. } => Some(source),
        }
    }
}

/// Every record set the engine reads, as plain vectors.
#[derive(Debug, Clone, Default)]
pub struct BudgetSnapshot {
    pub budgets: Vec<BudgetRecord>,
    pub reward_rates: Vec<RewardRate>,
    pub submissions: Vec<Submission>,
    pub usage: Vec<UsageRow>,
    pub subcategories: Vec<SubcategoryMetadata>,
    pub status_sets: StatusSets,
}

impl BudgetSnapshot {
    /// Load `budgets.csv`, `reward_rates.csv`, `submissions.csv`, `usage.csv`,
    /// `subcategories.csv` and `statuses.csv`; absent files are empty sets.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, SnapshotImportError> {
        let dir = dir.as_ref();
        let statuses: Vec<StatusRow> = load_optional(&dir.join("statuses.csv"))?;

        let mut status_sets = StatusSets::default();
        for row in &statuses {
            match row.group() {
                Some(StatusGroup::Approved) => {
                    status_sets.approved.insert(row.status_id);
                }
                Some(StatusGroup::Pending) => {
                    status_sets.pending.insert(row.status_id);
                }
                Some(StatusGroup::Rejected) => {
                    status_sets.rejected.insert(row.status_id);
                }
                None => {}
            }
        }

        Ok(Self {
            budgets: load_optional(&dir.join("budgets.csv"))?,
            reward_rates: load_optional(&dir.join("reward_rates.csv"))?,
            submissions: load_optional(&dir.join("submissions.csv"))?,
            usage: load_optional(&dir.join("usage.csv"))?,
            subcategories: load_optional(&dir.join("subcategories.csv"))?,
            status_sets,
        })
    }
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SnapshotImportError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "snapshot file absent; using empty set");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(SnapshotImportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_rows(file).map_err(|source| SnapshotImportError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Read-only [`BudgetStore`] backed by an in-memory snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshot: BudgetSnapshot,
}

impl SnapshotStore {
    pub fn new(snapshot: BudgetSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, SnapshotImportError> {
        BudgetSnapshot::from_dir(dir).map(Self::new)
    }

    pub fn snapshot(&self) -> &BudgetSnapshot {
        &self.snapshot
    }
}

fn in_years(year_ids: &[i64], year_id: i64) -> bool {
    year_ids.is_empty() || year_ids.contains(&year_id)
}

impl BudgetStore for SnapshotStore {
    fn budgets_for_subcategory(
        &self,
        subcategory_id: i64,
    ) -> Result<Vec<BudgetRecord>, StoreError> {
        Ok(self
            .snapshot
            .budgets
            .iter()
            .filter(|record| record.subcategory_id == subcategory_id)
            .cloned()
            .collect())
    }

    fn reward_rates(&self, year: Option<&str>) -> Result<Vec<RewardRate>, StoreError> {
        Ok(self
            .snapshot
            .reward_rates
            .iter()
            .filter(|rate| year.map_or(true, |year| rate.year.trim() == year.trim()))
            .cloned()
            .collect())
    }

    fn usage_view(&self, year_ids: &[i64]) -> Result<Vec<UsageRow>, StoreError> {
        Ok(self
            .snapshot
            .usage
            .iter()
            .filter(|row| in_years(year_ids, row.year_id))
            .cloned()
            .collect())
    }

    fn submissions(&self, year_ids: &[i64]) -> Result<Vec<Submission>, StoreError> {
        Ok(self
            .snapshot
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
            .snapshot
            .subcategories
            .iter()
            .find(|meta| meta.year_id == year_id && meta.subcategory_id == subcategory_id)
            .cloned())
    }

    fn status_sets(&self) -> Result<StatusSets, StoreError> {
        Ok(self.snapshot.status_sets.clone())
    }
}
