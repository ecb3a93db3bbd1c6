use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;

pub(crate) fn parse_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<T>() {
        rows.push(record?);
    }

    Ok(rows)
}

/// Status dictionary row; the store resolves codes to id sets for the engine.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusRow {
    pub(crate) status_id: i64,
    pub(crate) status_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusGroup {
    Approved,
    Pending,
    Rejected,
}

impl StatusRow {
    pub(crate) fn group(&self) -> Option<StatusGroup> {
        match self.status_code.trim().to_ascii_lowercase().as_str() {
            "approved" => Some(StatusGroup::Approved),
            "pending" | "submitted" | "under_review" | "dept_head_review" => {
                Some(StatusGroup::Pending)
            }
            "rejected" | "denied" => Some(StatusGroup::Rejected),
            _ => None,
        }
    }
}
