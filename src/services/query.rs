//! Client-side search, ordering and statistics over listed records.

use crate::models::Record;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Returns the records whose name contains `keyword` (case-insensitive) or
/// whose decimal id contains it.
///
/// Input order is preserved.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the keyword is blank.
pub fn search<'a>(records: &'a [Record], keyword: &str) -> Result<Vec<&'a Record>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::InvalidInput(
            "search keyword cannot be empty".to_string(),
        ));
    }

    let needle = keyword.to_lowercase();
    Ok(records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle) || r.id.to_string().contains(keyword))
        .collect())
}

/// Field to order records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Record id (creation order for ids from one process).
    #[default]
    Id,
    /// Record name, case-insensitive.
    Name,
    /// Creation timestamp.
    Created,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "created" | "created_at" | "createdat" | "date" => Ok(Self::Created),
            other => Err(Error::InvalidInput(format!(
                "unknown sort key '{other}' (expected id, name or created)"
            ))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(Error::InvalidInput(format!(
                "unknown sort order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// Sorts records in place. The sort is stable.
pub fn sort_records(records: &mut [Record], key: SortKey, order: SortOrder) {
    let compare = |a: &Record, b: &Record| -> Ordering {
        match key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Created => a.created_at.cmp(&b.created_at),
        }
    };

    match order {
        SortOrder::Ascending => records.sort_by(compare),
        SortOrder::Descending => records.sort_by(|a, b| compare(b, a)),
    }
}

/// Aggregate figures over a set of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VaultStats {
    /// Number of records.
    pub count: usize,
    /// Oldest creation timestamp.
    pub earliest: Option<DateTime<Utc>>,
    /// Newest creation timestamp.
    pub latest: Option<DateTime<Utc>>,
    /// Mean value length in characters.
    pub average_value_len: f64,
    /// Longest value length in characters.
    pub longest_value_len: usize,
    /// Name of the record with the longest name (first on ties).
    pub longest_name: Option<String>,
}

impl VaultStats {
    /// Computes statistics for the given records.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(records: &[Record]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let value_lens: Vec<usize> = records.iter().map(|r| r.value.chars().count()).collect();
        let total: usize = value_lens.iter().sum();

        let longest_name = records
            .iter()
            .fold(None::<&Record>, |best, r| match best {
                Some(b) if b.name.chars().count() >= r.name.chars().count() => Some(b),
                _ => Some(r),
            })
            .map(|r| r.name.clone());

        Self {
            count: records.len(),
            earliest: records.iter().map(|r| r.created_at).min(),
            latest: records.iter().map(|r| r.created_at).max(),
            average_value_len: total as f64 / records.len() as f64,
            longest_value_len: value_lens.iter().copied().max().unwrap_or(0),
            longest_name,
        }
    }
}
