//! Record types and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Unique identifier for a record.
///
/// A millisecond Unix timestamp taken at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Creates a record ID from its raw value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for RecordId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| crate::Error::InvalidInput(format!("not a record id: '{s}'")))
    }
}

/// A stored record.
///
/// Serialized as the document `{ id, name, value, createdAt }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier, immutable.
    pub id: RecordId,
    /// Record name.
    pub name: String,
    /// Record value. Any string content.
    pub value: String,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Creates a record from its parts.
    #[must_use]
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        value: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            value: value.into(),
            created_at,
        }
    }
}

/// Generates record IDs from the wall clock.
///
/// IDs are millisecond timestamps, bumped past the previously issued ID
/// when two records are created within the same millisecond. IDs issued by
/// one generator are strictly increasing; separate processes can still
/// collide.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Returns the next record ID.
    pub fn next_id(&self) -> RecordId {
        self.next_at(crate::current_timestamp_millis())
    }

    fn next_at(&self, now_millis: i64) -> RecordId {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return RecordId(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}
