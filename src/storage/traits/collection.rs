//! Collection handle trait.

use crate::Result;
use crate::models::{Record, RecordId};
use std::future::Future;

/// Outcome of an `update_one` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// Number of documents matched by the id filter (0 or 1).
    pub matched: u64,
    /// Number of documents whose fields actually changed (0 or 1).
    pub modified: u64,
}

impl UpdateOutcome {
    /// Returns `true` if a document was modified.
    ///
    /// A matched document whose fields already held the new values is not
    /// counted as modified.
    #[must_use]
    pub const fn was_modified(&self) -> bool {
        self.modified > 0
    }
}

/// Outcome of a `delete_one` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// Number of documents removed (0 or 1).
    pub deleted: u64,
}

impl DeleteOutcome {
    /// Returns `true` if exactly one document was removed.
    #[must_use]
    pub const fn was_deleted(&self) -> bool {
        self.deleted == 1
    }
}

/// A handle to the record collection on a live connection.
///
/// Handles are cheap to clone; clones share the underlying connection.
pub trait Collection: Clone + Send + Sync + 'static {
    /// Inserts one complete record document.
    fn insert_one(&self, record: &Record) -> impl Future<Output = Result<()>> + Send;

    /// Returns every document in natural retrieval order.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Overwrites `name` and `value` of the first document with the given id.
    fn update_one(
        &self,
        id: RecordId,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<UpdateOutcome>> + Send;

    /// Removes the first document with the given id.
    fn delete_one(&self, id: RecordId) -> impl Future<Output = Result<DeleteOutcome>> + Send;

    /// Returns `false` once the underlying connection has closed.
    ///
    /// Must not touch the network.
    fn is_alive(&self) -> bool {
        true
    }
}
