//! Connector trait.

use super::Collection;
use crate::Result;
use std::future::Future;

/// Opens connections to a record collection.
///
/// A connector performs a single connect attempt per call. Retrying and
/// caching belong to [`crate::storage::ConnectionManager`].
pub trait Connector: Send + Sync {
    /// The collection handle produced by a successful connect.
    type Collection: Collection;

    /// Opens a connection and returns a handle to the record collection.
    fn connect(&self) -> impl Future<Output = Result<Self::Collection>> + Send;

    /// Returns a short, credential-free description of the target for logs.
    fn describe(&self) -> String;
}
