//! Record store service.
//!
//! Every operation first makes sure the shared connection is up, then issues
//! exactly one collection call. Failures are never retried here; connection
//! retries live in [`ConnectionManager`].

use crate::models::{IdGenerator, Record, RecordId};
use crate::storage::{Collection, ConnectionManager, Connector};
use crate::{Error, Result};
use chrono::Utc;
use std::future::Future;
use std::time::Instant;

/// CRUD service over the record collection.
pub struct RecordStore<C: Connector> {
    manager: ConnectionManager<C>,
    ids: IdGenerator,
}

impl<C: Connector> RecordStore<C> {
    /// Creates a store on top of an (unconnected) connection manager.
    #[must_use]
    pub const fn new(manager: ConnectionManager<C>) -> Self {
        Self {
            manager,
            ids: IdGenerator::new(),
        }
    }

    /// Returns the connection manager.
    pub const fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    /// Creates a record with a generated id and the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if no connection can be established, or
    /// [`Error::OperationFailed`] if the insert is rejected.
    pub async fn add_record(&self, name: &str, value: &str) -> Result<Record> {
        // Stamped only once the connection is up.
        let record = self
            .with_collection("insert_one", |collection| {
                let record = Record::new(self.ids.next_id(), name, value, Utc::now());
                async move { collection.insert_one(&record).await.map(|()| record) }
            })
            .await?;

        tracing::info!(id = %record.id, name = %record.name, "Record added");
        Ok(record)
    }

    /// Returns every stored record in retrieval order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] or [`Error::OperationFailed`].
    pub async fn list_records(&self) -> Result<Vec<Record>> {
        let records = self
            .with_collection("find_all", |collection| async move {
                collection.find_all().await
            })
            .await?;

        tracing::debug!(count = records.len(), "Records listed");
        Ok(records)
    }

    /// Overwrites the name and value of the record with the given id.
    ///
    /// Returns `false` when no record matched or the record already held
    /// both values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] or [`Error::OperationFailed`].
    pub async fn update_record(&self, id: RecordId, name: &str, value: &str) -> Result<bool> {
        let outcome = self
            .with_collection("update_one", |collection| {
                let (name, value) = (name.to_string(), value.to_string());
                async move { collection.update_one(id, &name, &value).await }
            })
            .await?;

        tracing::info!(
            id = %id,
            matched = outcome.matched,
            modified = outcome.modified,
            "Record update processed"
        );
        Ok(outcome.was_modified())
    }

    /// Removes the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] or [`Error::OperationFailed`].
    pub async fn delete_record(&self, id: RecordId) -> Result<bool> {
        let outcome = self
            .with_collection("delete_one", |collection| async move {
                collection.delete_one(id).await
            })
            .await?;

        tracing::info!(id = %id, deleted = outcome.deleted, "Record delete processed");
        Ok(outcome.was_deleted())
    }

    /// Runs one collection call on the shared connection.
    ///
    /// Connection failures pass through untouched; any other failure is
    /// reported as [`Error::OperationFailed`] tagged with `operation`.
    async fn with_collection<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: FnOnce(C::Collection) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let collection = self.manager.ensure_connected().await?;
        let start = Instant::now();
        let result = call(collection).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "recvault_store_operations_total",
            "operation" => operation,
            "status" => status
        )
        .increment(1);
        metrics::histogram!("recvault_store_operation_duration_ms", "operation" => operation)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        result.map_err(|e| match e {
            e @ (Error::Connection { .. } | Error::OperationFailed { .. }) => e,
            Error::InvalidInput(cause) => Error::OperationFailed {
                operation: operation.to_string(),
                cause,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryConnector, RetryPolicy};

    fn store_with(connector: MemoryConnector) -> RecordStore<MemoryConnector> {
        RecordStore::new(ConnectionManager::new(connector, RetryPolicy::default()))
    }

    #[tokio::test]
    async fn test_add_record_round_trips() {
        let store = store_with(MemoryConnector::new());

        let added = store.add_record("email", "me@example.com").await.unwrap();
        let listed = store.list_records().await.unwrap();

        assert_eq!(listed, vec![added]);
    }

    #[tokio::test]
    async fn test_operations_share_one_connection() {
        let connector = MemoryConnector::new();
        let store = store_with(connector.clone());

        let record = store.add_record("a", "1").await.unwrap();
        store.list_records().await.unwrap();
        store.update_record(record.id, "b", "2").await.unwrap();
        store.delete_record(record.id).await.unwrap();

        assert_eq!(connector.connect_count(), 1);
        assert_eq!(store.manager().attempts(), 1);
    }

    #[tokio::test]
    async fn test_update_identical_values_is_not_a_change() {
        let store = store_with(MemoryConnector::new());
        let record = store.add_record("pin", "1234").await.unwrap();

        assert!(!store.update_record(record.id, "pin", "1234").await.unwrap());
        assert!(store.update_record(record.id, "pin", "4321").await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_unique_within_burst() {
        let store = store_with(MemoryConnector::new());
        let mut ids = Vec::new();
        for i in 0..50 {
            ids.push(store.add_record("n", &i.to_string()).await.unwrap().id);
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[tokio::test]
    async fn test_empty_values_are_accepted() {
        let store = store_with(MemoryConnector::new());
        let record = store.add_record("", "").await.unwrap();
        assert_eq!(record.name, "");
        assert_eq!(store.list_records().await.unwrap().len(), 1);
    }
}
