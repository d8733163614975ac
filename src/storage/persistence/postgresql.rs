//! PostgreSQL-based collection backend.
//!
//! Stores each record as one JSONB document in a single-column table:
//!
//! ```text
//! CREATE TABLE IF NOT EXISTS records (doc JSONB NOT NULL)
//! ```
//!
//! The table is created on first successful connect, the way a document
//! database creates a collection on first use. No further schema or indexes
//! are managed.

use crate::models::{Record, RecordId};
use crate::storage::traits::{Collection, Connector, DeleteOutcome, UpdateOutcome};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::{Client, NoTls};

/// Default driver-level connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest identifier PostgreSQL accepts without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Helper to map connect errors.
fn connect_error(e: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: "postgres_connect".to_string(),
        cause: e.to_string(),
    }
}

/// Helper to map query errors.
fn query_error(op: &str, e: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: op.to_string(),
        cause: e.to_string(),
    }
}

/// Validates a collection name for use as an unquoted table identifier.
fn validate_collection_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "collection name '{name}' must match [A-Za-z_][A-Za-z0-9_]* and be at most {MAX_IDENTIFIER_LEN} characters"
        )))
    }
}

/// Connector for a PostgreSQL-backed collection.
#[derive(Clone)]
pub struct PostgresConnector {
    config: tokio_postgres::Config,
    collection: String,
}

impl std::fmt::Debug for PostgresConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConnector")
            .field("target", &self.describe())
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl PostgresConnector {
    /// Creates a connector from a connection URL and collection name.
    ///
    /// No network call is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or the collection name
    /// is not a valid identifier.
    pub fn new(connection_url: &str, collection: impl Into<String>) -> Result<Self> {
        let collection = collection.into();
        validate_collection_name(&collection)?;

        let mut config = connection_url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| Error::InvalidInput(format!("invalid database url: {e}")))?;
        config.connect_timeout(DEFAULT_CONNECT_TIMEOUT);

        Ok(Self { config, collection })
    }

    /// Sets the driver-level connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout(timeout);
        self
    }

    /// Returns the collection (table) name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Extracts host string from tokio-postgres Host.
    #[cfg(unix)]
    fn host_to_string(h: &tokio_postgres::config::Host) -> String {
        match h {
            tokio_postgres::config::Host::Tcp(s) => s.clone(),
            tokio_postgres::config::Host::Unix(p) => p.to_string_lossy().to_string(),
        }
    }

    /// Extracts host string from tokio-postgres Host (Windows: Tcp only).
    #[cfg(not(unix))]
    fn host_to_string(h: &tokio_postgres::config::Host) -> String {
        let tokio_postgres::config::Host::Tcp(s) = h;
        s.clone()
    }
}

impl Connector for PostgresConnector {
    type Collection = PostgresCollection;

    async fn connect(&self) -> Result<PostgresCollection> {
        let (client, connection) = self.config.connect(NoTls).await.map_err(connect_error)?;

        // The connection object drives the socket; it must be polled for the
        // client to make progress.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        let collection = PostgresCollection {
            client: Arc::new(client),
            table: Arc::from(self.collection.as_str()),
        };
        collection.ensure_table().await?;
        Ok(collection)
    }

    fn describe(&self) -> String {
        let host = self
            .config
            .get_hosts()
            .first()
            .map_or_else(|| "localhost".to_string(), Self::host_to_string);
        let port = self.config.get_ports().first().copied().unwrap_or(5432);
        let dbname = self.config.get_dbname().unwrap_or("postgres");
        format!("postgres://{host}:{port}/{dbname}/{}", self.collection)
    }
}

/// Handle to a PostgreSQL-backed collection on a live connection.
#[derive(Clone)]
pub struct PostgresCollection {
    client: Arc<Client>,
    table: Arc<str>,
}

impl std::fmt::Debug for PostgresCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCollection")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl PostgresCollection {
    /// Creates the collection table if it does not exist.
    async fn ensure_table(&self) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (doc JSONB NOT NULL)",
            self.table
        );
        self.client
            .batch_execute(&ddl)
            .await
            .map_err(|e| query_error("postgres_create_collection", e))
    }

    fn row_to_record(row: &tokio_postgres::Row) -> Result<Record> {
        let doc: serde_json::Value = row
            .try_get(0)
            .map_err(|e| query_error("postgres_read_document", e))?;
        serde_json::from_value(doc).map_err(|e| query_error("postgres_decode_document", e))
    }
}

impl Collection for PostgresCollection {
    async fn insert_one(&self, record: &Record) -> Result<()> {
        let doc = serde_json::to_value(record)
            .map_err(|e| query_error("postgres_encode_document", e))?;
        let insert = format!("INSERT INTO {} (doc) VALUES ($1)", self.table);

        self.client
            .execute(&insert, &[&doc])
            .await
            .map_err(|e| query_error("postgres_insert_one", e))?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        let query = format!("SELECT doc FROM {}", self.table);
        let rows = self
            .client
            .query(&query, &[])
            .await
            .map_err(|e| query_error("postgres_find_all", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn update_one(&self, id: RecordId, name: &str, value: &str) -> Result<UpdateOutcome> {
        // Matches at most one document; reports a modification only when a
        // field value actually changes.
        let update = format!(
            r"WITH target AS (
                SELECT ctid FROM {table} WHERE doc->'id' = to_jsonb($1::bigint) LIMIT 1
            ), updated AS (
                UPDATE {table}
                SET doc = {table}.doc || jsonb_build_object('name', $2::text, 'value', $3::text)
                FROM target
                WHERE {table}.ctid = target.ctid
                  AND ({table}.doc->>'name' IS DISTINCT FROM $2::text
                       OR {table}.doc->>'value' IS DISTINCT FROM $3::text)
                RETURNING 1
            )
            SELECT (SELECT count(*) FROM target), (SELECT count(*) FROM updated)",
            table = self.table
        );

        let row = self
            .client
            .query_one(&update, &[&id.as_i64(), &name, &value])
            .await
            .map_err(|e| query_error("postgres_update_one", e))?;

        let matched: i64 = row
            .try_get(0)
            .map_err(|e| query_error("postgres_update_one", e))?;
        let modified: i64 = row
            .try_get(1)
            .map_err(|e| query_error("postgres_update_one", e))?;

        Ok(UpdateOutcome {
            matched: u64::try_from(matched).unwrap_or(0),
            modified: u64::try_from(modified).unwrap_or(0),
        })
    }

    async fn delete_one(&self, id: RecordId) -> Result<DeleteOutcome> {
        let delete = format!(
            "DELETE FROM {table} WHERE ctid = (
                SELECT ctid FROM {table} WHERE doc->'id' = to_jsonb($1::bigint) LIMIT 1
            )",
            table = self.table
        );

        let deleted = self
            .client
            .execute(&delete, &[&id.as_i64()])
            .await
            .map_err(|e| query_error("postgres_delete_one", e))?;
        Ok(DeleteOutcome { deleted })
    }

    fn is_alive(&self) -> bool {
        !self.client.is_closed()
    }
}
