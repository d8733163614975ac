//! # Recvault
//!
//! A personal record vault backed by a remote document collection.
//!
//! Recvault stores small name/value records and exposes create, list,
//! update and delete operations on top of a single lazily-established,
//! retried database connection.
//!
//! ## Features
//!
//! - One shared connection per process, opened on first use
//! - Bounded connect retries with fixed or exponential backoff
//! - Pluggable connectors (PostgreSQL JSONB documents, in-memory)
//! - Search, sort, statistics, JSON/CSV export and backups
//!
//! ## Example
//!
//! ```rust,ignore
//! use recvault::services::RecordStore;
//! use recvault::storage::{ConnectionManager, PostgresConnector, RetryPolicy};
//!
//! let connector = PostgresConnector::new(url, "records")?;
//! let store = RecordStore::new(ConnectionManager::new(connector, RetryPolicy::default()));
//!
//! let record = store.add_record("api-key", "s3cr3t").await?;
//! assert!(store.delete_record(record.id).await?);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::VaultConfig;
pub use models::{Record, RecordId};
pub use services::RecordStore;
pub use storage::{Collection, ConnectionManager, ConnectionState, Connector, RetryPolicy};

/// Error type for recvault operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Connection` | The connect retry budget is exhausted |
/// | `OperationFailed` | A collection call, file write or config read fails |
/// | `InvalidInput` | Malformed ids, unknown formats, blank search keywords |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The database connection could not be established.
    ///
    /// Carries the message of the last failed attempt. The connection
    /// manager is left unconnected, so the next operation starts a fresh
    /// retry sequence.
    #[error("connection failed after {attempts} attempt(s): {cause}")]
    Connection {
        /// Number of connect attempts made.
        attempts: u32,
        /// The last underlying failure.
        cause: String,
    },

    /// An operation failed after a connection was established.
    ///
    /// Raised when:
    /// - An insert, find, update or delete call is rejected by the database
    /// - Export or backup files cannot be written
    /// - The configuration file cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Returns `true` for connection establishment failures.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result type alias for recvault operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "insert_one".to_string(),
            cause: "duplicate".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'insert_one' failed: duplicate");

        let err = Error::Connection {
            attempts: 3,
            cause: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "connection failed after 3 attempt(s): connection refused"
        );
    }

    #[test]
    fn test_is_connection() {
        let err = Error::Connection {
            attempts: 1,
            cause: "timeout".to_string(),
        };
        assert!(err.is_connection());
        assert!(!Error::InvalidInput("x".to_string()).is_connection());
    }

    #[test]
    fn test_current_timestamp_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(current_timestamp_millis() > 1_577_836_800_000);
    }
}
