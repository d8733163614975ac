//! Storage layer abstraction.
//!
//! This module provides the connection lifecycle and the collection backends:
//! - **Traits**: [`Connector`] opens a connection, [`Collection`] runs CRUD on it
//! - **Connection**: [`ConnectionManager`] establishes one connection lazily and caches it
//! - **Resilience**: [`RetryPolicy`] bounds connect attempts, backoff and per-attempt timeouts
//! - **Persistence**: PostgreSQL JSONB documents and an in-memory collection

// Allow cast precision loss for backoff calculations where exact precision is not critical.
#![allow(clippy::cast_precision_loss)]
// Allow significant_drop_tightening - the connection cache guard is held for the whole
// establish sequence on purpose.
#![allow(clippy::significant_drop_tightening)]

pub mod connection;
pub mod persistence;
pub mod resilience;
pub mod traits;

pub use connection::{ConnectionManager, ConnectionState};
pub use persistence::{MemoryCollection, MemoryConnector, PostgresCollection, PostgresConnector};
pub use resilience::RetryPolicy;
pub use traits::{Collection, Connector, DeleteOutcome, UpdateOutcome};
