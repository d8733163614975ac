//! Business logic services.
//!
//! [`RecordStore`] runs the CRUD operations on top of the shared connection;
//! [`query`] post-processes listed records on the client side.

pub mod query;
mod record_store;

pub use query::{SortKey, SortOrder, VaultStats, search, sort_records};
pub use record_store::RecordStore;
