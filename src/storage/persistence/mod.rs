//! Collection backend implementations.

mod memory;
mod postgresql;

pub use memory::{MemoryCollection, MemoryConnector};
pub use postgresql::{PostgresCollection, PostgresConnector};
