//! Data models for recvault.

mod record;

pub use record::{IdGenerator, Record, RecordId};
