//! Storage backend traits.

mod collection;
mod connector;

pub use collection::{Collection, DeleteOutcome, UpdateOutcome};
pub use connector::Connector;
