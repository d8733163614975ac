//! In-memory collection backend.
//!
//! Keeps records in a shared `Vec` in insertion order. Every connection
//! opened by one [`MemoryConnector`] (and its clones) sees the same
//! documents, which makes it a drop-in stand-in for a remote collection in
//! tests and for `--backend memory` sessions.

use crate::{Error, Result};
use crate::models::{Record, RecordId};
use crate::storage::traits::{Collection, Connector, DeleteOutcome, UpdateOutcome};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Documents = Arc<Mutex<Vec<Record>>>;

/// Acquires the documents lock, recovering from poisoning.
fn acquire_lock(documents: &Mutex<Vec<Record>>) -> MutexGuard<'_, Vec<Record>> {
    match documents.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("In-memory collection mutex was poisoned, recovering");
            poisoned.into_inner()
        },
    }
}

/// Connector for the in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    documents: Documents,
    connects: Arc<AtomicUsize>,
    connect_delay: Option<Duration>,
}

impl MemoryConnector {
    /// Creates a connector over an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector over a pre-populated collection.
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            documents: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Delays every connect call, simulating a slow server.
    #[must_use]
    pub const fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Returns how many times `connect` has been called.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    type Collection = MemoryCollection;

    async fn connect(&self) -> Result<MemoryCollection> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(MemoryCollection {
            documents: Arc::clone(&self.documents),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Handle to the in-memory collection.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    documents: Documents,
    /// Shared by clones of one handle; each connect gets a fresh flag.
    closed: Arc<AtomicBool>,
}

impl MemoryCollection {
    /// Closes this connection, as a server restart would.
    ///
    /// Documents survive; later calls on this handle (and its clones) fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::OperationFailed {
                operation: "memory_collection".to_string(),
                cause: "connection closed".to_string(),
            });
        }
        Ok(())
    }
}

impl Collection for MemoryCollection {
    async fn insert_one(&self, record: &Record) -> Result<()> {
        self.check_open()?;
        acquire_lock(&self.documents).push(record.clone());
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        self.check_open()?;
        Ok(acquire_lock(&self.documents).clone())
    }

    async fn update_one(&self, id: RecordId, name: &str, value: &str) -> Result<UpdateOutcome> {
        self.check_open()?;
        let mut documents = acquire_lock(&self.documents);
        let Some(record) = documents.iter_mut().find(|r| r.id == id) else {
            return Ok(UpdateOutcome::default());
        };

        if record.name == name && record.value == value {
            return Ok(UpdateOutcome {
                matched: 1,
                modified: 0,
            });
        }

        record.name = name.to_string();
        record.value = value.to_string();
        Ok(UpdateOutcome {
            matched: 1,
            modified: 1,
        })
    }

    async fn delete_one(&self, id: RecordId) -> Result<DeleteOutcome> {
        self.check_open()?;
        let mut documents = acquire_lock(&self.documents);
        let deleted = documents
            .iter()
            .position(|r| r.id == id)
            .map(|index| documents.remove(index))
            .map_or(0, |_| 1);
        Ok(DeleteOutcome { deleted })
    }

    fn is_alive(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}
