//! Connection establishment with a scripted, flaky connector.
//!
//! Runs on tokio's paused clock so backoff sleeps and attempt timeouts
//! complete instantly while still being measured.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use recvault::services::RecordStore;
use recvault::storage::{
    ConnectionManager, ConnectionState, Connector, MemoryCollection, MemoryConnector, RetryPolicy,
};
use recvault::{Error, Result, current_timestamp_millis};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Fails the first `failures` connect calls, then delegates to memory.
#[derive(Clone)]
struct FlakyConnector {
    failures: u32,
    calls: Arc<AtomicU32>,
    /// Wall-clock millis of the last successful connect.
    connected_at: Arc<AtomicI64>,
    hang: bool,
    inner: MemoryConnector,
}

impl FlakyConnector {
    fn failing(failures: u32) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicU32::new(0)),
            connected_at: Arc::new(AtomicI64::new(0)),
            hang: false,
            inner: MemoryConnector::new(),
        }
    }

    /// Failing calls hang instead of erroring.
    fn hanging(failures: u32) -> Self {
        Self {
            hang: true,
            ..Self::failing(failures)
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn connected_at(&self) -> i64 {
        self.connected_at.load(Ordering::SeqCst)
    }
}

impl Connector for FlakyConnector {
    type Collection = MemoryCollection;

    async fn connect(&self) -> Result<MemoryCollection> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            return Err(Error::OperationFailed {
                operation: "connect".to_string(),
                cause: format!("connection refused (call {call})"),
            });
        }
        let collection = self.inner.connect().await?;
        self.connected_at
            .store(current_timestamp_millis(), Ordering::SeqCst);
        Ok(collection)
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

/// Asserts the paused clock moved by `secs` (allowing timer rounding).
fn assert_elapsed(start: Instant, secs: u64) {
    let elapsed = start.elapsed();
    let expected = Duration::from_secs(secs);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "elapsed {elapsed:?}, expected about {expected:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_on_third_attempt_after_two_backoffs() {
    let connector = FlakyConnector::failing(2);
    let manager = ConnectionManager::new(connector.clone(), RetryPolicy::default());
    let start = Instant::now();

    manager.ensure_connected().await.unwrap();

    assert_eq!(connector.calls(), 3);
    assert_eq!(manager.attempts(), 3);
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_elapsed(start, 4);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_attempts() {
    let connector = FlakyConnector::failing(u32::MAX);
    let manager = ConnectionManager::new(connector.clone(), RetryPolicy::default());

    let err = manager.ensure_connected().await.unwrap_err();

    match err {
        Error::Connection { attempts, cause } => {
            assert_eq!(attempts, 3);
            assert_eq!(cause, "connection refused (call 3)");
        },
        other => panic!("expected connection error, got {other:?}"),
    }
    assert_eq!(connector.calls(), 3);
    assert_eq!(manager.state(), ConnectionState::Unconnected);
}

#[tokio::test(start_paused = true)]
async fn test_failed_sequence_is_retried_from_scratch() {
    let connector = FlakyConnector::failing(3);
    let manager = ConnectionManager::new(connector.clone(), RetryPolicy::default());

    assert!(manager.ensure_connected().await.unwrap_err().is_connection());
    assert_eq!(manager.state(), ConnectionState::Unconnected);

    manager.ensure_connected().await.unwrap();
    assert_eq!(connector.calls(), 4);
    assert_eq!(manager.state(), ConnectionState::Connected);

    manager.ensure_connected().await.unwrap();
    assert_eq!(connector.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_attempts_are_cut_by_timeout() {
    let connector = FlakyConnector::hanging(2);
    let manager = ConnectionManager::new(connector.clone(), RetryPolicy::default());
    let start = Instant::now();

    manager.ensure_connected().await.unwrap();

    // Two 10s timeouts plus two 2s backoffs.
    assert_elapsed(start, 24);
    assert_eq!(connector.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_policy_spacing() {
    let connector = FlakyConnector::failing(3);
    let policy = RetryPolicy::default()
        .with_max_attempts(4)
        .with_backoff_ms(1_000)
        .with_backoff_multiplier(2.0);
    let manager = ConnectionManager::new(connector.clone(), policy);
    let start = Instant::now();

    manager.ensure_connected().await.unwrap();

    // 1s + 2s + 4s
    assert_elapsed(start, 7);
    assert_eq!(connector.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_store_surfaces_connection_error_and_recovers() {
    let connector = FlakyConnector::failing(3);
    let store = RecordStore::new(ConnectionManager::new(
        connector.clone(),
        RetryPolicy::default(),
    ));

    let err = store.add_record("a", "1").await.unwrap_err();
    assert!(err.is_connection());
    assert!(store.list_records().await.unwrap().is_empty());

    store.add_record("a", "1").await.unwrap();
    assert_eq!(store.list_records().await.unwrap().len(), 1);
    assert_eq!(connector.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_sequence() {
    let connector = FlakyConnector::failing(1);
    let manager = Arc::new(ConnectionManager::new(
        connector.clone(),
        RetryPolicy::default(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.ensure_connected().await.map(|_| ()) })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(connector.calls(), 2);
    assert_eq!(manager.attempts(), 2);
}

// Real clock: record ids and timestamps come from wall time.
#[tokio::test]
async fn test_record_is_stamped_after_connect_succeeds() {
    let connector = FlakyConnector::failing(2);
    let store = RecordStore::new(ConnectionManager::new(
        connector.clone(),
        RetryPolicy::default().with_backoff_ms(150),
    ));

    let record = store.add_record("a", "1").await.unwrap();

    let connected_at = connector.connected_at();
    assert!(connected_at > 0);
    assert!(
        record.id.as_i64() >= connected_at,
        "id {} stamped before connect at {connected_at}",
        record.id
    );
    assert!(record.created_at.timestamp_millis() >= connected_at);
}

#[tokio::test]
async fn test_store_reconnects_after_cached_connection_closes() {
    let inner = MemoryConnector::new();
    let store = RecordStore::new(ConnectionManager::new(
        inner.clone(),
        RetryPolicy::default(),
    ));
    store.add_record("a", "1").await.unwrap();

    // Simulate the server dropping the session under the cached handle.
    store.manager().ensure_connected().await.unwrap().close();

    let records = store.list_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(inner.connect_count(), 2);
    assert_eq!(store.manager().state(), ConnectionState::Connected);
}
