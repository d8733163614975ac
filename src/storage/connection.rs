//! Lazily-established, retried database connection.
//!
//! [`ConnectionManager`] owns exactly one connection for the lifetime of the
//! process. The first operation that needs it runs the establish sequence;
//! every later call gets the cached collection handle back without touching
//! the network.
//!
//! # States
//!
//! ```text
//! +-------------+   ensure_connected()   +------------+   connect ok   +-----------+
//! | Unconnected | ---------------------> | Connecting | -------------> | Connected |
//! +-------------+                        +------------+                +-----------+
//!        ^    ^                                |                             |
//!        |    |   retry budget exhausted       |                             |
//!        |    +--------------------------------+                             |
//!        |                    cached handle found dead                       |
//!        +-------------------------------------------------------------------+
//! ```
//!
//! Only a handle that passed `connect()` is ever cached, so a failed
//! sequence always leaves the manager retryable. A cached handle whose
//! connection has closed is discarded on the next call and a fresh
//! sequence runs.

use super::resilience::RetryPolicy;
use super::traits::{Collection, Connector};
use crate::{Error, Result};
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use tokio::sync::Mutex;

/// Lifecycle state of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been established (or the last sequence failed).
    Unconnected,
    /// An establish sequence is in progress.
    Connecting,
    /// A live connection is cached.
    Connected,
}

impl ConnectionState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Unconnected => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Unconnected,
        }
    }

    /// Returns the state as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unconnected => "unconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the single database connection and its retry policy.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    policy: RetryPolicy,
    /// Cached collection handle. Held across the whole establish sequence so
    /// concurrent callers never run two sequences at once.
    cached: Mutex<Option<C::Collection>>,
    state: AtomicU8,
    attempts: AtomicU32,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates an unconnected manager. No network call is made.
    #[must_use]
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        Self {
            connector,
            policy,
            cached: Mutex::new(None),
            state: AtomicU8::new(ConnectionState::Unconnected.as_u8()),
            attempts: AtomicU32::new(0),
        }
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns the total number of connect attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Returns the retry policy.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the connector.
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Ensures a live connection exists and returns its collection handle.
    ///
    /// Returns the cached handle immediately when already connected and the
    /// handle is still alive; a closed handle is discarded first. Otherwise makes up to `max_attempts` connect attempts, each bounded by
    /// the attempt timeout, sleeping the backoff delay between them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] carrying the last failure's message when
    /// every attempt fails.
    pub async fn ensure_connected(&self) -> Result<C::Collection> {
        let mut cached = self.cached.lock().await;
        if cached.as_ref().is_some_and(|collection| !collection.is_alive()) {
            tracing::warn!(
                backend = %self.connector.describe(),
                "Cached connection is closed, reconnecting"
            );
            *cached = None;
            self.set_state(ConnectionState::Unconnected);
        }
        if let Some(collection) = cached.as_ref() {
            return Ok(collection.clone());
        }

        // Resets to `Unconnected` if this future is dropped mid-sequence.
        let connecting = ConnectingGuard::enter(&self.state);
        let collection = self.establish().await?;
        *cached = Some(collection.clone());
        connecting.finish();
        Ok(collection)
    }

    async fn establish(&self) -> Result<C::Collection> {
        let max_attempts = self.policy.attempts();
        let target = self.connector.describe();
        let mut last_cause = String::new();

        for attempt in 1..=max_attempts {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("recvault_connect_attempts_total").increment(1);

            match self.attempt_connect().await {
                Ok(collection) => {
                    tracing::info!(backend = %target, attempt, "Connected to database");
                    return Ok(collection);
                },
                Err(e) => {
                    metrics::counter!("recvault_connect_failures_total").increment(1);
                    let remaining = max_attempts - attempt;
                    tracing::warn!(
                        backend = %target,
                        attempt,
                        remaining,
                        error = %e,
                        "Connection attempt failed"
                    );
                    last_cause = underlying_cause(e);

                    if remaining > 0 {
                        let delay = self.policy.delay_after(attempt);
                        tracing::debug!(delay = ?delay, "Backing off before retry");
                        tokio::time::sleep(delay).await;
                    }
                },
            }
        }

        tracing::error!(
            backend = %target,
            attempts = max_attempts,
            cause = %last_cause,
            "Giving up on database connection"
        );
        Err(Error::Connection {
            attempts: max_attempts,
            cause: last_cause,
        })
    }

    async fn attempt_connect(&self) -> Result<C::Collection> {
        let timeout = self.policy.attempt_timeout();
        tokio::time::timeout(timeout, self.connector.connect())
            .await
            .unwrap_or_else(|_| {
                Err(Error::OperationFailed {
                    operation: "connect".to_string(),
                    cause: format!("timed out after {}ms", timeout.as_millis()),
                })
            })
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// Holds the `Connecting` state for the duration of an establish sequence.
///
/// Dropping the guard without [`ConnectingGuard::finish`] (failure or
/// cancellation) sets the state back to `Unconnected`.
struct ConnectingGuard<'a> {
    state: &'a AtomicU8,
    connected: bool,
}

impl<'a> ConnectingGuard<'a> {
    fn enter(state: &'a AtomicU8) -> Self {
        state.store(ConnectionState::Connecting.as_u8(), Ordering::Release);
        Self {
            state,
            connected: false,
        }
    }

    fn finish(mut self) {
        self.connected = true;
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        let state = if self.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Unconnected
        };
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// Extracts the driver-level message from a connect error.
fn underlying_cause(error: Error) -> String {
    match error {
        Error::OperationFailed { cause, .. } | Error::Connection { cause, .. } => cause,
        Error::InvalidInput(message) => message,
    }
}
