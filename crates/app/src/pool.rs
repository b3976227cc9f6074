//! Bounded pool of hub sessions.
//!
//! The pool holds a fixed number of sessions for one hub endpoint. A borrower
//! waits up to the configured time for a free session; on timeout it gets
//! `None` and the caller reports the hub as unavailable. This is the only
//! admission control in front of the hub.
//!
//! Borrowed sessions come back automatically when the [`PooledConnection`]
//! guard drops, whatever path the caller takes.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use irhub_domain::health::PoolStats;
use irhub_domain::time::{self, Timestamp};

use crate::ports::{ConnectionFactory, HubConnection};

/// Pool sizing and admission settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Number of sessions; minimum and maximum at once.
    pub size: usize,
    /// How long a borrower waits for a free session.
    pub wait: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            size: 1,
            wait: Duration::from_secs(2),
        }
    }
}

/// A pooled session and its bookkeeping.
#[derive(Debug)]
pub struct Slot<C> {
    conn: C,
    instance_id: u64,
    last_active: Option<Timestamp>,
}

struct PoolState<C> {
    slots: Vec<Arc<AsyncMutex<Slot<C>>>>,
    permits: Arc<Semaphore>,
    generation: u64,
}

struct PoolInner<F: ConnectionFactory> {
    factory: F,
    settings: PoolSettings,
    state: Mutex<PoolState<F::Connection>>,
    active: AtomicUsize,
    borrows: AtomicU64,
    instances: AtomicU64,
}

impl<F: ConnectionFactory> PoolInner<F> {
    fn lock(&self) -> MutexGuard<'_, PoolState<F::Connection>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build_slots(&self) -> Vec<Arc<AsyncMutex<Slot<F::Connection>>>> {
        (0..self.settings.size)
            .map(|_| {
                let instance_id = self.instances.fetch_add(1, Ordering::SeqCst) + 1;
                Arc::new(AsyncMutex::new(Slot {
                    conn: self.factory.create(instance_id),
                    instance_id,
                    last_active: None,
                }))
            })
            .collect()
    }
}

/// Pool of hub sessions for one endpoint. Cheap to clone.
pub struct ConnectionPool<F: ConnectionFactory> {
    inner: Arc<PoolInner<F>>,
}

impl<F: ConnectionFactory> Clone for ConnectionPool<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ConnectionFactory> std::fmt::Debug for ConnectionPool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("endpoint", &self.inner.factory.endpoint())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    /// Build a pool and its sessions. Sessions connect lazily on first borrow.
    ///
    /// A size of zero is raised to one.
    pub fn new(factory: F, settings: PoolSettings) -> Self {
        let settings = PoolSettings {
            size: settings.size.max(1),
            ..settings
        };
        let mut inner = PoolInner {
            factory,
            settings,
            state: Mutex::new(PoolState {
                slots: Vec::new(),
                permits: Arc::new(Semaphore::new(settings.size)),
                generation: 0,
            }),
            active: AtomicUsize::new(0),
            borrows: AtomicU64::new(0),
            instances: AtomicU64::new(0),
        };
        let slots = inner.build_slots();
        inner
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .slots = slots;
        Self {
            inner: Arc::new(inner),
        }
    }

    #[must_use]
    pub fn settings(&self) -> PoolSettings {
        self.inner.settings
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        self.inner.factory.endpoint()
    }

    /// Sessions currently borrowed.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            endpoint: self.endpoint(),
            size: self.inner.settings.size,
            active: self.active(),
            borrowed: self.inner.borrows.load(Ordering::SeqCst),
        }
    }

    /// Borrow a session, waiting up to [`PoolSettings::wait`].
    ///
    /// A session that is not connected is reconnected first; a failed
    /// reconnect is logged and the session is handed out anyway, so the
    /// caller's retry policy sees the error on send. Returns `None` on timeout.
    #[tracing::instrument(skip(self), fields(endpoint = %self.inner.factory.endpoint()))]
    pub async fn get_connection(&self) -> Option<PooledConnection<F>> {
        let deadline = Instant::now() + self.inner.settings.wait;
        loop {
            let (permits, generation) = {
                let state = self.inner.lock();
                (Arc::clone(&state.permits), state.generation)
            };
            let permit = match tokio::time::timeout_at(deadline, permits.acquire_owned()).await {
                Ok(Ok(permit)) => permit,
                // closed by a restart, pick up the new semaphore
                Ok(Err(_)) => continue,
                Err(_) => {
                    tracing::warn!(
                        wait_ms = self.inner.settings.wait.as_millis(),
                        "timed out waiting for a hub connection"
                    );
                    return None;
                }
            };

            let guard = {
                let state = self.inner.lock();
                if state.generation != generation {
                    None
                } else {
                    state
                        .slots
                        .iter()
                        .find_map(|slot| Arc::clone(slot).try_lock_owned().ok())
                }
            };
            let Some(mut guard) = guard else {
                drop(permit);
                if Instant::now() >= deadline {
                    return None;
                }
                tokio::task::yield_now().await;
                continue;
            };

            if !guard.conn.is_connected() {
                if let Err(err) = guard.conn.connect().await {
                    tracing::warn!(
                        instance_id = guard.instance_id,
                        error = %err,
                        "failed to reconnect pooled hub connection"
                    );
                }
            }
            let idle_ms = guard
                .last_active
                .map_or(0, |at| time::since(at).num_milliseconds());
            guard.last_active = Some(time::now());

            let transaction_id = self.inner.borrows.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.active.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                instance_id = guard.instance_id,
                transaction_id,
                idle_ms,
                "borrowed hub connection"
            );
            return Some(PooledConnection {
                slot: guard,
                transaction_id,
                generation,
                pool: Arc::clone(&self.inner),
                _permit: permit,
            });
        }
    }

    /// Return a borrowed session. Same as dropping it.
    pub fn release_connection(&self, conn: PooledConnection<F>) {
        drop(conn);
    }

    /// Close every idle session and replace all sessions with fresh ones.
    ///
    /// Sessions borrowed at the time of the restart are closed when they come
    /// back. Until then they still count as active, so `active` may briefly
    /// exceed the pool size.
    #[tracing::instrument(skip(self), fields(endpoint = %self.inner.factory.endpoint()))]
    pub fn restart(&self) {
        let old = {
            let mut state = self.inner.lock();
            state.permits.close();
            state.permits = Arc::new(Semaphore::new(self.inner.settings.size));
            state.generation += 1;
            std::mem::replace(&mut state.slots, self.inner.build_slots())
        };
        let mut closed = 0;
        for slot in old {
            if let Ok(mut slot) = slot.try_lock_owned() {
                slot.conn.close();
                closed += 1;
            }
        }
        tracing::info!(closed, "hub connection pool restarted");
    }
}

/// A borrowed session. Derefs to the connection; returns it on drop.
pub struct PooledConnection<F: ConnectionFactory> {
    slot: OwnedMutexGuard<Slot<F::Connection>>,
    transaction_id: u64,
    generation: u64,
    pool: Arc<PoolInner<F>>,
    // released after the slot is unlocked
    _permit: OwnedSemaphorePermit,
}

impl<F: ConnectionFactory> PooledConnection<F> {
    /// Identifier assigned when the session was created.
    #[must_use]
    pub fn instance_id(&self) -> u64 {
        self.slot.instance_id
    }

    /// Borrow sequence number, unique per pool.
    #[must_use]
    pub fn transaction_id(&self) -> u64 {
        self.transaction_id
    }

    #[must_use]
    pub fn last_active(&self) -> Option<Timestamp> {
        self.slot.last_active
    }
}

impl<F: ConnectionFactory> Deref for PooledConnection<F> {
    type Target = F::Connection;

    fn deref(&self) -> &Self::Target {
        &self.slot.conn
    }
}

impl<F: ConnectionFactory> DerefMut for PooledConnection<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.slot.conn
    }
}

impl<F: ConnectionFactory> Drop for PooledConnection<F> {
    fn drop(&mut self) {
        let stale = self.pool.lock().generation != self.generation;
        if stale {
            self.slot.conn.close();
        }
        self.pool.active.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(
            instance_id = self.slot.instance_id,
            transaction_id = self.transaction_id,
            stale,
            "released hub connection"
        );
    }
}
