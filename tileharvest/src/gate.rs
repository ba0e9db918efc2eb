//! Admission gate bounding the number of tile fetches in flight.
//!
//! Wraps a Tokio semaphore. A slot is held as an owned [`GatePermit`] that is
//! released when dropped, so every exit path of a fetch (success, failure,
//! panic) frees its slot.
//!
//! ```ignore
//! use std::sync::Arc;
//! use tileharvest::gate::ConcurrencyGate;
//!
//! let gate = Arc::new(ConcurrencyGate::new(200));
//! let permit = gate.acquire().await;
//! tokio::spawn(async move {
//!     let _permit = permit;
//!     // fetch happens here...
//! });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Default gate capacity.
pub const DEFAULT_CONCURRENCY: usize = 200;

/// Upper bound accepted from configuration.
pub const MAX_CONCURRENCY: usize = 1000;

#[derive(Debug, Default)]
struct GateCounters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl GateCounters {
    fn admit(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
    }
}

/// Counting admission gate with a fixed capacity.
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    counters: Arc<GateCounters>,
}

impl ConcurrencyGate {
    /// Creates a gate admitting at most `capacity` holders at once.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::new(GateCounters::default()),
        }
    }

    /// Waits for a free slot and takes it.
    pub async fn acquire(&self) -> GatePermit {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("gate semaphore is never closed");
        self.admitted(permit)
    }

    /// Waits for a free slot unless `token` is cancelled first.
    ///
    /// Returns `None` once cancelled; no slot is held in that case.
    pub async fn acquire_or_cancel(&self, token: &CancellationToken) -> Option<GatePermit> {
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            permit = self.acquire() => Some(permit),
        }
    }

    /// Takes a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<GatePermit> {
        let permit = Arc::clone(&self.semaphore).try_acquire_owned().ok()?;
        Some(self.admitted(permit))
    }

    fn admitted(&self, permit: OwnedSemaphorePermit) -> GatePermit {
        self.counters.admit();
        GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        }
    }

    /// Maximum number of simultaneous holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of slots held at the same time since creation.
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Free slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// One held gate slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
