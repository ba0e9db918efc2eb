//! Single-tile fetch executor.
//!
//! [`TileFetcher::fetch`] turns one tile coordinate into exactly one
//! [`TileOutcome`]:
//!
//! 1. If the artifact already exists, the tile is skipped without touching
//!    the network.
//! 2. Otherwise up to `max_retries + 1` attempts are made, each bounded by
//!    the request timeout, with exponential backoff between them.
//! 3. A 404 ends the tile immediately as not found.
//! 4. Any other error (HTTP status, timeout, transport, failed write) is
//!    retried; after the last attempt the tile is reported as failed.
//!
//! Admission (how many tiles run at once) is the caller's concern; see
//! [`crate::gate::ConcurrencyGate`].

mod outcome;
mod policy;

#[cfg(test)]
pub(crate) mod testing;

pub use outcome::{FetchError, TileOutcome};
pub use policy::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

use crate::coord::TileCoord;
use crate::provider::TileSource;
use crate::store::TileStore;
use std::sync::Arc;
use tracing::{debug, trace};

/// Fetches tiles from a source into a store under a retry policy.
pub struct TileFetcher<S, T> {
    source: Arc<S>,
    store: Arc<T>,
    policy: RetryPolicy,
}

impl<S, T> TileFetcher<S, T>
where
    S: TileSource,
    T: TileStore,
{
    pub fn new(source: Arc<S>, store: Arc<T>, policy: RetryPolicy) -> Self {
        Self {
            source,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Fetches one tile and reports what happened. Never fails as a whole.
    pub async fn fetch(&self, tile: TileCoord) -> TileOutcome {
        if self.store.exists(tile).await {
            trace!(tile = %tile, "Tile already present, skipping");
            return TileOutcome::SkippedExisting { tile };
        }

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.policy.backoff_delay(attempt);
                debug!(
                    tile = %tile,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            let error = match tokio::time::timeout(
                self.policy.request_timeout,
                self.source.fetch(tile),
            )
            .await
            {
                Ok(Ok(data)) => match self.store.write(tile, &data).await {
                    Ok(()) => {
                        trace!(tile = %tile, bytes = data.len(), retries = attempt, "Tile stored");
                        return TileOutcome::Success {
                            tile,
                            retries: attempt,
                            bytes: data.len() as u64,
                        };
                    }
                    Err(e) => FetchError::Write(e.to_string()),
                },
                Ok(Err(e)) if e.is_not_found() => {
                    debug!(tile = %tile, "Tile not found on server");
                    return TileOutcome::SkippedNotFound { tile };
                }
                Ok(Err(e)) => FetchError::Source(e),
                Err(_) => FetchError::Timeout(self.policy.request_timeout),
            };

            debug!(tile = %tile, attempt, error = %error, "Tile attempt failed");

            if attempt >= self.policy.max_retries {
                return TileOutcome::Failed {
                    tile,
                    attempts: attempt + 1,
                    error,
                };
            }
            attempt += 1;
        }
    }
}
