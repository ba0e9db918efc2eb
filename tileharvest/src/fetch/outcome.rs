//! Per-tile fetch results.

use crate::coord::TileCoord;
use crate::provider::ProviderError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch attempt did not produce a stored tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The tile source reported a failure
    #[error(transparent)]
    Source(#[from] ProviderError),

    /// The attempt exceeded the per-request timeout
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The body arrived but could not be persisted
    #[error("Write failed: {0}")]
    Write(String),

    /// The fetch task ended without reporting (panicked)
    #[error("Fetch task aborted: {0}")]
    Aborted(String),
}

/// Final result of fetching one tile. Produced exactly once per tile per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOutcome {
    /// Fetched and written; `retries` attempts failed before the one that
    /// succeeded.
    Success {
        tile: TileCoord,
        retries: u32,
        bytes: u64,
    },
    /// The artifact was already present; no network call was made.
    SkippedExisting { tile: TileCoord },
    /// The source has no such tile (404). Never retried.
    SkippedNotFound { tile: TileCoord },
    /// Every attempt failed; `error` is the last one seen.
    Failed {
        tile: TileCoord,
        attempts: u32,
        error: FetchError,
    },
}

impl TileOutcome {
    pub fn tile(&self) -> TileCoord {
        match self {
            TileOutcome::Success { tile, .. }
            | TileOutcome::SkippedExisting { tile }
            | TileOutcome::SkippedNotFound { tile }
            | TileOutcome::Failed { tile, .. } => *tile,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TileOutcome::Success { .. })
    }

    /// Both skip kinds count as skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            TileOutcome::SkippedExisting { .. } | TileOutcome::SkippedNotFound { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TileOutcome::Failed { .. })
    }

    /// Retries spent on this tile.
    pub fn retries(&self) -> u32 {
        match self {
            TileOutcome::Success { retries, .. } => *retries,
            TileOutcome::Failed { attempts, .. } => attempts.saturating_sub(1),
            _ => 0,
        }
    }

    /// Bytes written for this tile (0 unless successful).
    pub fn bytes(&self) -> u64 {
        match self {
            TileOutcome::Success { bytes, .. } => *bytes,
            _ => 0,
        }
    }

    /// Short human-readable description used in run logs.
    pub fn detail(&self) -> String {
        match self {
            TileOutcome::Success { retries: 0, .. } => "downloaded".to_string(),
            TileOutcome::Success { retries, .. } => {
                format!("downloaded after {} retries", retries)
            }
            TileOutcome::SkippedExisting { .. } => "already exists".to_string(),
            TileOutcome::SkippedNotFound { .. } => "not found on server".to_string(),
            TileOutcome::Failed {
                attempts, error, ..
            } => format!("failed after {} attempts: {}", attempts, error),
        }
    }
}

impl fmt::Display for TileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tile(), self.detail())
    }
}
