//! Service error types.

use crate::config::ConfigFileError;
use crate::provider::ProviderError;
use crate::region::RegionError;
use crate::run::RunError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A run is already in progress; it was not disturbed
    #[error("A download is already running for region '{region}'")]
    RunAlreadyActive { region: String },

    /// Unknown region or unusable zoom range
    #[error(transparent)]
    Region(#[from] RegionError),

    /// Failed to create the tile source
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Artifact store failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigFileError),

    /// A background run ended abnormally
    #[error("Run task failed: {0}")]
    Task(String),
}

impl From<RunError> for ServiceError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::AlreadyActive { region } => Self::RunAlreadyActive { region },
            RunError::Region(e) => Self::Region(e),
            RunError::Task(msg) => Self::Task(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_errors_map_to_service_errors() {
        let err: ServiceError = RunError::AlreadyActive {
            region: "九州".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::RunAlreadyActive { ref region } if region == "九州"));

        let err: ServiceError = RunError::Region(RegionError::Unknown {
            name: "x".to_string(),
            available: vec!["九州".to_string()],
        })
        .into();
        assert!(err.to_string().contains("Unknown region: 'x'"));
    }
}
