//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation
//! to reduce duplication across command handlers.

use crate::error::CliError;
use std::io::IsTerminal;
use tileharvest::config::ConfigFile;
use tileharvest::logging::{init_logging, LoggingGuard};
use tileharvest::service::HarvestService;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines do not
    /// interleave with the progress output.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging unless RUST_LOG is set
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let stdout_enabled = !std::io::stdout().is_terminal();

        let logging_guard = init_logging(&config.logging.file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("TileHarvest v{}", tileharvest::VERSION);
        info!("TileHarvest CLI: {} command", command);
    }

    /// Create the harvest service from the loaded configuration.
    pub fn create_service(&self) -> Result<HarvestService, CliError> {
        HarvestService::from_config(&self.config)
            .map_err(CliError::ServiceCreation)
            .inspect(|_| info!("Service created successfully"))
    }
}
