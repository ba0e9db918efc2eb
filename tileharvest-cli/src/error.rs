//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tileharvest::config::{config_file_path, ConfigFileError};
use tileharvest::region::RegionError;
use tileharvest::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Unknown region or unusable zoom range
    Region(RegionError),
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// Failed to start or finish a run
    Run(ServiceError),
    /// Failed to read the tile store
    Stats(ServiceError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Run(ServiceError::RunAlreadyActive { .. }) => {
                eprintln!();
                eprintln!("Wait for the current download to finish, then try again.");
            }
            CliError::Region(RegionError::Unknown { .. })
            | CliError::Run(ServiceError::Region(RegionError::Unknown { .. })) => {
                eprintln!();
                eprintln!("Run 'tileharvest regions' to list known regions, or add one");
                eprintln!("under [regions] in {}", config_file_path().display());
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Config file: {}", config_file_path().display());
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Region(e) => write!(f, "{}", e),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Run(e) => write!(f, "Download failed: {}", e),
            CliError::Stats(e) => write!(f, "Failed to read tile store: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Region(e) => Some(e),
            CliError::ServiceCreation(e) => Some(e),
            CliError::Run(e) => Some(e),
            CliError::Stats(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Run(e)
    }
}

impl From<RegionError> for CliError {
    fn from(e: RegionError) -> Self {
        CliError::Region(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
