//! Logging infrastructure for TileHarvest.
//!
//! Provides structured logging with file output and console output:
//! - Writes to the configured log file (cleared on session start)
//! - Optionally prints to stdout for interactive runs
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file and
/// installs a global subscriber writing to the file and, when
/// `stdout_enabled`, to stdout.
///
/// # Arguments
///
/// * `log_file` - Full path of the log file
/// * `stdout_enabled` - Also print events to stdout
/// * `debug` - Default to `debug` level instead of `info` when RUST_LOG is unset
///
/// # Returns
///
/// LoggingGuard that must be kept alive for logging to work
///
/// # Errors
///
/// Returns error if the log file cannot be prepared or a global subscriber
/// is already installed.
pub fn init_logging(
    log_file: &Path,
    stdout_enabled: bool,
    debug: bool,
) -> Result<LoggingGuard, io::Error> {
    let (log_dir, file_name) = prepare_log_file(log_file)?;

    // Create file appender with non-blocking writer
    let file_appender = tracing_appender::rolling::never(&log_dir, &file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false) // No ANSI colors in file
        .with_target(true);

    let stdout_layer = stdout_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .with_target(false)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Creates the parent directory and truncates the file.
///
/// Returns the directory and file name for the appender.
fn prepare_log_file(log_file: &Path) -> io::Result<(PathBuf, String)> {
    let (log_dir, file_name) = split_log_path(log_file)?;

    fs::create_dir_all(&log_dir)?;
    fs::write(log_file, "")?;

    Ok((log_dir, file_name))
}

/// Splits a log path into directory and file name. A bare file name lives
/// in the current directory.
fn split_log_path(log_file: &Path) -> io::Result<(PathBuf, String)> {
    let file_name = log_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path has no file name: {}", log_file.display()),
            )
        })?;
    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok((log_dir, file_name))
}

fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    "tileharvest.log"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert_eq!(default_log_file(), "tileharvest.log");
        assert_eq!(default_level(false), "info");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let log_file = temp.path().join("deep").join("nested").join("run.log");

        let (dir, name) = prepare_log_file(&log_file).unwrap();

        assert_eq!(dir, temp.path().join("deep").join("nested"));
        assert_eq!(name, "run.log");
        assert!(log_file.exists());
    }

    #[test]
    fn test_prepare_clears_existing_file() {
        let temp = TempDir::new().unwrap();
        let log_file = temp.path().join("run.log");
        fs::write(&log_file, "old log data").unwrap();

        prepare_log_file(&log_file).unwrap();

        assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    }

    #[test]
    fn test_bare_file_name_uses_current_dir() {
        let (dir, name) = split_log_path(Path::new("only.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "only.log");

        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_location_is_an_error() {
        let temp = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        assert!(prepare_log_file(&blocker.join("run.log")).is_err());
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }
}
