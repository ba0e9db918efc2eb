//! Configuration management CLI commands.
//!
//! Provides `config init`, `config path` and `config show`.

use clap::Subcommand;
use tileharvest::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Create the configuration file with default values if it doesn't exist
    Init,

    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file values over defaults)
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init => run_init(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
    }
}

/// Create the config file.
fn run_init() -> Result<(), CliError> {
    let existed = config_file_path().exists();
    let path = ConfigFile::ensure_exists()?;

    if existed {
        println!("Configuration file already exists: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }

    Ok(())
}

/// Print the config file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Print every effective setting.
fn run_show() -> Result<(), CliError> {
    let path = config_file_path();
    let config = ConfigFile::load()?;

    if !path.exists() {
        println!("; {} not found, showing defaults", path.display());
        println!();
    }
    for line in show_lines(&config) {
        println!("{}", line);
    }

    Ok(())
}

fn show_lines(config: &ConfigFile) -> Vec<String> {
    let mut lines = vec![
        "[source]".to_string(),
        format!("name = {}", config.source.name),
        format!("url_template = {}", config.source.url_template),
        format!("extension = {}", config.source.extension),
        format!("user_agent = {}", config.source.user_agent),
        String::new(),
        "[storage]".to_string(),
        format!("directory = {}", config.storage.directory.display()),
        String::new(),
        "[download]".to_string(),
        format!("concurrency = {}", config.download.concurrency),
        format!("max_retries = {}", config.download.max_retries),
        format!("retry_delay_ms = {}", config.download.retry_delay_ms),
        format!("timeout = {}", config.download.timeout),
        String::new(),
        "[logging]".to_string(),
        format!("file = {}", config.logging.file.display()),
    ];

    if !config.regions.is_empty() {
        lines.push(String::new());
        lines.push("[regions]".to_string());
        lines.extend(config.regions.iter().map(|region| {
            let b = region.bounds();
            format!(
                "{} = {},{},{},{}",
                region.name(),
                b.south,
                b.west,
                b.north,
                b.east
            )
        }));
    }

    lines
}
