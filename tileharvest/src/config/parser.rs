//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::clamp_concurrency;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::provider::validate_template;
use crate::region::Region;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = non_empty(section.get("name")) {
            config.source.name = v.to_string();
        }
        if let Some(v) = non_empty(section.get("url_template")) {
            validate_template(v).map_err(|e| invalid("source", "url_template", v, e.to_string()))?;
            config.source.url_template = v.to_string();
        }
        if let Some(v) = non_empty(section.get("extension")) {
            let v = v.trim_start_matches('.');
            if v.is_empty() || !v.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid(
                    "source",
                    "extension",
                    v,
                    "must be alphanumeric, e.g. 'png' or 'jpg'",
                ));
            }
            config.source.extension = v.to_lowercase();
        }
        if let Some(v) = non_empty(section.get("user_agent")) {
            config.source.user_agent = v.to_string();
        }
    }

    // [storage] section
    if let Some(section) = ini.section(Some("storage")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.storage.directory = expand_tilde(v);
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("concurrency") {
            let parsed: usize =
                parse_number("download", "concurrency", v, "must be a positive integer")?;
            config.download.concurrency = clamp_concurrency(parsed);
        }
        if let Some(v) = section.get("max_retries") {
            config.download.max_retries =
                parse_number("download", "max_retries", v, "must be a non-negative integer")?;
        }
        if let Some(v) = section.get("retry_delay_ms") {
            config.download.retry_delay_ms = parse_number(
                "download",
                "retry_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("timeout") {
            let timeout: u64 =
                parse_number("download", "timeout", v, "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(invalid(
                    "download",
                    "timeout",
                    v,
                    "must be a positive integer (seconds)",
                ));
            }
            config.download.timeout = timeout;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = expand_tilde(v);
        }
    }

    // [regions] section: name = south,west,north,east
    if let Some(section) = ini.section(Some("regions")) {
        for (name, value) in section.iter() {
            config.regions.push(parse_region(name, value)?);
        }
    }

    Ok(config)
}

fn parse_region(name: &str, value: &str) -> Result<Region, ConfigFileError> {
    const EXPECTED: &str = "expected 'south,west,north,east' in degrees";

    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid("regions", name, value, EXPECTED))?;

    let [south, west, north, east] = parts[..] else {
        return Err(invalid("regions", name, value, EXPECTED));
    };

    Region::from_corners(name, [south, west], [north, east])
        .map_err(|e| invalid("regions", name, value, e.to_string()))
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Expand ~ to home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
