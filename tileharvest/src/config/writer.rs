//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::fmt::Write;
use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mut regions = String::new();
    for region in &config.regions {
        let b = region.bounds();
        let _ = writeln!(
            regions,
            "{} = {},{},{},{}",
            region.name(),
            b.south,
            b.west,
            b.north,
            b.east
        );
    }

    format!(
        r#"[source]
; Name recorded in run summaries
name = {}
; Tile endpoint; must contain {{z}}, {{x}} and {{y}}
url_template = {}
; File extension of stored tiles
extension = {}
; User-Agent sent with every request (some servers reject non-browser agents)
user_agent = {}

[storage]
; Root directory; tiles are stored as <directory>/<z>/<x>/<y>.<extension>
; Run summaries (metadata_<region>.json) are written here too
directory = {}

[download]
; Maximum number of tiles fetched at once (1-1000, default: 200)
concurrency = {}
; Retries after the first attempt (default: 3). 404 responses are never retried
max_retries = {}
; Base delay before a retry in milliseconds, doubled on each retry (default: 1000)
retry_delay_ms = {}
; Per-request timeout in seconds (default: 10)
timeout = {}

[logging]
; Log file, truncated at startup
file = {}

[regions]
; Additional regions, added to the built-in ones
; name = south,west,north,east
; Example: my_area = 35.0,139.0,35.5,139.5
{}"#,
        config.source.name,
        config.source.url_template,
        config.source.extension,
        config.source.user_agent,
        path_to_string(&config.storage.directory),
        config.download.concurrency,
        config.download.max_retries,
        config.download.retry_delay_ms,
        config.download.timeout,
        path_to_string(&config.logging.file),
        regions,
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
