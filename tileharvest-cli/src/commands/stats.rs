//! Stats command - summarize the tile store.

use tileharvest::store::StorageStats;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the stats command.
pub async fn run(debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("stats");

    let service = runner.create_service()?;
    let stats = service.storage_stats().await.map_err(CliError::Stats)?;

    println!("Tile store: {}", service.store_root().display());
    println!();
    for line in format_stats(&stats) {
        println!("{}", line);
    }

    Ok(())
}

fn format_stats(stats: &StorageStats) -> Vec<String> {
    if stats.levels.is_empty() {
        return vec!["  No tiles downloaded yet".to_string()];
    }

    let mut lines = vec![format!("  {:<6} {:>10} {:>12}", "Zoom", "Tiles", "Size (MB)")];
    lines.extend(stats.levels.iter().map(|level| {
        format!(
            "  {:<6} {:>10} {:>12.2}",
            level.zoom,
            level.count,
            level.size_mb()
        )
    }));
    lines.push(format!(
        "  {:<6} {:>10} {:>12.2}",
        "Total",
        stats.total_files,
        stats.total_size_mb()
    ));
    lines
}
