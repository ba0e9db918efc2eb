//! Download command - fetch every tile covering a region.
//!
//! The run executes in the background while this command prints a progress
//! line once per second. Ctrl-C stops admitting new tiles; tiles already in
//! flight finish and no summary is written.

use std::time::Duration;
use tileharvest::config::DownloadConfig;
use tileharvest::run::{LogLevel, RunReport, RunSnapshot};
use tileharvest::store::bytes_to_mb;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Interval between progress lines.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Number of failed-tile log lines repeated after the run.
const MAX_ERRORS_SHOWN: usize = 10;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub region: String,
    pub zoom_min: u8,
    pub zoom_max: u8,
    pub concurrency: Option<usize>,
    pub max_retries: Option<u32>,
    /// Seconds
    pub retry_delay: Option<f64>,
}

impl DownloadArgs {
    /// Applies command-line overrides on top of the configured defaults.
    fn apply(&self, mut download: DownloadConfig) -> Result<DownloadConfig, CliError> {
        if let Some(concurrency) = self.concurrency {
            download = download.with_concurrency(concurrency);
        }
        if let Some(retries) = self.max_retries {
            download = download.with_max_retries(retries);
        }
        if let Some(secs) = self.retry_delay {
            let delay = Duration::try_from_secs_f64(secs).map_err(|_| {
                CliError::InvalidArgument(format!(
                    "--retry-delay must be a non-negative number of seconds, got {}",
                    secs
                ))
            })?;
            download = download.with_retry_delay(delay);
        }
        Ok(download)
    }
}

/// Run the download command.
pub async fn run(args: DownloadArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("download");

    let service = runner.create_service()?;
    let download = args.apply(service.download_config())?;
    let request = service
        .request(&args.region, args.zoom_min, args.zoom_max)
        .with_download(download);

    println!("Downloading region: {}", args.region);
    println!("  Zoom: {} - {}", args.zoom_min, args.zoom_max);
    println!("  Source: {}", runner.config().source.url_template);
    println!("  Saving to: {}", service.store_root().display());
    println!(
        "  Concurrency: {}, retries: {}, retry delay: {:.1}s",
        download.concurrency(),
        download.max_retries(),
        download.retry_delay().as_secs_f64()
    );
    println!();

    let handle = service.start_run(request)?;

    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancelling = false;

    while !handle.is_finished() {
        tokio::select! {
            _ = ticker.tick() => {
                let status = service.current_status();
                if status.active {
                    println!("{}", status.progress_line());
                }
            }
            result = &mut ctrl_c, if !cancelling => {
                cancelling = true;
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                    continue;
                }
                info!("Cancellation requested");
                println!("Cancelling: waiting for tiles in flight to finish...");
                handle.cancel();
            }
        }
    }

    let report = handle.wait().await.map_err(|e| CliError::Run(e.into()))?;
    print_report(&report, &service.current_status());

    Ok(())
}

fn print_report(report: &RunReport, status: &RunSnapshot) {
    println!();
    if report.cancelled {
        println!("Download cancelled");
    } else {
        println!("Download complete");
    }
    println!("  Region:     {}", report.region);
    println!("  Zoom:       {}", report.zoom);
    println!("  Tiles:      {}/{}", report.completed(), report.total);
    println!("  Downloaded: {}", report.success);
    println!(
        "  Skipped:    {} ({} already present, {} not on server)",
        report.skipped(),
        report.skipped_existing,
        report.not_found
    );
    println!("  Failed:     {}", report.failed);
    println!("  Retries:    {}", report.retries);
    println!("  Data:       {:.2} MB", bytes_to_mb(report.bytes));
    println!("  Elapsed:    {:.1}s", report.elapsed.as_secs_f64());

    let errors: Vec<_> = status
        .log
        .iter()
        .filter(|entry| entry.level == LogLevel::Error)
        .collect();
    if !errors.is_empty() {
        println!();
        println!("Errors ({}):", errors.len());
        for entry in errors.iter().rev().take(MAX_ERRORS_SHOWN).rev() {
            println!("  [{}] {}", entry.time, entry.message);
        }
        if errors.len() > MAX_ERRORS_SHOWN {
            println!("  ... see the log file for the rest");
        }
    }

    println!();
    match (&report.summary_path, &report.summary_error) {
        (Some(path), _) => println!("Summary written to {}", path.display()),
        (None, Some(error)) => eprintln!("Warning: summary not written: {}", error),
        (None, None) => {}
    }
}
