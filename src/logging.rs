//! File logging. The terminal belongs to the TUI, so diagnostics go to a
//! rotating log file beside the database instead of stderr.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "library-catalog";
const DEFAULT_LEVEL: &str = "info";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// Start the logger. The handle must stay alive for the rest of the process;
/// dropping it flushes and stops logging. `RUST_LOG` overrides the level.
pub fn init_logging(log_dir: &Path) -> Result<LoggerHandle> {
    fs::create_dir_all(log_dir).context("failed to create log directory")?;

    let handle = Logger::try_with_env_or_str(DEFAULT_LEVEL)
        .context("invalid log level")?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    info!(
        "event=app_start module=core status=ok platform={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}
