use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use mcjs_bridge::config::{LoggingConfig, ProjectPaths};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAX_LOG_SIZE: u64 = 1024 * 1024; // 1MB

/// Initialize logging for a component.
///
/// - `component_name`: name of the log file stem (e.g. "mcjs")
/// - `config`: file logging toggle and fallback filter used when RUST_LOG is unset
///
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init_logging(component_name: &str, config: &LoggingConfig) -> io::Result<Option<WorkerGuard>> {
    let default_level = config.level.clone().unwrap_or_else(|| "info".to_string());
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level))
    };

    if config.file {
        let log_dir = get_log_directory()?;
        fs::create_dir_all(&log_dir)?;

        let log_path = log_dir.join(format!("{}.log", component_name));
        truncate_if_needed(&log_path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        let (non_blocking_file, guard) = tracing_appender::non_blocking(BufWriter::new(file));

        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
            .with(
                fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_target(true),
            )
            .init();

        tracing::info!(target: "runner", "Logging to file: {}", log_path.display());
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        Ok(None)
    }
}

fn get_log_directory() -> io::Result<PathBuf> {
    let paths = ProjectPaths::new("mcjs")
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Failed to find home directory"))?;
    Ok(paths.log_dir())
}

/// Truncate log file if it exceeds MAX_LOG_SIZE
fn truncate_if_needed(log_path: &Path) -> io::Result<()> {
    if log_path.exists() && fs::metadata(log_path)?.len() > MAX_LOG_SIZE {
        File::create(log_path)?;
    }
    Ok(())
}
