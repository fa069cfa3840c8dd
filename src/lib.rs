//! conmux — interactive operator console for multi-session remote control
//!
//! The console reads one command line at a time, dispatches it against a
//! registry of named commands, and can attach its input/output to one live
//! session at a time.

pub mod cli;
pub mod config;
pub mod console;
pub mod grammar;
pub mod session;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

/// Application result type for consistent error handling
pub type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize tracing subscriber for logging.
///
/// Human-readable output goes to stderr so it never interleaves with
/// console output on stdout; when a log file path is configured, a
/// non-blocking file layer is added and its guard returned. The guard must
/// be held for the process lifetime.
pub fn init_logging(level: &str, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("conmux={}", level).into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_file.filter(|p| !p.is_empty()) {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "conmux.log".to_string());

            let appender = tracing_appender::rolling::never(dir, file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}
