//! Logging Infrastructure
//!
//! Installs a `tracing-subscriber` fmt subscriber for the host app.

use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::ClientConfig;

/// Initialize the logger at info level, stdout only
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger from a client configuration
pub fn init_from_config(config: &ClientConfig) {
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level` when set. A second call is a no-op.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "bistro-client");
            let _ = subscriber.with_writer(file_appender).try_init();
            return;
        }
        tracing::warn!(dir = %dir, "Log directory does not exist, logging to stdout");
    }

    let _ = subscriber.try_init();
}
