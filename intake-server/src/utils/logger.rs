//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;

use crate::core::Config;

/// Initialize the logger
///
/// Writes to stderr; additionally to a daily-rolling file when
/// `config.log_dir` points at an existing directory. The returned guard
/// must be held for the lifetime of the process so buffered file output
/// is flushed.
pub fn init_logger(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = &config.log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "intake-server");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            subscriber.with_writer(writer).init();
            return Some(guard);
        }
    }

    subscriber.init();
    None
}
