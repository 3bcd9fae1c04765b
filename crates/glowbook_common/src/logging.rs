//! Logging utilities for Glowbook.
//!
//! Every binary and test harness goes through [`init_with_level`] (or
//! [`init_with_file`] when logs should also be written to disk) so the
//! subscriber layout stays the same across crates.

use std::path::Path;

use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// ```
/// use glowbook_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG); // no-op, already initialized
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

fn filter_for(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("glowbook={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Uses `try_init`, so calling it again (e.g. from several tests) is harmless.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(filter_for(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize stdout logging plus a daily rolling file under `directory`.
///
/// The returned guard must be kept alive for the lifetime of the process,
/// otherwise buffered file output is lost.
pub fn init_with_file(level: Level, directory: &Path, file_prefix: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(directory, file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter_for(level))
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (files in {})",
            level,
            directory.display()
        );
    }
    guard
}

/// Logs the outcome of a result and hands it back unchanged.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
