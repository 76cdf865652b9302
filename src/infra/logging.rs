use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::constants::LOG_FILE_NAME;

/// Install the global subscriber: a daily rolling file under `log_dir`.
///
/// The terminal belongs to the UI, so nothing is written to stdout or
/// stderr. Keep the returned guard alive for the whole run; dropping it
/// flushes pending lines.
pub fn init_logger(log_dir: &Path, filter: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_writer(writer).with_target(true).with_ansi(false);

    let _ = tracing_subscriber::registry().with(env_filter).with(file_layer).try_init();

    Ok(guard)
}
