//! Tracing subscriber setup: console output plus an optional rolling file

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogSettings;

/// Prefix of the log files; the rotation date is appended
pub const LOG_FILE_NAME: &str = "app.log";

/// Rotated files kept on disk
const MAX_LOG_FILES: usize = 5;

/// Daily rolling appender writing `app.log.<date>` into `dir`
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?;
    Ok(appender)
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. The returned guard flushes the
/// file writer on drop and must live as long as the process logs.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    let (file_layer, guard) = if settings.file {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(&settings.dir)?);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_writes_into_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let mut appender = file_appender(&log_dir).unwrap();
        appender.write_all(b"scheduler started\n").unwrap();
        appender.flush().unwrap();

        let files: Vec<_> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);

        let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with(LOG_FILE_NAME));
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "scheduler started\n"
        );
    }
}
