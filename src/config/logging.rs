use std::path::{Path, PathBuf};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigSpec, EnvironmentProvider};

/// Directives appended to every filter so SQL statements only show when asked for
const QUIET_DEPENDENCIES: &str = "sqlx=warn,sea_orm_migration=warn";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("File system error: {0}")]
    FileSystemError(#[from] std::io::Error),
}

/// `LOG_LEVEL` as an EnvFilter directive string (default `info`)
fn build_filter(log_level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = if log_level.contains("sqlx") {
        log_level.to_string()
    } else {
        format!("{},{}", log_level, QUIET_DEPENDENCIES)
    };
    EnvFilter::try_new(&directives)
        .map_err(|e| LoggingError::InvalidLogLevel(format!("{}: {}", log_level, e)))
}

/// Split `APP_LOG_FILE` into the directory and file name prefix for the appender
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InitializationError(format!("Invalid log file path: {}", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}

/// Install the global subscriber: console always, daily-rotated file when `APP_LOG_FILE` is set
pub fn init_logging(env: &dyn EnvironmentProvider) -> Result<(), LoggingError> {
    let log_level = ConfigSpec::new(env, "LOG_LEVEL")
        .default_value("info")
        .load()
        .map_err(|e| LoggingError::InvalidLogLevel(e.to_string()))?;
    let log_file = ConfigSpec::new(env, "APP_LOG_FILE")
        .load_optional()
        .map_err(|e| LoggingError::InitializationError(e.to_string()))?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(build_filter(&log_level)?);

    let file_layer = match log_file {
        Some(path) => {
            let (directory, file_name) = split_log_path(Path::new(&path))?;
            std::fs::create_dir_all(&directory)?;
            Some(
                fmt::layer()
                    .with_writer(tracing_appender::rolling::daily(directory, file_name))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(build_filter(&log_level)?),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::InitializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_levels_and_directives() {
        assert!(build_filter("info").is_ok());
        assert!(build_filter("helpdesk_backend=debug,poem=warn").is_ok());
        assert!(build_filter("sqlx=debug").is_ok());
    }

    #[test]
    fn test_filter_rejects_garbage() {
        assert!(matches!(
            build_filter("helpdesk_backend=loud"),
            Err(LoggingError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("/var/log/helpdesk/app.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/helpdesk"));
        assert_eq!(name, PathBuf::from("app.log"));

        let (dir, name) = split_log_path(Path::new("app.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("app.log"));
    }
}
