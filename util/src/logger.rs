//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use fern;
use log::{self, info};
use std::path::Path;
use thiserror::Error;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string for log line timestamps.
const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.6f";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Log output always goes to stdout, and additionally to `log_file_path` if
/// one is given.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    log_file_path: Option<&Path>,
) -> Result<(), LoggerInitError> {
    // Setup the logger using fern's builder pattern
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // If debug or trace include the target, otherwise don't include it
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{} {}] {}: {}",
                    chrono::Local::now().format(TIMESTAMP_FORMAT),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{} {}] {}",
                    chrono::Local::now().format(TIMESTAMP_FORMAT),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(min_level)
        .chain(std::io::stdout());

    if let Some(path) = log_file_path {
        dispatch = dispatch.chain(match fern::log_file(path) {
            Ok(f) => f,
            Err(e) => return Err(LoggerInitError::LogFileInitError(e)),
        });
    }

    match dispatch.apply() {
        Ok(_) => (),
        Err(e) => return Err(LoggerInitError::FernInitError(e)),
    };

    info!("Logging initialised");
    info!("    Log level: {:?}", min_level);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}
