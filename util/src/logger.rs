//! Logging setup
//!
//! Log records go to two places: the terminal, which only shows `INFO` and
//! above with coloured level tags, and the session's log file, which takes
//! everything down to the requested level. Per-cycle planner output is
//! emitted at `DEBUG` and `TRACE`, at 50 Hz it would drown the terminal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most verbose level shown on the terminal.
const TERMINAL_LEVEL: LevelFilter = LevelFilter::Info;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a file log level at least as verbose as `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `file_level` is the most verbose level written to the session log file,
/// it must be at least as verbose as `INFO`.
///
/// Must only be called once per process.
pub fn logger_init(
    file_level: LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if file_level < LevelFilter::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(file_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let terminal = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}",
                session::get_elapsed_seconds(),
                level_to_colored(record.level()),
                message
            ))
        })
        .level(TERMINAL_LEVEL)
        .chain(std::io::stdout());

    // The file always includes the target so cycle logs can be filtered by
    // module
    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}: {}",
                session::get_elapsed_seconds(),
                level_to_str(record.level()),
                record.target(),
                message
            ))
        })
        .level(file_level)
        .chain(log_file);

    fern::Dispatch::new()
        .level(file_level)
        .level_for("zmq", LevelFilter::Info)
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    File log level: {:?}", file_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the plain string representation of a log level
fn level_to_str(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

/// Get the coloured representation of a log level for the terminal
fn level_to_colored(level: log::Level) -> ColoredString {
    let tag = level_to_str(level);

    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info  => tag.normal(),
        log::Level::Warn  => tag.yellow(),
        log::Level::Error => tag.red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_tags() {
        assert_eq!(level_to_str(log::Level::Warn), "WRN");
        assert_eq!(level_to_str(log::Level::Trace), "TRC");
    }
}
