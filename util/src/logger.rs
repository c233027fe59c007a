//! Logger initialisation
//!
//! Log lines are written both to stdout and to the session log file, stamped with the number of
//! seconds elapsed since the session epoch. Levels are coloured on stdout only, so the log file
//! stays free of terminal escape codes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::fmt;
use log::{self, info};
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include `INFO`, found `{0}`")]
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
/// `min_level` must be at least as verbose as `LevelFilter::Info`. Only the first call in a
/// process succeeds.
pub fn logger_init(
    min_level: self::LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::LevelFilter::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    fern::Dispatch::new()
        .level(min_level)
        .level_for("zmq", LevelFilter::Info)
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| format_record(out, message, record, true))
                .chain(std::io::stdout())
        )
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| format_record(out, message, record, false))
                .chain(log_file)
        )
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format one log line. Debug and trace lines also carry the target module.
fn format_record(
    out: fern::FormatCallback,
    message: &fmt::Arguments,
    record: &log::Record,
    colour: bool
) {
    let level = if colour {
        level_to_str(record.level()).to_string()
    } else {
        level_tag(record.level()).to_string()
    };

    if record.level() > log::Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level,
            record.target(),
            message
        ))
    }
    else {
        out.finish(format_args!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level,
            message
        ))
    }
}

/// Three letter tag for a log level
fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

/// Coloured tag for a log level
fn level_to_str(level: log::Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info  => tag.normal(),
        log::Level::Warn  => tag.yellow(),
        log::Level::Error => tag.red().bold()
    }
}
