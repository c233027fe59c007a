//! Session management

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which diplays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The root directory for this session's archives
    pub arch_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable ({}) is not set", crate::host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, have you already initialised the \
         session? (conquer_once error: {0})"
    )]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}`
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        // Get the root directory
        let root = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        let mut sessions_path = root;
        sessions_path.push(sessions_dir);

        Self::new_in(exec_name, sessions_path)
    }

    /// Start a new session inside an explicit sessions directory.
    pub fn new_in(exec_name: &str, sessions_path: PathBuf) -> Result<Self, SessionError> {
        // Set the session epoch
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::CannotInitEpoch)?;

        // Format the session epoch as a timestamp
        let timestamp = match SESSION_EPOCH.get() {
            Some(e) => e.format(TIMESTAMP_FORMAT),
            None => return Err(SessionError::CannotGetEpoch),
        };

        // Create the session path
        let mut path = sessions_path;
        path.push(format!("{}_{}", exec_name, timestamp));

        // Create the directory
        fs::create_dir_all(&path).map_err(SessionError::CannotCreateDir)?;

        // Create the archive dir
        let mut arch_path: PathBuf = path.clone();
        arch_path.push("arch");
        fs::create_dir_all(&arch_path).map_err(SessionError::CannotCreateDir)?;

        // Create the log file path
        let mut log_file_path = path.clone();
        log_file_path.push(format!("{}.log", exec_name));

        Ok(Session {
            session_root: path,
            arch_root: arch_path,
            log_file_path,
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// If the session has not been started yet `NaN` is returned.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => {
            let elapsed = Utc::now() - *e;
            time::duration_to_seconds(elapsed).unwrap_or(std::f64::NAN)
        }
        None => std::f64::NAN,
    }
}

/// Return a reference to the session's epoch, if the session has been started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}
