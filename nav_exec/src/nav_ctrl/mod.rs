//! # Navigation Control module
//!
//! Orchestrates one control cycle of the executable: ingests sensor data, waits for the home
//! position, reconciles the vehicle and map frames, estimates the affordance and issues the
//! filtered yaw rate command.
//!
//! The module moves through the modes `Init -> WaitingForHome -> Running -> Shutdown`. A
//! [`NavSensData::Reset`](comms_if::eqpt::nav::NavSensData::Reset) message sends it back to
//! `Init`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Modes of the navigation control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavMode {
    /// Nothing has been processed yet
    Init,

    /// Waiting for the home position and for the vehicle to settle
    WaitingForHome,

    /// Issuing commands
    Running,

    /// Terminated, nothing is output anymore
    Shutdown,
}

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("NavCtrl has not been initialised")]
    NotInit,

    #[error("Could not open the NavCtrl archive: {0}")]
    ArchiveError(String),
}

impl Default for NavMode {
    fn default() -> Self {
        NavMode::Init
    }
}
