//! # Flight Mode Service
//!
//! Request and response exchanged with the flight mode service, used to hand the vehicle back to
//! a safe mode when the controller cannot continue.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Request to switch the vehicle's flight mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetModeRequest {
    /// Autopilot specific mode name, for example `"POSCTL"`.
    pub custom_mode: String,
}

/// Response from the flight mode service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetModeResponse {
    /// True if the mode change was forwarded to the autopilot.
    pub mode_sent: bool,
}
