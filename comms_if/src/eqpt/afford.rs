//! # Affordance Controller Outputs
//!
//! Messages published by the navigation executable every control cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic for the yaw rate command.
pub const YAW_CMD_TOPIC: &str = "yaw_cmd";

/// Topic for the estimated affordance.
pub const AFFORD_TOPIC: &str = "affordance";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Yaw rate command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YawCmd {
    /// UTC timestamp at which the command was issued
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Commanded yaw rate, counter-clockwise positive.
    ///
    /// Units: radians/second
    pub yaw_rate_rads: f64,
}

/// The estimated affordance of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffordanceMsg {
    /// UTC timestamp at which the affordance was estimated
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Signed distance to the lane centre line, positive to the left.
    pub dist_center_m: f64,

    /// Distance to the left lane boundary.
    pub dist_left_m: f64,

    /// Distance to the right lane boundary.
    pub dist_right_m: f64,

    /// Heading relative to the lane, counter-clockwise positive.
    pub rel_angle_rad: f64,

    /// True if the vehicle is between the lane boundaries.
    pub in_bound: bool,
}
