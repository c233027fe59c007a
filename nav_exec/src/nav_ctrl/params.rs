//! Parameters structure for NavCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use comms_if::eqpt::nav::GeodeticPosition;

use crate::afford::TravelDirection;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the navigation control loop.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- MAP ----

    /// Geodetic position of the origin of the map frame.
    pub map_origin: GeodeticPosition,

    /// Direction of travel along the map's centre line.
    #[serde(default)]
    pub travel_direction: TravelDirection,

    // ---- TIMING ----

    /// Time to wait between receiving home and starting control.
    ///
    /// Units: seconds
    #[serde(default = "default_settle_time_s")]
    pub settle_time_s: f64,

    /// Minimum period between two warnings about a missing home position.
    ///
    /// Units: seconds
    #[serde(default = "default_warn_period_s")]
    pub home_warn_period_s: f64,

    /// Period of the global position log while running.
    ///
    /// Units: seconds
    #[serde(default = "default_telem_period_s")]
    pub telem_period_s: f64,

    /// If set, warn when no sensor data has been received for this long. Commands are not
    /// affected.
    ///
    /// Units: seconds
    #[serde(default)]
    pub sensor_timeout_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn default_settle_time_s() -> f64 {
    1.0
}

fn default_warn_period_s() -> f64 {
    2.0
}

fn default_telem_period_s() -> f64 {
    1.0
}

impl Default for Params {
    fn default() -> Self {
        Self {
            map_origin: GeodeticPosition::new(0.0, 0.0, 0.0),
            travel_direction: TravelDirection::default(),
            settle_time_s: default_settle_time_s(),
            home_warn_period_s: default_warn_period_s(),
            telem_period_s: default_telem_period_s(),
            sensor_timeout_s: None,
        }
    }
}
