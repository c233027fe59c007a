//! # Navigation Sensor Messages
//!
//! Sensor data forwarded by the middleware bridge to the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic used for all navigation sensor messages.
pub const SENS_TOPIC: &str = "nav_sens";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position in the WGS84 geodetic frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Latitude
    ///
    /// Units: degrees
    pub lat_deg: f64,

    /// Longitude
    ///
    /// Units: degrees
    pub lon_deg: f64,

    /// Altitude above the WGS84 ellipsoid
    ///
    /// Units: meters
    #[serde(default)]
    pub alt_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Sensor data received from the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavSensData {
    /// The vehicle's home position. Only the first message is used.
    Home(GeodeticPosition),

    /// The vehicle's current global position.
    GlobalPosition(GeodeticPosition),

    /// Compass heading, North is zero, clockwise positive.
    Compass { heading_deg: f64 },

    /// Local pose in the forward-left-up frame, relative to home.
    LocalPose {
        /// Position in meters
        position_m: [f64; 3],

        /// Orientation quaternion as `[x, y, z, w]`
        orientation_q: [f64; 4],
    },

    /// Request that the controller resets itself and waits for a new home position.
    Reset,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GeodeticPosition {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sens_data_json() {
        let msg: NavSensData =
            serde_json::from_str(r#"{"Home":{"lat_deg":38.5,"lon_deg":-121.7}}"#).unwrap();
        assert_eq!(msg, NavSensData::Home(GeodeticPosition::new(38.5, -121.7, 0.0)));

        let msg: NavSensData = serde_json::from_str(
            r#"{"LocalPose":{"position_m":[1.0,2.0,3.0],"orientation_q":[0.0,0.0,0.0,1.0]}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            NavSensData::LocalPose {
                position_m: [1.0, 2.0, 3.0],
                orientation_q: [0.0, 0.0, 0.0, 1.0]
            }
        );

        let msg: NavSensData = serde_json::from_str(r#""Reset""#).unwrap();
        assert_eq!(msg, NavSensData::Reset);
    }
}
