//! # Navigation Executable Parameters
//!
//! This module provide parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NavExecParams {

    /// Rate of the control loop
    ///
    /// Units: Hz
    #[serde(default = "default_loop_rate_hz")]
    pub loop_rate_hz: f64,

    /// Path to the lane map CSV, relative to the software root
    pub map_path: String,

    /// Number of consecutive failed mode requests after which an error is logged
    #[serde(default = "default_max_consec_mode_errors")]
    pub max_consec_mode_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_loop_rate_hz() -> f64 {
    15.0
}

fn default_max_consec_mode_errors() -> u64 {
    5
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p: NavExecParams = util::params::parse("map_path = \"maps/track.csv\"").unwrap();

        assert_eq!(p.loop_rate_hz, 15.0);
        assert_eq!(p.map_path, "maps/track.csv");
        assert_eq!(p.max_consec_mode_errors, 5);
    }
}
