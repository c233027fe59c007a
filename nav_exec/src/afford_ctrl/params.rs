//! Parameters structure for AffordCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the affordance based controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LIMITS ----

    /// Maximum absolute yaw rate which may be commanded.
    ///
    /// Units: radians/second
    pub max_yawrate_rads: f64,

    // ---- GAINS ----

    /// Gain on the angle between the vehicle and the lane.
    ///
    /// Units: 1/second
    pub k_rel_angle: f64,

    /// Gain on the distance from the lane centre line.
    ///
    /// Units: radians/(second meter)
    pub k_dist_center: f64,

    // ---- FILTER ----

    /// Weight of the new command in the low-pass filter, clamped into `[0, 1]`. A value of 1
    /// disables filtering.
    #[serde(default = "default_filter_alpha")]
    pub filter_alpha: f64,

    // ---- SAFETY ----

    /// Minimum period between two out of bound warnings.
    ///
    /// Units: seconds
    #[serde(default = "default_warn_period_s")]
    pub oob_warn_period_s: f64,

    /// Flight mode requested when the vehicle leaves the lane.
    #[serde(default = "default_safe_mode")]
    pub safe_mode: String,
}

/// Gains of the steering rule, without the yaw rate limit which is passed separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub k_rel_angle: f64,
    pub k_dist_center: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn default_filter_alpha() -> f64 {
    1.0
}

fn default_warn_period_s() -> f64 {
    2.0
}

fn default_safe_mode() -> String {
    String::from("POSCTL")
}

impl Params {
    pub fn gains(&self) -> Gains {
        Gains {
            k_rel_angle: self.k_rel_angle,
            k_dist_center: self.k_dist_center,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_yawrate_rads: 45.0,
            k_rel_angle: 1.0,
            k_dist_center: 0.5,
            filter_alpha: default_filter_alpha(),
            oob_warn_period_s: default_warn_period_s(),
            safe_mode: default_safe_mode(),
        }
    }
}
