//! # Affordance Control module
//!
//! Rule based controller turning an [`Affordance`] into a yaw rate command which steers the
//! vehicle back towards the lane centre line and aligns it with the lane.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::clamp;

use crate::afford::Affordance;

pub use params::*;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the yaw rate command for the given affordance.
///
/// The command is `-(k_rel_angle * rel_angle + k_dist_center * dist_center)`, clamped into
/// `[-max_yawrate, max_yawrate]`. Non-finite commands are replaced by zero, and the command is
/// zero whenever the vehicle is out of bound.
///
/// # Outputs
/// - The yaw rate command, in radians/second, counter-clockwise positive.
/// - Whether the vehicle is in bound.
pub fn calc_affordance_cmd(
    affordance: &Affordance,
    max_yawrate: f64,
    gains: &Gains,
) -> (f64, bool) {
    if !affordance.in_bound {
        return (0.0, false);
    }

    let max_yawrate = if max_yawrate.is_finite() {
        max_yawrate.abs()
    } else {
        0.0
    };

    let cmd = -(gains.k_rel_angle * affordance.rel_angle_rad
        + gains.k_dist_center * affordance.dist_center_m);

    if !cmd.is_finite() {
        return (0.0, true);
    }

    (clamp(&cmd, &-max_yawrate, &max_yawrate), true)
}
