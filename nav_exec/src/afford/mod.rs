//! # Affordance module
//!
//! An affordance is a compact geometric summary of where the vehicle is relative to its lane:
//! the signed distance to the centre line, the distances to both boundaries, the heading relative
//! to the lane and whether the vehicle is still inside the lane at all. The rule based controller
//! works on this summary rather than on raw sensor data.
//!
//! Estimation is hidden behind the [`AffordanceEstimator`] trait. The [`LaneMap`] implementation
//! works from the centre/upper/lower boundary polylines of the map file.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod lane_map;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use comms_if::eqpt::afford::AffordanceMsg;

pub use lane_map::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose handed to the affordance estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavPose {
    /// Position in the map frame
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Yaw in the map frame, East zero, counter-clockwise positive, in `[0, 2pi)`
    ///
    /// Units: radians
    pub yaw_rad: f64,

    /// Direction of travel along the map's centre line
    pub direction: TravelDirection,
}

/// Lane-relative geometry of the vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Affordance {
    /// Signed distance to the centre line, positive when the centre line is to the vehicle's
    /// right (i.e. the vehicle is left of centre).
    ///
    /// Units: meters
    pub dist_center_m: f64,

    /// Distance to the left boundary
    ///
    /// Units: meters
    pub dist_left_m: f64,

    /// Distance to the right boundary
    ///
    /// Units: meters
    pub dist_right_m: f64,

    /// Vehicle yaw minus lane heading, in `[-pi, pi]`, counter-clockwise positive.
    ///
    /// Units: radians
    pub rel_angle_rad: f64,

    /// True if the vehicle is inside the lane
    pub in_bound: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of travel along the map's centre line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelDirection {
    /// In the order the centre line points are given in the map file
    Forward,

    /// Against the order of the centre line points
    Reverse,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Estimates the affordance of the vehicle from its pose.
///
/// Implementors must be stateless given their inputs.
pub trait AffordanceEstimator {
    fn estimate(&self, pose: &NavPose) -> Affordance;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TravelDirection {
    fn default() -> Self {
        TravelDirection::Forward
    }
}

impl TravelDirection {
    /// `+1` for forward, `-1` for reverse.
    pub fn sign(&self) -> f64 {
        match self {
            TravelDirection::Forward => 1.0,
            TravelDirection::Reverse => -1.0,
        }
    }
}

impl Affordance {
    /// Build the message published for this affordance.
    pub fn to_msg(&self, timestamp: DateTime<Utc>) -> AffordanceMsg {
        AffordanceMsg {
            timestamp,
            dist_center_m: self.dist_center_m,
            dist_left_m: self.dist_left_m,
            dist_right_m: self.dist_right_m,
            rel_angle_rad: self.rel_angle_rad,
            in_bound: self.in_bound,
        }
    }
}
