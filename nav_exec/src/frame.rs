//! # Coordinate frame reconciliation
//!
//! The autopilot reports the vehicle's local pose in a forward-left-up frame centred on the home
//! position, and its compass heading with North as zero, clockwise positive. The affordance map is
//! expressed in its own frame, centred on the map origin, with East as zero heading and
//! counter-clockwise positive. This module converts between the two.
//!
//! Two heading sources exist and are kept apart:
//! - The local pose quaternion, which is only used to track the vehicle (`VehiclePose`).
//! - The compass heading, which is the yaw given to the affordance estimator (`compass_to_yaw`).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Quaternion, UnitQuaternion};
use serde::Serialize;

use util::maths::wrap_2pi;

use crate::geo::PlanarOffset;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The vehicle's pose in the map frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VehiclePose {
    /// Position along the map's X axis
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the map's Y axis
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading from the local pose orientation, in the range `[0, 2pi)`.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Applies the planar offset between the vehicle and map frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameReconciler {
    offset: PlanarOffset,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FrameReconciler {
    pub fn new(offset: PlanarOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> PlanarOffset {
        self.offset
    }

    /// Translate a local position into the map frame.
    pub fn apply_position(&self, raw_x_m: f64, raw_y_m: f64) -> (f64, f64) {
        (raw_x_m + self.offset.x_m, raw_y_m + self.offset.y_m)
    }

    /// Extract the wrapped heading from a local orientation quaternion given as `[x, y, z, w]`.
    pub fn apply_orientation(&self, orientation_q: [f64; 4]) -> f64 {
        quaternion_to_yaw(orientation_q)
    }

    /// Build the vehicle pose from a raw local pose.
    pub fn reconcile(&self, position_m: [f64; 3], orientation_q: [f64; 4]) -> VehiclePose {
        let (x_m, y_m) = self.apply_position(position_m[0], position_m[1]);

        VehiclePose {
            x_m,
            y_m,
            heading_rad: self.apply_orientation(orientation_q),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Yaw of an orientation quaternion given as `[x, y, z, w]`, wrapped into `[0, 2pi)`.
///
/// A degenerate (zero norm or non-finite) quaternion gives a yaw of zero.
pub fn quaternion_to_yaw(orientation_q: [f64; 4]) -> f64 {
    let [x, y, z, w] = orientation_q;
    let q = Quaternion::new(w, x, y, z);

    match UnitQuaternion::try_new(q, std::f64::EPSILON) {
        Some(uq) => wrap_2pi(uq.euler_angles().2),
        None => 0.0,
    }
}

/// Convert a compass heading into the map's yaw convention.
///
/// The compass measures from North, clockwise, in degrees. The map measures from East,
/// counter-clockwise, in radians, so `yaw = wrap(-heading + pi/2)`.
pub fn compass_to_yaw(heading_deg: f64) -> f64 {
    wrap_2pi(-heading_deg.to_radians() + std::f64::consts::FRAC_PI_2)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_apply_position() {
        let frame = FrameReconciler::new(PlanarOffset { x_m: 10.0, y_m: -5.0 });

        assert_eq!(frame.apply_position(1.0, 2.0), (11.0, -3.0));
        assert_eq!(frame.apply_position(0.0, 0.0), (10.0, -5.0));
    }

    #[test]
    fn test_compass_to_yaw() {
        // North is the map's +Y
        assert!(close(compass_to_yaw(0.0), FRAC_PI_2));
        // East is the map's +X
        assert!(close(compass_to_yaw(90.0), 0.0));
        // South
        assert!(close(compass_to_yaw(180.0), 1.5 * PI));
        // West
        assert!(close(compass_to_yaw(270.0), PI));
        // Negative and overflowing headings wrap
        assert!(close(compass_to_yaw(-90.0), PI));
        assert!(close(compass_to_yaw(450.0), 0.0) || close(compass_to_yaw(450.0), 2.0 * PI));
    }

    #[test]
    fn test_quaternion_to_yaw() {
        // Identity
        assert!(close(quaternion_to_yaw([0.0, 0.0, 0.0, 1.0]), 0.0));

        // Rotation of 90 deg about Z
        let half = FRAC_PI_2 / 2.0;
        assert!(close(quaternion_to_yaw([0.0, 0.0, half.sin(), half.cos()]), FRAC_PI_2));

        // Rotation of -90 deg about Z wraps to 270 deg
        assert!(close(
            quaternion_to_yaw([0.0, 0.0, (-half).sin(), (-half).cos()]),
            1.5 * PI
        ));

        // Non-unit quaternions are normalised
        assert!(close(quaternion_to_yaw([0.0, 0.0, 2.0 * half.sin(), 2.0 * half.cos()]), FRAC_PI_2));

        // Degenerate quaternion
        assert_eq!(quaternion_to_yaw([0.0, 0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_reconcile() {
        let frame = FrameReconciler::new(PlanarOffset { x_m: 3.0, y_m: 4.0 });
        let half = PI / 2.0;
        let pose = frame.reconcile([1.0, 1.0, 10.0], [0.0, 0.0, half.sin(), half.cos()]);

        assert!(close(pose.x_m, 4.0));
        assert!(close(pose.y_m, 5.0));
        assert!(close(pose.heading_rad, PI));
    }
}
