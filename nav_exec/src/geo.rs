//! # Geodetic offset calculation
//!
//! Converts the vehicle's GPS home position and the configured map origin into a planar
//! translation between the vehicle's local frame (centred on home) and the map frame (centred on
//! the map origin).
//!
//! Distances are measured on the WGS84 ellipsoid using Vincenty's inverse formula. If the
//! iteration does not converge (nearly antipodal points, which cannot happen for the offsets used
//! here) the spherical haversine distance is used instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use comms_if::eqpt::nav::GeodeticPosition;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// WGS84 semi-major axis
///
/// Units: meters
pub const WGS84_A_M: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// WGS84 semi-minor axis
///
/// Units: meters
pub const WGS84_B_M: f64 = WGS84_A_M * (1.0 - WGS84_F);

/// Mean earth radius used by the haversine fallback
///
/// Units: meters
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Maximum number of iterations of the Vincenty inverse formula.
const VINCENTY_MAX_ITERS: usize = 200;

/// Convergence threshold on lambda for the Vincenty inverse formula.
const VINCENTY_TOLERANCE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Translation from the vehicle's local frame into the map frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlanarOffset {
    /// East offset
    ///
    /// Units: meters
    pub x_m: f64,

    /// North offset
    ///
    /// Units: meters
    pub y_m: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the planar offset between the map origin and the home position.
///
/// - `x_m` is the distance from the origin to the point at the origin's latitude and home's
///   longitude, positive if the origin is east of home.
/// - `y_m` is the distance from the origin to the point at home's latitude and the origin's
///   longitude, positive if the origin is north of home.
pub fn compute_offset(map_origin: &GeodeticPosition, home: &GeodeticPosition) -> PlanarOffset {
    let x_m = geodesic_distance_m(
        map_origin,
        &GeodeticPosition::new(map_origin.lat_deg, home.lon_deg, map_origin.alt_m),
    ) * sign(map_origin.lon_deg - home.lon_deg);

    let y_m = geodesic_distance_m(
        map_origin,
        &GeodeticPosition::new(home.lat_deg, map_origin.lon_deg, map_origin.alt_m),
    ) * sign(map_origin.lat_deg - home.lat_deg);

    PlanarOffset { x_m, y_m }
}

/// Distance between two points on the WGS84 ellipsoid.
pub fn geodesic_distance_m(p0: &GeodeticPosition, p1: &GeodeticPosition) -> f64 {
    vincenty_distance_m(p0, p1).unwrap_or_else(|| haversine_distance_m(p0, p1))
}

/// Vincenty's inverse formula on the WGS84 ellipsoid.
///
/// Returns `None` if the iteration fails to converge.
pub fn vincenty_distance_m(p0: &GeodeticPosition, p1: &GeodeticPosition) -> Option<f64> {
    let l = (p1.lon_deg - p0.lon_deg).to_radians();
    let u_1 = ((1.0 - WGS84_F) * p0.lat_deg.to_radians().tan()).atan();
    let u_2 = ((1.0 - WGS84_F) * p1.lat_deg.to_radians().tan()).atan();

    let (sin_u_1, cos_u_1) = u_1.sin_cos();
    let (sin_u_2, cos_u_2) = u_2.sin_cos();

    let mut lambda = l;

    for _ in 0..VINCENTY_MAX_ITERS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = ((cos_u_2 * sin_lambda).powi(2)
            + (cos_u_1 * sin_u_2 - sin_u_1 * cos_u_2 * cos_lambda).powi(2))
        .sqrt();

        // Coincident points
        if sin_sigma == 0.0 {
            return Some(0.0);
        }

        let cos_sigma = sin_u_1 * sin_u_2 + cos_u_1 * cos_u_2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u_1 * cos_u_2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha.powi(2);

        // Equatorial lines have cos_sq_alpha == 0
        let cos_2_sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u_1 * sin_u_2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2_sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2_sigma_m.powi(2))));

        if (lambda - lambda_prev).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos_sq_alpha * (WGS84_A_M.powi(2) - WGS84_B_M.powi(2)) / WGS84_B_M.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2_sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2_sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2_sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2_sigma_m.powi(2))));

            return Some(WGS84_B_M * big_a * (sigma - delta_sigma));
        }
    }

    None
}

/// Great-circle distance on a spherical earth.
pub fn haversine_distance_m(p0: &GeodeticPosition, p1: &GeodeticPosition) -> f64 {
    let lat_0 = p0.lat_deg.to_radians();
    let lat_1 = p1.lat_deg.to_radians();
    let d_lat = lat_1 - lat_0;
    let d_lon = (p1.lon_deg - p0.lon_deg).to_radians();

    let a = (d_lat * 0.5).sin().powi(2) + lat_0.cos() * lat_1.cos() * (d_lon * 0.5).sin().powi(2);

    2.0 * MEAN_EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Sign of a value, zero for zero.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
