//! # Lane map
//!
//! The lane map is made of three polylines sampled from splines: the centre line and the upper and
//! lower boundaries. It is loaded once from a CSV file with the header
//! `center_x,center_y,upper_x,upper_y,lower_x,lower_y`, one row per sample, in meters in the map
//! frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{io::Read, path::Path};

use log::debug;
use nalgebra::Vector2;
use serde::Deserialize;

use util::maths::{get_ang_dist_2pi, wrap_2pi};

use super::{Affordance, AffordanceEstimator, NavPose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Centre line and boundaries of the lane.
#[derive(Debug, Clone)]
pub struct LaneMap {
    center: Vec<Vector2<f64>>,
    upper: Vec<Vector2<f64>>,
    lower: Vec<Vector2<f64>>,

    /// Indices of the first and last centre line segments with a non-zero length
    end_segs: (usize, usize),
}

/// One sample of the map file.
#[derive(Debug, Deserialize)]
struct MapRow {
    center_x: f64,
    center_y: f64,
    upper_x: f64,
    upper_y: f64,
    lower_x: f64,
    lower_y: f64,
}

/// The closest point on a polyline to some query point.
#[derive(Debug, Clone, Copy)]
struct Projection {
    /// The closest point
    point_m: Vector2<f64>,

    /// Distance from the query point to the closest point
    dist_m: f64,

    /// Index of the segment containing the closest point
    seg_index: usize,

    /// Unclamped position of the query point along the segment, 0 at the start and 1 at the end
    t: f64,

    /// Unit vector along the segment
    direction: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while loading the map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Could not read the map file: {0}")]
    CsvError(csv::Error),

    #[error("The map must contain at least 2 samples, found {0}")]
    TooFewSamples(usize),

    #[error("Sample {0} of the map contains a non-finite value")]
    NonFiniteSample(usize),

    #[error("The {0} line of the map has zero length")]
    ZeroLength(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneMap {
    /// Load the map from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let reader = csv::Reader::from_path(path).map_err(MapError::CsvError)?;

        Self::from_csv(reader)
    }

    /// Load the map from any reader providing the CSV contents.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MapError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    /// Build the map from the three polylines.
    pub fn from_lines(
        center: Vec<Vector2<f64>>,
        upper: Vec<Vector2<f64>>,
        lower: Vec<Vector2<f64>>,
    ) -> Result<Self, MapError> {
        let num_samples = center.len().min(upper.len()).min(lower.len());
        if num_samples < 2 {
            return Err(MapError::TooFewSamples(num_samples));
        }

        for (name, line) in [("center", &center), ("upper", &upper), ("lower", &lower)].iter() {
            if let Some(i) = line.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
                return Err(MapError::NonFiniteSample(i));
            }

            if line.windows(2).all(|w| w[0] == w[1]) {
                return Err(MapError::ZeroLength(*name));
            }
        }

        // Repeated samples at either end of the centre line give zero length segments which
        // projection skips, so the ends are the outermost segments with some length.
        let mut usable = center
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1])
            .map(|(i, _)| i);
        let first_seg = usable.next().ok_or(MapError::ZeroLength("center"))?;
        let last_seg = usable.last().unwrap_or(first_seg);

        Ok(Self {
            center,
            upper,
            lower,
            end_segs: (first_seg, last_seg),
        })
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, MapError> {
        let mut center = vec![];
        let mut upper = vec![];
        let mut lower = vec![];

        for row in reader.deserialize() {
            let row: MapRow = row.map_err(MapError::CsvError)?;

            center.push(Vector2::new(row.center_x, row.center_y));
            upper.push(Vector2::new(row.upper_x, row.upper_y));
            lower.push(Vector2::new(row.lower_x, row.lower_y));
        }

        debug!("Read {} samples from the map file", center.len());

        Self::from_lines(center, upper, lower)
    }

    /// Number of samples in the map.
    pub fn num_samples(&self) -> usize {
        self.center.len()
    }
}

impl AffordanceEstimator for LaneMap {
    fn estimate(&self, pose: &NavPose) -> Affordance {
        let pos = pose.position_m;

        // Closest point on the centre line, map construction guarantees at least one segment
        let center = match project(&self.center, &pos) {
            Some(p) => p,
            None => return Affordance::default(),
        };

        // Lane direction in the direction of travel, and the normal pointing to its left
        let lane_dir = center.direction * pose.direction.sign();
        let left_normal = Vector2::new(-lane_dir.y, lane_dir.x);

        // Signed distance to the centre line, positive if the vehicle is left of it
        let offset = pos - center.point_m;
        let dist_center_m = if left_normal.dot(&offset) < 0.0 {
            -center.dist_m
        } else {
            center.dist_m
        };

        // Relative angle between the vehicle and the lane
        let lane_heading_rad = wrap_2pi(lane_dir.y.atan2(lane_dir.x));
        let rel_angle_rad = get_ang_dist_2pi(lane_heading_rad, wrap_2pi(pose.yaw_rad));

        // Work out which boundary is on the left by looking at where the upper boundary sits
        // relative to the centre line
        let (upper, lower) = match (
            project(&self.upper, &center.point_m),
            project(&self.lower, &center.point_m),
        ) {
            (Some(u), Some(l)) => (u, l),
            _ => return Affordance::default(),
        };
        let upper_is_left = left_normal.dot(&(upper.point_m - center.point_m)) >= 0.0;
        let (left_width_m, right_width_m, left_line, right_line) = if upper_is_left {
            (upper.dist_m, lower.dist_m, &self.upper, &self.lower)
        } else {
            (lower.dist_m, upper.dist_m, &self.lower, &self.upper)
        };

        let dist_left_m = project(left_line, &pos).map(|p| p.dist_m).unwrap_or(0.0);
        let dist_right_m = project(right_line, &pos).map(|p| p.dist_m).unwrap_or(0.0);

        // Off either end of the centre line is out of the lane
        let (first_seg, last_seg) = self.end_segs;
        let past_ends = (center.seg_index == first_seg && center.t < 0.0)
            || (center.seg_index == last_seg && center.t > 1.0);

        let within_width = if dist_center_m >= 0.0 {
            dist_center_m <= left_width_m
        } else {
            -dist_center_m <= right_width_m
        };

        Affordance {
            dist_center_m,
            dist_left_m,
            dist_right_m,
            rel_angle_rad,
            in_bound: !past_ends && within_width,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the closest point on a polyline to the given point.
///
/// Zero length segments are skipped. Returns `None` if there are no usable segments.
fn project(line: &[Vector2<f64>], point: &Vector2<f64>) -> Option<Projection> {
    let mut best: Option<Projection> = None;

    for (i, seg) in line.windows(2).enumerate() {
        let start = seg[0];
        let delta = seg[1] - seg[0];
        let len_sq = delta.norm_squared();

        if len_sq == 0.0 {
            continue;
        }

        let t = (point - start).dot(&delta) / len_sq;
        let point_m = start + delta * t.max(0.0).min(1.0);
        let dist_m = (point - point_m).norm();

        // Keep the first segment on ties, so points exactly on a vertex belong to the earlier one
        if best.map(|b| dist_m < b.dist_m).unwrap_or(true) {
            best = Some(Projection {
                point_m,
                dist_m,
                seg_index: i,
                t,
                direction: delta / len_sq.sqrt(),
            });
        }
    }

    best
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::afford::TravelDirection;
    use std::f64::consts::{FRAC_PI_2, PI};

    const STRAIGHT_MAP: &str = "center_x,center_y,upper_x,upper_y,lower_x,lower_y
0.0,0.0,0.0,3.0,0.0,-3.0
10.0,0.0,10.0,3.0,10.0,-3.0
20.0,0.0,20.0,3.0,20.0,-3.0
30.0,0.0,30.0,3.0,30.0,-3.0
";

    fn straight_map() -> LaneMap {
        LaneMap::from_reader(STRAIGHT_MAP.as_bytes()).unwrap()
    }

    fn pose(x: f64, y: f64, yaw_rad: f64, direction: TravelDirection) -> NavPose {
        NavPose {
            position_m: Vector2::new(x, y),
            yaw_rad,
            direction,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_load_map() {
        let map = straight_map();
        assert_eq!(map.num_samples(), 4);
    }

    #[test]
    fn test_load_errors() {
        let one_row = "center_x,center_y,upper_x,upper_y,lower_x,lower_y
0.0,0.0,0.0,3.0,0.0,-3.0
";
        assert!(matches!(
            LaneMap::from_reader(one_row.as_bytes()),
            Err(MapError::TooFewSamples(1))
        ));

        let bad_value = "center_x,center_y,upper_x,upper_y,lower_x,lower_y
0.0,0.0,0.0,3.0,0.0,-3.0
10.0,zero,10.0,3.0,10.0,-3.0
";
        assert!(matches!(
            LaneMap::from_reader(bad_value.as_bytes()),
            Err(MapError::CsvError(_))
        ));

        let missing_column = "center_x,center_y,upper_x,upper_y
0.0,0.0,0.0,3.0
10.0,0.0,10.0,3.0
";
        assert!(matches!(
            LaneMap::from_reader(missing_column.as_bytes()),
            Err(MapError::CsvError(_))
        ));

        let zero_length = "center_x,center_y,upper_x,upper_y,lower_x,lower_y
5.0,0.0,0.0,3.0,0.0,-3.0
5.0,0.0,10.0,3.0,10.0,-3.0
";
        assert!(matches!(
            LaneMap::from_reader(zero_length.as_bytes()),
            Err(MapError::ZeroLength("center"))
        ));

        assert!(matches!(
            LaneMap::load("/definitely/not/a/map.csv"),
            Err(MapError::CsvError(_))
        ));
    }

    #[test]
    fn test_non_finite_sample() {
        let r = LaneMap::from_lines(
            vec![Vector2::new(0.0, 0.0), Vector2::new(f64::NAN, 0.0)],
            vec![Vector2::new(0.0, 1.0), Vector2::new(1.0, 1.0)],
            vec![Vector2::new(0.0, -1.0), Vector2::new(1.0, -1.0)],
        );
        assert!(matches!(r, Err(MapError::NonFiniteSample(1))));
    }

    #[test]
    fn test_centred() {
        let a = straight_map().estimate(&pose(15.0, 0.0, 0.0, TravelDirection::Forward));

        assert!(a.in_bound);
        assert!(close(a.dist_center_m, 0.0));
        assert!(close(a.dist_left_m, 3.0));
        assert!(close(a.dist_right_m, 3.0));
        assert!(close(a.rel_angle_rad, 0.0));
    }

    #[test]
    fn test_left_of_centre() {
        let a = straight_map().estimate(&pose(15.0, 1.0, 0.2, TravelDirection::Forward));

        assert!(a.in_bound);
        assert!(close(a.dist_center_m, 1.0));
        assert!(close(a.dist_left_m, 2.0));
        assert!(close(a.dist_right_m, 4.0));
        assert!(close(a.rel_angle_rad, 0.2));
    }

    #[test]
    fn test_right_of_centre_turned_right() {
        let a = straight_map().estimate(&pose(15.0, -2.5, 2.0 * PI - 0.3, TravelDirection::Forward));

        assert!(a.in_bound);
        assert!(close(a.dist_center_m, -2.5));
        assert!(close(a.dist_left_m, 5.5));
        assert!(close(a.dist_right_m, 0.5));
        assert!(close(a.rel_angle_rad, -0.3));
    }

    #[test]
    fn test_reverse_direction() {
        // Travelling in -X, so the lower boundary is on the left
        let a = straight_map().estimate(&pose(15.0, 1.0, PI, TravelDirection::Reverse));

        assert!(a.in_bound);
        assert!(close(a.dist_center_m, -1.0));
        assert!(close(a.dist_left_m, 4.0));
        assert!(close(a.dist_right_m, 2.0));
        assert!(close(a.rel_angle_rad, 0.0));
    }

    #[test]
    fn test_out_of_bound() {
        let map = straight_map();

        // Outside the upper boundary
        let a = map.estimate(&pose(15.0, 3.5, 0.0, TravelDirection::Forward));
        assert!(!a.in_bound);
        assert!(close(a.dist_center_m, 3.5));

        // Outside the lower boundary
        let a = map.estimate(&pose(15.0, -4.0, 0.0, TravelDirection::Forward));
        assert!(!a.in_bound);

        // Before the start of the lane
        let a = map.estimate(&pose(-1.0, 0.0, 0.0, TravelDirection::Forward));
        assert!(!a.in_bound);

        // After the end of the lane
        let a = map.estimate(&pose(31.0, 0.0, 0.0, TravelDirection::Forward));
        assert!(!a.in_bound);

        // On the boundary counts as in bound
        let a = map.estimate(&pose(15.0, 3.0, 0.0, TravelDirection::Forward));
        assert!(a.in_bound);
    }

    #[test]
    fn test_repeated_end_samples() {
        // Spline exports often repeat the first and last samples
        let map = "center_x,center_y,upper_x,upper_y,lower_x,lower_y
0.0,0.0,0.0,3.0,0.0,-3.0
0.0,0.0,0.0,3.0,0.0,-3.0
30.0,0.0,30.0,3.0,30.0,-3.0
30.0,0.0,30.0,3.0,30.0,-3.0
";
        let map = LaneMap::from_reader(map.as_bytes()).unwrap();

        assert!(map.estimate(&pose(15.0, 0.0, 0.0, TravelDirection::Forward)).in_bound);

        let a = map.estimate(&pose(-1.0, 0.0, 0.0, TravelDirection::Forward));
        assert!(!a.in_bound);
        assert!(close(a.dist_center_m.abs(), 1.0));

        assert!(!map.estimate(&pose(31.0, 0.0, 0.0, TravelDirection::Forward)).in_bound);
    }

    #[test]
    fn test_bent_lane() {
        // Lane going +X then turning to +Y at (10, 0)
        let map = LaneMap::from_lines(
            vec![Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0)],
            vec![Vector2::new(0.0, 2.0), Vector2::new(8.0, 2.0), Vector2::new(8.0, 10.0)],
            vec![Vector2::new(0.0, -2.0), Vector2::new(12.0, -2.0), Vector2::new(12.0, 10.0)],
        )
        .unwrap();

        let a = map.estimate(&pose(10.5, 5.0, FRAC_PI_2, TravelDirection::Forward));

        assert!(a.in_bound);
        // Heading +Y, so being at x > 10 is right of centre
        assert!(close(a.dist_center_m, -0.5));
        assert!(close(a.dist_left_m, 2.5));
        assert!(close(a.dist_right_m, 1.5));
        assert!(close(a.rel_angle_rad, 0.0));
    }
}
