//! Implementations for the NavCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Instant;
use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{NavCtrlError, NavMode, Params};
use crate::{
    afford::{Affordance, AffordanceEstimator, NavPose},
    afford_ctrl::{self, calc_affordance_cmd},
    cmd_filter::{CmdFilter, ModeRequest},
    frame::{compass_to_yaw, FrameReconciler, VehiclePose},
    geo::{compute_offset, PlanarOffset},
};
use comms_if::eqpt::{
    afford::{AffordanceMsg, YawCmd},
    nav::{GeodeticPosition, NavSensData},
};
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::{self, Session},
    throttle::Throttle,
    time::seconds_to_duration,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation control module state
#[derive(Default)]
pub struct NavCtrl {
    params: Params,
    afford_ctrl_params: afford_ctrl::Params,
    estimator: Option<Box<dyn AffordanceEstimator + Send>>,

    mode: NavMode,

    home: Option<GeodeticPosition>,
    reconciler: Option<FrameReconciler>,
    settle_start: Option<Instant>,

    /// Latest local pose as received, kept so it can be reconciled once the offset is known
    raw_local_pose: Option<([f64; 3], [f64; 4])>,
    pose: Option<VehiclePose>,
    control_yaw_rad: Option<f64>,
    global_position: Option<GeodeticPosition>,
    last_sens_instant: Option<Instant>,

    affordance: Option<Affordance>,
    cmd_filter: CmdFilter,

    home_warn: Throttle,
    no_pose_warn: Throttle,
    stale_warn: Throttle,
    telem_log: Throttle,
    num_home_warnings: u64,

    report: StatusReport,

    tick: Option<TickRecord>,
    arch_tick: Archiver,
}

/// Data required to initialise NavCtrl.
pub struct InitData {
    pub params: Params,
    pub afford_ctrl_params: afford_ctrl::Params,
    pub estimator: Box<dyn AffordanceEstimator + Send>,
}

/// Input data to Navigation Control.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Sensor data received since the last cycle, oldest first
    pub sens_data: Vec<NavSensData>,

    /// True if the executable has been asked to terminate
    pub shutdown: bool,

    /// Monotonic time of this cycle
    pub instant: Instant,

    /// UTC time of this cycle, used to stamp the outputs
    pub timestamp: DateTime<Utc>,
}

/// Outputs of one NavCtrl cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutputData {
    /// Yaw rate command to publish, if any
    pub yaw_cmd: Option<YawCmd>,

    /// Affordance to publish, if any
    pub affordance: Option<AffordanceMsg>,

    /// Flight mode request to send on the safety port, if any
    pub mode_request: Option<ModeRequest>,
}

/// Status report for NavCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub mode: NavMode,
    pub home_known: bool,
    pub pose_known: bool,
    pub heading_known: bool,
    pub in_bound: bool,
    pub sensor_stale: bool,
}

/// One archived row per running cycle.
#[derive(Debug, Clone, Copy, Serialize)]
struct TickRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
    control_yaw_rad: f64,
    dist_center_m: f64,
    dist_left_m: f64,
    dist_right_m: f64,
    rel_angle_rad: f64,
    in_bound: bool,
    raw_cmd_rads: f64,
    cmd_rads: f64,
    mode_request: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputData {
    /// Build the input for a cycle happening now.
    pub fn now(sens_data: Vec<NavSensData>, shutdown: bool) -> Self {
        Self {
            sens_data,
            shutdown,
            instant: Instant::now(),
            timestamp: Utc::now(),
        }
    }
}

impl State for NavCtrl {
    type InitData = InitData;
    type InitError = NavCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module, opening its archive in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        *self = Self::new(init_data);

        self.arch_tick = Archiver::from_path(session, "nav_ctrl/tick.csv")
            .map_err(|e| NavCtrlError::ArchiveError(e.to_string()))?;

        Ok(())
    }

    /// Perform one cycle of Navigation Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if self.estimator.is_none() {
            return Err(NavCtrlError::NotInit)
        }

        self.tick = None;

        // Nothing is output once shut down
        if self.mode == NavMode::Shutdown {
            return Ok((OutputData::default(), self.report))
        }

        if input_data.shutdown {
            info!("Shutdown requested, NavCtrl stopping");
            self.mode = NavMode::Shutdown;
            self.report.mode = NavMode::Shutdown;
            return Ok((OutputData::default(), self.report))
        }

        for msg in input_data.sens_data.iter() {
            self.ingest(msg, input_data.instant);
        }

        if self.mode == NavMode::Init {
            info!("Waiting for the home position");
            self.mode = NavMode::WaitingForHome;
        }

        if self.mode == NavMode::WaitingForHome {
            self.wait_for_home(input_data.instant);
        }

        let output = match self.mode {
            NavMode::Running => self.run(input_data)?,
            _ => OutputData::default()
        };

        self.update_report(input_data.instant);

        Ok((output, self.report))
    }
}

impl Archived for NavCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(tick) = self.tick {
            self.arch_tick.serialise(tick)?;
        }

        Ok(())
    }
}

impl NavCtrl {
    /// Create a new NavCtrl without any archiving.
    pub fn new(init_data: InitData) -> Self {
        let warn_period_s = init_data.params.home_warn_period_s;

        Self {
            cmd_filter: CmdFilter::new(&init_data.afford_ctrl_params),
            home_warn: Throttle::from_secs_f64(warn_period_s),
            no_pose_warn: Throttle::from_secs_f64(warn_period_s),
            stale_warn: Throttle::from_secs_f64(warn_period_s),
            telem_log: Throttle::from_secs_f64(init_data.params.telem_period_s),
            estimator: Some(init_data.estimator),
            params: init_data.params,
            afford_ctrl_params: init_data.afford_ctrl_params,
            ..Default::default()
        }
    }

    /// Return to `Init`, forgetting the home position, the offset, all poses, the affordance and
    /// the last command.
    pub fn reset(&mut self) {
        self.mode = NavMode::Init;
        self.home = None;
        self.reconciler = None;
        self.settle_start = None;
        self.raw_local_pose = None;
        self.pose = None;
        self.control_yaw_rad = None;
        self.global_position = None;
        self.last_sens_instant = None;
        self.affordance = None;
        self.cmd_filter.reset();
        self.home_warn.reset();
        self.no_pose_warn.reset();
        self.stale_warn.reset();
        self.report = StatusReport::default();
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn home(&self) -> Option<GeodeticPosition> {
        self.home
    }

    /// Offset between the vehicle and map frames, once the home position is known.
    pub fn offset(&self) -> Option<PlanarOffset> {
        self.reconciler.map(|r| r.offset())
    }

    /// Vehicle pose in the map frame.
    pub fn pose(&self) -> Option<VehiclePose> {
        self.pose
    }

    pub fn affordance(&self) -> Option<Affordance> {
        self.affordance
    }

    pub fn global_position(&self) -> Option<GeodeticPosition> {
        self.global_position
    }

    pub fn last_cmd(&self) -> f64 {
        self.cmd_filter.last_cmd()
    }

    /// Number of warnings emitted while waiting for the home position.
    pub fn num_home_warnings(&self) -> u64 {
        self.num_home_warnings
    }

    /// Number of out of bound warnings emitted by the command filter.
    pub fn num_oob_warnings(&self) -> u64 {
        self.cmd_filter.num_oob_warnings()
    }

    /// The flight mode to request when the vehicle leaves the lane.
    pub fn safe_mode(&self) -> &str {
        &self.afford_ctrl_params.safe_mode
    }

    /// Update the internal state from one sensor message.
    fn ingest(&mut self, msg: &NavSensData, now: Instant) {
        match msg {
            NavSensData::Reset => {
                info!("Reset requested, NavCtrl returning to Init");
                self.reset();
            },
            NavSensData::Home(home) => match self.home {
                None => {
                    info!(
                        "Home position: lat {:.7} deg, lon {:.7} deg, alt {:.2} m",
                        home.lat_deg, home.lon_deg, home.alt_m
                    );
                    self.home = Some(*home);
                },
                Some(_) => trace!("Ignoring repeated home position {:?}", home)
            },
            NavSensData::GlobalPosition(pos) => {
                self.global_position = Some(*pos);
            },
            NavSensData::Compass { heading_deg } => {
                self.control_yaw_rad = Some(compass_to_yaw(*heading_deg));
            },
            NavSensData::LocalPose { position_m, orientation_q } => {
                self.raw_local_pose = Some((*position_m, *orientation_q));

                if let Some(r) = self.reconciler {
                    self.pose = Some(r.reconcile(*position_m, *orientation_q));
                }
            }
        }

        self.last_sens_instant = Some(now);
    }

    /// Compute the offset once home is known, then wait for the vehicle to settle.
    fn wait_for_home(&mut self, now: Instant) {
        let home = match self.home {
            Some(h) => h,
            None => {
                if self.home_warn.ready_at(now) {
                    warn!("Home position not available, waiting");
                    self.num_home_warnings += 1;
                }
                return
            }
        };

        if self.reconciler.is_none() {
            let offset = compute_offset(&self.params.map_origin, &home);
            info!(
                "Offset to the map origin: x = {:.3} m, y = {:.3} m",
                offset.x_m, offset.y_m
            );

            let reconciler = FrameReconciler::new(offset);

            // Local poses received before the offset was known
            if let Some((position_m, orientation_q)) = self.raw_local_pose {
                self.pose = Some(reconciler.reconcile(position_m, orientation_q));
            }

            self.reconciler = Some(reconciler);
            self.settle_start = Some(now);
        }

        let settled = match self.settle_start {
            Some(start) => {
                now.saturating_duration_since(start) >= seconds_to_duration(self.params.settle_time_s)
            },
            None => false
        };

        if settled {
            info!("Starting navigation control");
            self.mode = NavMode::Running;
        }
    }

    /// Run one control tick.
    fn run(&mut self, input_data: &InputData) -> Result<OutputData, NavCtrlError> {
        let now = input_data.instant;

        let (pose, control_yaw_rad) = match (self.pose, self.control_yaw_rad) {
            (Some(p), Some(y)) => (p, y),
            _ => {
                if self.no_pose_warn.ready_at(now) {
                    warn!("No local pose or compass heading available, commanding zero yaw rate");
                }

                return Ok(OutputData {
                    yaw_cmd: Some(YawCmd {
                        timestamp: input_data.timestamp,
                        yaw_rate_rads: 0.0,
                    }),
                    ..Default::default()
                })
            }
        };

        let nav_pose = NavPose {
            position_m: Vector2::new(pose.x_m, pose.y_m),
            yaw_rad: control_yaw_rad,
            direction: self.params.travel_direction,
        };

        let affordance = match self.estimator {
            Some(ref e) => e.estimate(&nav_pose),
            None => return Err(NavCtrlError::NotInit)
        };

        let (raw_cmd, in_bound) = calc_affordance_cmd(
            &affordance,
            self.afford_ctrl_params.max_yawrate_rads,
            &self.afford_ctrl_params.gains(),
        );
        let (cmd, mode_request) = self.cmd_filter.filter(raw_cmd, in_bound, now);

        trace!(
            "NavCtrl: pose ({:.3}, {:.3}) yaw {:.3}, {:?}, cmd {:.4} rad/s",
            pose.x_m, pose.y_m, control_yaw_rad, affordance, cmd
        );

        self.affordance = Some(affordance);

        if self.telem_log.ready_at(now) {
            match self.global_position {
                Some(p) => info!(
                    "Global position: lat {:.7} deg, lon {:.7} deg, alt {:.2} m",
                    p.lat_deg, p.lon_deg, p.alt_m
                ),
                None => debug!("No global position received yet")
            }
        }

        self.tick = Some(TickRecord {
            time_s: session::get_elapsed_seconds(),
            x_m: pose.x_m,
            y_m: pose.y_m,
            heading_rad: pose.heading_rad,
            control_yaw_rad,
            dist_center_m: affordance.dist_center_m,
            dist_left_m: affordance.dist_left_m,
            dist_right_m: affordance.dist_right_m,
            rel_angle_rad: affordance.rel_angle_rad,
            in_bound,
            raw_cmd_rads: raw_cmd,
            cmd_rads: cmd,
            mode_request: mode_request.is_some(),
        });

        Ok(OutputData {
            yaw_cmd: Some(YawCmd {
                timestamp: input_data.timestamp,
                yaw_rate_rads: cmd,
            }),
            affordance: Some(affordance.to_msg(input_data.timestamp)),
            mode_request,
        })
    }

    fn update_report(&mut self, now: Instant) {
        let sensor_stale = match (self.params.sensor_timeout_s, self.last_sens_instant) {
            (Some(timeout_s), Some(last)) => {
                now.saturating_duration_since(last) > seconds_to_duration(timeout_s)
            },
            _ => false
        };

        if sensor_stale && self.mode == NavMode::Running && self.stale_warn.ready_at(now) {
            warn!(
                "No sensor data received for more than {:.2} s",
                self.params.sensor_timeout_s.unwrap_or_default()
            );
        }

        self.report = StatusReport {
            mode: self.mode,
            home_known: self.home.is_some(),
            pose_known: self.pose.is_some(),
            heading_known: self.control_yaw_rad.is_some(),
            in_bound: self.affordance.map(|a| a.in_bound).unwrap_or(false),
            sensor_stale,
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use crate::afford::LaneMap;

    /// Estimator which always returns the same affordance.
    struct FixedEstimator(Affordance);

    impl AffordanceEstimator for FixedEstimator {
        fn estimate(&self, _pose: &NavPose) -> Affordance {
            self.0
        }
    }

    const STRAIGHT_MAP: &str = "center_x,center_y,upper_x,upper_y,lower_x,lower_y
0.0,0.0,0.0,3.0,0.0,-3.0
30.0,0.0,30.0,3.0,30.0,-3.0
";

    fn origin() -> GeodeticPosition {
        GeodeticPosition::new(38.5885251, -121.7055038, 0.0)
    }

    fn in_bound(dist_center_m: f64) -> Affordance {
        Affordance {
            dist_center_m,
            dist_left_m: 3.0 - dist_center_m,
            dist_right_m: 3.0 + dist_center_m,
            rel_angle_rad: 0.0,
            in_bound: true,
        }
    }

    fn nav_ctrl<E>(estimator: E, settle_time_s: f64) -> NavCtrl
    where
        E: AffordanceEstimator + Send + 'static
    {
        NavCtrl::new(InitData {
            params: Params {
                map_origin: origin(),
                settle_time_s,
                ..Default::default()
            },
            afford_ctrl_params: afford_ctrl::Params::default(),
            estimator: Box::new(estimator),
        })
    }

    fn input(instant: Instant, sens_data: Vec<NavSensData>) -> InputData {
        InputData {
            sens_data,
            shutdown: false,
            instant,
            timestamp: Utc::now(),
        }
    }

    fn pose_msgs(x: f64, y: f64, heading_deg: f64) -> Vec<NavSensData> {
        vec![
            NavSensData::LocalPose {
                position_m: [x, y, 5.0],
                orientation_q: [0.0, 0.0, 0.0, 1.0],
            },
            NavSensData::Compass { heading_deg },
        ]
    }

    #[test]
    fn test_not_init() {
        let mut nc = NavCtrl::default();

        assert!(matches!(
            nc.proc(&InputData::now(vec![], false)),
            Err(NavCtrlError::NotInit)
        ));
    }

    #[test]
    fn test_waits_for_home() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(0.0)), 0.0);
        let t0 = Instant::now();

        assert_eq!(nc.mode(), NavMode::Init);

        let (out, rpt) = nc.proc(&input(t0, pose_msgs(1.0, 2.0, 0.0))).unwrap();
        assert_eq!(nc.mode(), NavMode::WaitingForHome);
        assert_eq!(out, OutputData::default());
        assert!(!rpt.home_known);
        assert!(nc.offset().is_none());

        let (out, _) = nc.proc(&input(t0 + Duration::from_secs(5), vec![])).unwrap();
        assert_eq!(nc.mode(), NavMode::WaitingForHome);
        assert_eq!(out, OutputData::default());
    }

    #[test]
    fn test_home_warning_rate_limited() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(0.0)), 0.0);
        let t0 = Instant::now();

        nc.proc(&input(t0, vec![])).unwrap();
        assert_eq!(nc.num_home_warnings(), 1);

        nc.proc(&input(t0 + Duration::from_secs(1), vec![])).unwrap();
        assert_eq!(nc.num_home_warnings(), 1);

        nc.proc(&input(t0 + Duration::from_secs(2), vec![])).unwrap();
        assert_eq!(nc.num_home_warnings(), 2);

        // No more warnings once home is known
        nc.proc(&input(t0 + Duration::from_secs(5), vec![NavSensData::Home(origin())]))
            .unwrap();
        assert_eq!(nc.num_home_warnings(), 2);
    }

    #[test]
    fn test_settle_time() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(0.0)), 1.0);
        let t0 = Instant::now();

        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(0.0, 0.0, 90.0));

        nc.proc(&input(t0, msgs)).unwrap();
        assert_eq!(nc.mode(), NavMode::WaitingForHome);
        assert!(nc.offset().is_some());

        let (out, _) = nc.proc(&input(t0 + Duration::from_millis(500), vec![])).unwrap();
        assert_eq!(nc.mode(), NavMode::WaitingForHome);
        assert!(out.yaw_cmd.is_none());

        let (out, rpt) = nc.proc(&input(t0 + Duration::from_secs(1), vec![])).unwrap();
        assert_eq!(nc.mode(), NavMode::Running);
        assert_eq!(rpt.mode, NavMode::Running);
        assert!(out.yaw_cmd.is_some());
        assert!(out.affordance.is_some());
    }

    #[test]
    fn test_first_home_wins() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(0.0)), 0.0);
        let home = GeodeticPosition::new(38.5880, -121.7060, 10.0);
        let other = GeodeticPosition::new(38.0, -121.0, 0.0);

        nc.proc(&input(
            Instant::now(),
            vec![NavSensData::Home(home), NavSensData::Home(other)],
        ))
        .unwrap();
        nc.proc(&input(Instant::now(), vec![NavSensData::Home(other)]))
            .unwrap();

        assert_eq!(nc.home(), Some(home));
        assert_eq!(nc.offset(), Some(compute_offset(&origin(), &home)));
    }

    #[test]
    fn test_pose_before_home_is_reconciled() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(0.0)), 10.0);
        let t0 = Instant::now();

        nc.proc(&input(t0, pose_msgs(4.0, -2.0, 0.0))).unwrap();
        assert!(nc.pose().is_none());

        // Home at the map origin so the offset is zero
        nc.proc(&input(t0, vec![NavSensData::Home(origin())])).unwrap();

        let pose = nc.pose().unwrap();
        assert_eq!(pose.x_m, 4.0);
        assert_eq!(pose.y_m, -2.0);
    }

    #[test]
    fn test_running_in_bound() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(1.0)), 0.0);

        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(0.0, 0.0, 90.0));

        let (out, rpt) = nc.proc(&input(Instant::now(), msgs)).unwrap();

        assert_eq!(nc.mode(), NavMode::Running);
        assert!(rpt.in_bound);
        assert_eq!(out.mode_request, None);

        // k_dist_center of 0.5 on 1 m left of centre
        let cmd = out.yaw_cmd.unwrap();
        assert_eq!(cmd.yaw_rate_rads, -0.5);
        assert_eq!(nc.last_cmd(), -0.5);

        let aff = out.affordance.unwrap();
        assert_eq!(aff.dist_center_m, 1.0);
        assert_eq!(aff.timestamp, cmd.timestamp);
    }

    #[test]
    fn test_running_out_of_bound() {
        let mut oob = in_bound(4.0);
        oob.in_bound = false;
        let mut nc = nav_ctrl(FixedEstimator(oob), 0.0);

        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(0.0, 0.0, 90.0));

        let t0 = Instant::now();
        let (out, rpt) = nc.proc(&input(t0, msgs)).unwrap();

        assert!(!rpt.in_bound);
        assert_eq!(out.yaw_cmd.unwrap().yaw_rate_rads, 0.0);
        assert_eq!(out.mode_request, Some(ModeRequest::PositionHold));
        assert!(!out.affordance.unwrap().in_bound);
        assert_eq!(nc.last_cmd(), 0.0);
        assert_eq!(nc.num_oob_warnings(), 1);

        // Issued again on every out of bound cycle, the warning is rate limited
        let (out, _) = nc.proc(&input(t0 + Duration::from_secs(1), vec![])).unwrap();
        assert_eq!(out.mode_request, Some(ModeRequest::PositionHold));
        assert_eq!(nc.num_oob_warnings(), 1);

        let (out, _) = nc.proc(&input(t0 + Duration::from_secs(2), vec![])).unwrap();
        assert_eq!(out.mode_request, Some(ModeRequest::PositionHold));
        assert_eq!(nc.num_oob_warnings(), 2);
    }

    #[test]
    fn test_running_without_pose() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(1.0)), 0.0);

        let (out, rpt) = nc
            .proc(&input(Instant::now(), vec![NavSensData::Home(origin())]))
            .unwrap();

        assert_eq!(nc.mode(), NavMode::Running);
        assert!(!rpt.pose_known);
        assert_eq!(out.yaw_cmd.unwrap().yaw_rate_rads, 0.0);
        assert!(out.affordance.is_none());
        assert!(out.mode_request.is_none());
    }

    #[test]
    fn test_with_lane_map() {
        let map = LaneMap::from_reader(STRAIGHT_MAP.as_bytes()).unwrap();
        let mut nc = nav_ctrl(map, 0.0);

        // Heading East (compass 90 deg) 1 m left of the centre line
        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(15.0, 1.0, 90.0));

        let (out, _) = nc.proc(&input(Instant::now(), msgs)).unwrap();

        let aff = nc.affordance().unwrap();
        assert!(aff.in_bound);
        assert!((aff.dist_center_m - 1.0).abs() < 1e-9);
        assert!(aff.rel_angle_rad.abs() < 1e-9);
        assert!((out.yaw_cmd.unwrap().yaw_rate_rads + 0.5).abs() < 1e-9);

        // Drive out of the lane
        let (out, _) = nc
            .proc(&input(Instant::now(), pose_msgs(15.0, 4.0, 90.0)))
            .unwrap();
        assert_eq!(out.mode_request, Some(ModeRequest::PositionHold));
    }

    #[test]
    fn test_shutdown() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(1.0)), 0.0);

        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(0.0, 0.0, 90.0));
        nc.proc(&input(Instant::now(), msgs)).unwrap();
        assert_eq!(nc.mode(), NavMode::Running);

        let mut stop = input(Instant::now(), pose_msgs(0.0, 0.0, 90.0));
        stop.shutdown = true;
        let (out, rpt) = nc.proc(&stop).unwrap();
        assert_eq!(nc.mode(), NavMode::Shutdown);
        assert_eq!(rpt.mode, NavMode::Shutdown);
        assert_eq!(out, OutputData::default());

        // Nothing is published afterwards, even with new data
        let (out, _) = nc
            .proc(&input(Instant::now(), pose_msgs(0.0, 0.0, 90.0)))
            .unwrap();
        assert_eq!(nc.mode(), NavMode::Shutdown);
        assert_eq!(out, OutputData::default());
    }

    #[test]
    fn test_reset_message() {
        let mut nc = nav_ctrl(FixedEstimator(in_bound(1.0)), 0.0);

        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(0.0, 0.0, 90.0));
        nc.proc(&input(Instant::now(), msgs)).unwrap();
        assert_eq!(nc.last_cmd(), -0.5);

        let (out, rpt) = nc
            .proc(&input(Instant::now(), vec![NavSensData::Reset]))
            .unwrap();

        assert_eq!(nc.mode(), NavMode::WaitingForHome);
        assert!(!rpt.home_known);
        assert!(nc.home().is_none());
        assert!(nc.offset().is_none());
        assert!(nc.pose().is_none());
        assert!(nc.affordance().is_none());
        assert_eq!(nc.last_cmd(), 0.0);
        assert_eq!(out, OutputData::default());

        // A new home is accepted after the reset
        let home = GeodeticPosition::new(38.5880, -121.7060, 0.0);
        nc.proc(&input(Instant::now(), vec![NavSensData::Home(home)]))
            .unwrap();
        assert_eq!(nc.home(), Some(home));
        assert_eq!(nc.mode(), NavMode::Running);
    }

    #[test]
    fn test_sensor_stale() {
        let mut nc = NavCtrl::new(InitData {
            params: Params {
                map_origin: origin(),
                settle_time_s: 0.0,
                sensor_timeout_s: Some(0.5),
                ..Default::default()
            },
            afford_ctrl_params: afford_ctrl::Params::default(),
            estimator: Box::new(FixedEstimator(in_bound(1.0))),
        });
        let t0 = Instant::now();

        let mut msgs = vec![NavSensData::Home(origin())];
        msgs.extend(pose_msgs(0.0, 0.0, 90.0));
        let (_, rpt) = nc.proc(&input(t0, msgs)).unwrap();
        assert!(!rpt.sensor_stale);

        let (out, rpt) = nc.proc(&input(t0 + Duration::from_secs(1), vec![])).unwrap();
        assert!(rpt.sensor_stale);

        // Staleness does not change the command
        assert_eq!(out.yaw_cmd.unwrap().yaw_rate_rads, -0.5);
    }
}
