//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Sensor data acquisition (drained from the SensClient)
//!         - Navigation control processing:
//!             - Home position acquisition and frame reconciliation
//!             - Affordance estimation
//!             - Rule based control and command filtering
//!         - Command and affordance publication
//!         - Safe mode requests on the safety port
//!         - Archiving
//!
//! # Modules
//!
//! All modules (e.g. `nav_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::net::NetParams;
use nav_lib::{
    afford::LaneMap,
    afford_ctrl,
    cmd_server::CmdServer,
    data_store::DataStore,
    mode_client::ModeClient,
    nav_ctrl::{self, NavCtrl, NavMode},
    params::NavExecParams,
    sens_client::SensClient,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;
use std::time::Instant;
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use util::{
    host,
    module::State,
    logger::{logger_init, LevelFilter},
    session::Session,
    archive::Archived,
    time::rate_to_period,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new(
        "nav_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Affordance Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams = util::params::load(
        "nav_exec.toml"
    ).wrap_err("Could not load exec params")?;
    let nav_ctrl_params: nav_ctrl::Params = util::params::load(
        "nav_ctrl.toml"
    ).wrap_err("Could not load NavCtrl params")?;
    let afford_ctrl_params: afford_ctrl::Params = util::params::load(
        "afford_ctrl.toml"
    ).wrap_err("Could not load AffordCtrl params")?;
    let net_params: NetParams = util::params::load(
        "net.toml"
    ).wrap_err("Could not load net params")?;

    let cycle_period = rate_to_period(exec_params.loop_rate_hz)
        .ok_or_else(|| eyre!("Invalid loop rate: {} Hz", exec_params.loop_rate_hz))?;

    info!("Exec parameters loaded");

    // ---- LOAD MAP ----

    let mut map_path = host::get_sw_root()
        .wrap_err("Could not find the software root")?;
    map_path.push(&exec_params.map_path);

    let map = LaneMap::load(&map_path)
        .wrap_err_with(|| format!("Failed to load the map from {:?}", map_path))?;

    info!("Loaded map with {} samples from {:?}", map.num_samples(), map_path);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    let mut nav_ctrl = NavCtrl::default();
    nav_ctrl.init(
        nav_ctrl::InitData {
            params: nav_ctrl_params,
            afford_ctrl_params,
            estimator: Box::new(map),
        },
        &session
    ).wrap_err("Failed to initialise NavCtrl")?;
    info!("NavCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- SHUTDOWN SIGNAL ----

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
            .wrap_err("Failed to set the Ctrl-C handler")?;
    }

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let sens_client = {
        let c = SensClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise SensClient")?;
        info!("SensClient initialised");
        c
    };

    let mut cmd_server = {
        let s = CmdServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise CmdServer")?;
        info!("CmdServer initialised");
        s
    };

    let mut mode_client = {
        let c = ModeClient::new(&zmq_ctx, &net_params, nav_ctrl.safe_mode())
            .wrap_err("Failed to initialise ModeClient")?;
        info!("ModeClient initialised");
        c
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.loop_rate_hz);

        // ---- DATA INPUT ----

        let input = nav_ctrl::InputData::now(
            sens_client.drain(),
            shutdown.load(Ordering::SeqCst)
        );

        // ---- NAVIGATION CONTROL ----

        let (output, report) = nav_ctrl.proc(&input)
            .wrap_err("Error during NavCtrl processing")?;

        ds.nav_ctrl_output = output;
        ds.nav_ctrl_status_rpt = report;

        if report.mode == NavMode::Shutdown {
            info!("Shutdown requested, exiting main loop");
            break
        }

        if ds.is_1_hz_cycle {
            debug!("NavCtrl status: {:?}", ds.nav_ctrl_status_rpt);
        }

        // ---- OUTPUT ----

        if let Err(e) = cmd_server.send(&ds.nav_ctrl_output) {
            warn!("Could not publish the NavCtrl output: {}", e);
        }

        if let Some(request) = ds.nav_ctrl_output.mode_request {
            match mode_client.request(request) {
                Ok(r) => {
                    if !r.mode_sent {
                        warn!("Flight mode service did not forward the {:?} request", request);
                    }
                    ds.num_consec_mode_errors = 0;
                },
                Err(e) => {
                    warn!("Could not request {:?}: {}", request, e);
                    ds.num_consec_mode_errors += 1;

                    if ds.num_consec_mode_errors == exec_params.max_consec_mode_errors {
                        error!(
                            "{} consecutive mode requests failed, the vehicle may not be in a \
                            safe mode",
                            ds.num_consec_mode_errors
                        );
                    }
                }
            }
        }

        // ---- ARCHIVING ----

        if let Err(e) = nav_ctrl.write() {
            warn!("Could not archive NavCtrl data: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                ds.num_consec_cycle_overruns += 1;
                ds.num_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64(),
                    ds.num_consec_cycle_overruns
                );
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!(
        "End of execution after {} cycles ({} overruns)",
        ds.num_cycles,
        ds.num_cycle_overruns
    );

    Ok(())
}
