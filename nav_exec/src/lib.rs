//! # Navigation library.
//!
//! This library allows other crates in the workspace to access items defined inside the
//! navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Affordance estimation - where the vehicle is relative to its lane
pub mod afford;

/// Affordance control - rule based yaw rate controller
pub mod afford_ctrl;

/// Command filter - low-pass filter and out of bound supervision of the commands
pub mod cmd_filter;

/// Command server - publishes commands and affordances
pub mod cmd_server;

/// Global data store for the executable
pub mod data_store;

/// Coordinate frame reconciliation between the vehicle and the map
pub mod frame;

/// Geodetic computations
pub mod geo;

/// Flight mode client - the safety port
pub mod mode_client;

/// Navigation control - the control loop state machine
pub mod nav_ctrl;

/// Executable parameters
pub mod params;

/// Sensor client - recieves sensor data from the middleware bridge
pub mod sens_client;
