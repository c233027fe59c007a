//! Module interfaces
//!
//! Each cyclic module of an executable (for example `NavCtrl` in `nav_exec`) implements
//! [`State`]. The executable initialises the module once, then calls [`State::proc`] once per
//! control cycle with the data gathered at the start of that cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation, usually the module's parameters.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for one cycle of processing.
    type InputData;
    /// Data produced by one cycle, to be sent out by the executable.
    type OutputData;
    /// A report on the status of the module after the cycle.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Initialise the module.
    ///
    /// Modules which archive data open their archives inside `session` here.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle of the module.
    ///
    /// On success returns the cycle's output data and status report.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
