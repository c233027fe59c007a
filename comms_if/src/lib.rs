//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (sensors, controller outputs, flight mode)
pub mod eqpt;

/// Network module
pub mod net;
