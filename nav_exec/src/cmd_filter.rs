//! # Command Filter
//!
//! Last stage before a command leaves the executable. In bound commands are passed through a
//! first order low-pass filter. Out of bound commands are overridden with zero and a request to
//! switch the vehicle into its position holding mode is raised.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

use log::warn;
use serde::Serialize;

use util::{maths::clamp, throttle::Throttle};

use crate::afford_ctrl::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Supervises the commands issued by the controller, owning the last issued command.
#[derive(Debug, Clone)]
pub struct CmdFilter {
    last_cmd: f64,
    alpha: f64,
    oob_warn: Throttle,
    num_oob_warnings: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A request to change the flight mode of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModeRequest {
    /// Hand control back to the autopilot's position holding mode.
    PositionHold,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CmdFilter {
    fn default() -> Self {
        Self::new(&Params::default())
    }
}

impl CmdFilter {
    /// Create a new filter from the controller parameters.
    ///
    /// The filter weight is clamped into `[0, 1]`, a non-finite weight disables the filter.
    pub fn new(params: &Params) -> Self {
        let alpha = if params.filter_alpha.is_finite() {
            clamp(&params.filter_alpha, &0.0, &1.0)
        } else {
            warn!(
                "Invalid filter weight {}, filtering disabled",
                params.filter_alpha
            );
            1.0
        };

        Self {
            last_cmd: 0.0,
            alpha,
            oob_warn: Throttle::from_secs_f64(params.oob_warn_period_s),
            num_oob_warnings: 0,
        }
    }

    /// Filter the raw command issued at `now`, updating the last issued command.
    ///
    /// The out of bound warning is emitted at most once per `oob_warn_period_s`, the mode request
    /// is returned on every out of bound call.
    pub fn filter(
        &mut self,
        raw_cmd: f64,
        in_bound: bool,
        now: Instant,
    ) -> (f64, Option<ModeRequest>) {
        let (cmd, request) = filter_command(raw_cmd, self.last_cmd, in_bound, self.alpha);

        if request.is_some() && self.oob_warn.ready_at(now) {
            warn!("Vehicle is out of bound, requesting position hold");
            self.num_oob_warnings += 1;
        }

        self.last_cmd = cmd;

        (cmd, request)
    }

    /// The last command issued by the filter.
    pub fn last_cmd(&self) -> f64 {
        self.last_cmd
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of out of bound warnings emitted so far.
    pub fn num_oob_warnings(&self) -> u64 {
        self.num_oob_warnings
    }

    /// Forget the last command.
    pub fn reset(&mut self) {
        self.last_cmd = 0.0;
        self.oob_warn.reset();
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Filter a command.
///
/// When out of bound the output is always zero with a [`ModeRequest::PositionHold`]. Otherwise
/// the output is `alpha * raw + (1 - alpha) * last`.
pub fn filter_command(
    raw_cmd: f64,
    last_cmd: f64,
    in_bound: bool,
    alpha: f64,
) -> (f64, Option<ModeRequest>) {
    if !in_bound {
        return (0.0, Some(ModeRequest::PositionHold));
    }

    (alpha * raw_cmd + (1.0 - alpha) * last_cmd, None)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn params(filter_alpha: f64) -> Params {
        Params {
            filter_alpha,
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_command() {
        assert_eq!(filter_command(10.0, 2.0, true, 0.5), (6.0, None));
        assert_eq!(filter_command(10.0, 2.0, true, 1.0), (10.0, None));
        assert_eq!(filter_command(10.0, 2.0, true, 0.0), (2.0, None));
        assert_eq!(
            filter_command(12.0, 3.0, false, 1.0),
            (0.0, Some(ModeRequest::PositionHold))
        );
        assert_eq!(
            filter_command(-4.0, 0.0, false, 0.3),
            (0.0, Some(ModeRequest::PositionHold))
        );
    }

    #[test]
    fn test_out_of_bound_resets_last() {
        let mut f = CmdFilter::new(&params(1.0));

        assert_eq!(f.filter(3.0, true, Instant::now()), (3.0, None));
        assert_eq!(f.last_cmd(), 3.0);

        assert_eq!(f.filter(12.0, false, Instant::now()), (0.0, Some(ModeRequest::PositionHold)));
        assert_eq!(f.last_cmd(), 0.0);
    }

    #[test]
    fn test_low_pass() {
        let mut f = CmdFilter::new(&params(0.5));

        assert_eq!(f.filter(2.0, true, Instant::now()), (1.0, None));
        assert_eq!(f.filter(2.0, true, Instant::now()), (1.5, None));
        assert_eq!(f.filter(2.0, true, Instant::now()), (1.75, None));

        // Recovery after an override starts from zero
        f.filter(2.0, false, Instant::now());
        assert_eq!(f.filter(2.0, true, Instant::now()), (1.0, None));

        f.reset();
        assert_eq!(f.last_cmd(), 0.0);
    }

    #[test]
    fn test_alpha_clamped() {
        assert_eq!(CmdFilter::new(&params(1.5)).alpha(), 1.0);
        assert_eq!(CmdFilter::new(&params(-0.2)).alpha(), 0.0);
        assert_eq!(CmdFilter::new(&params(f64::NAN)).alpha(), 1.0);
        assert_eq!(CmdFilter::new(&params(0.25)).alpha(), 0.25);
    }

    #[test]
    fn test_alpha_zero_holds_last() {
        let mut f = CmdFilter::new(&params(0.0));

        // Nothing but an override or a reset can move the command away from zero
        assert_eq!(f.filter(5.0, true, Instant::now()), (0.0, None));
        assert_eq!(f.filter(-5.0, true, Instant::now()), (0.0, None));
    }

    #[test]
    fn test_oob_warning_rate_limited() {
        let mut f = CmdFilter::new(&Params {
            oob_warn_period_s: 2.0,
            ..Default::default()
        });
        let t0 = Instant::now();

        // Every tick requests position hold, only some of them warn
        assert_eq!(f.filter(1.0, false, t0).1, Some(ModeRequest::PositionHold));
        assert_eq!(f.num_oob_warnings(), 1);

        assert_eq!(
            f.filter(1.0, false, t0 + Duration::from_secs(1)).1,
            Some(ModeRequest::PositionHold)
        );
        assert_eq!(f.num_oob_warnings(), 1);

        assert_eq!(
            f.filter(1.0, false, t0 + Duration::from_secs(2)).1,
            Some(ModeRequest::PositionHold)
        );
        assert_eq!(f.num_oob_warnings(), 2);

        // In bound ticks never warn
        f.filter(1.0, true, t0 + Duration::from_secs(10));
        assert_eq!(f.num_oob_warnings(), 2);

        // After a reset the next out of bound tick warns straight away
        f.filter(1.0, false, t0 + Duration::from_secs(11));
        assert_eq!(f.num_oob_warnings(), 3);
        f.reset();
        f.filter(1.0, false, t0 + Duration::from_secs(11));
        assert_eq!(f.num_oob_warnings(), 4);
    }
}
