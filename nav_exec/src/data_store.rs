//! # Data Store

use crate::nav_ctrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // NavCtrl
    pub nav_ctrl_output: nav_ctrl::OutputData,
    pub nav_ctrl_status_rpt: nav_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of cycle overruns
    pub num_cycle_overruns: u64,

    /// Number of consecutive failed mode requests
    pub num_consec_mode_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_second = (cycle_frequency_hz as u128).max(1);

        self.is_1_hz_cycle = self.num_cycles % cycles_per_second == 0;

        self.nav_ctrl_output = nav_ctrl::OutputData::default();
        self.nav_ctrl_status_rpt = nav_ctrl::StatusReport::default();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_1_hz_cycle() {
        let mut ds = DataStore::default();
        let mut flags = vec![];

        for _ in 0..31 {
            ds.cycle_start(15.0);
            flags.push(ds.is_1_hz_cycle);
            ds.cycle_end();
        }

        let one_hz: Vec<usize> = flags.iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(one_hz, vec![0, 15, 30]);
    }

    #[test]
    fn test_slow_rate() {
        let mut ds = DataStore::default();

        // Rates below 1 Hz flag every cycle
        for _ in 0..3 {
            ds.cycle_start(0.5);
            assert!(ds.is_1_hz_cycle);
            ds.cycle_end();
        }
    }
}
