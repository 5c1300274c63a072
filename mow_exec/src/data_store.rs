//! # Data Store
//!
//! All module state owned by the control thread, gathered in one place.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::Eqpt;
use crate::robot_ctrl::RobotCtrl;
use crate::telem::StatusReport;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Tick management
    /// Number of ticks already executed
    pub num_ticks: u64,

    /// True if this tick falls on a 1Hz boundary
    pub is_1_hz_tick: bool,

    // Robot control
    pub robot_ctrl: RobotCtrl,

    // Monitoring
    /// Wall clock duration of the last tick's processing in seconds
    pub last_tick_dur_s: f64,

    /// Number of tick overruns since startup
    pub watchdog_count: u64,

    /// Number of consecutive tick overruns
    pub num_consec_overruns: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a tick.
    pub fn tick_start(&mut self, tick_frequency_hz: f64) {
        self.is_1_hz_tick = self.num_ticks % (tick_frequency_hz as u64) == 0;
    }

    /// Build the status report for the tick that just completed.
    pub fn status_report(&self, eqpt: &Eqpt, tick_period_s: f64) -> StatusReport {
        StatusReport {
            tick_period_s,
            last_tick_dur_s: self.last_tick_dur_s,
            num_ticks: self.num_ticks,
            watchdog_count: self.watchdog_count,
            robot: self.robot_ctrl.report(eqpt),
        }
    }
}
