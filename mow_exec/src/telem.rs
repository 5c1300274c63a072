//! # Telemetry
//!
//! The status report summarising the executive's state, published by the
//! control thread once per tick into a shared slot read by the operator shell.
//! The core only builds the snapshot, rendering it as text is the shell's job.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::Serialize;
use std::sync::{Arc, Mutex};

// Internal
use crate::robot_ctrl::RobotReport;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Status report for one tick of the executive.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Configured tick period in seconds
    pub tick_period_s: f64,

    /// Wall clock duration of the last tick's processing in seconds
    pub last_tick_dur_s: f64,

    /// Number of ticks executed since startup
    pub num_ticks: u64,

    /// Number of tick overruns since startup
    pub watchdog_count: u64,

    /// Snapshot of the robot control state machine
    pub robot: RobotReport,
}

/// Shared slot holding the most recent status report.
pub type TmShare = Arc<Mutex<StatusReport>>;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a new telemetry share holding a default report.
pub fn new_share() -> TmShare {
    Arc::new(Mutex::new(StatusReport::default()))
}
