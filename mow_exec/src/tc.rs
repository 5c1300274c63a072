//! # Telecommand definitions
//!
//! The commands an operator can send to the robot, parsed from a shell line.
//! Malformed input never reaches the state machine: parsing fails at the
//! shell and the aggregate is left untouched.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use structopt::clap::AppSettings;
use structopt::StructOpt;
use thiserror::Error;

// Internal
use crate::robot_ctrl::Mode;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the robot by the operator.
#[derive(Debug, Clone, Copy, StructOpt)]
#[structopt(
    name = "robot",
    about = "RoboMower operator telecommands",
    setting = AppSettings::NoBinaryName
)]
pub enum Tc {
    /// Start the robot, forcing it into the starting state.
    Start,

    /// Stop the robot immediately, forcing it into the idle state.
    Stop,

    /// Print the robot status report.
    Status,

    /// Select the operating mode.
    Mode {
        /// Either "manual" or "automatic"
        mode: Mode,
    },

    /// Set the manual movement setpoint.
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Manual {
        /// Forward speed in meters/second
        speed_ms: f64,

        /// Yaw rate in radians/second
        omega_rads: f64,
    },
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("{0}")]
    Invalid(#[from] structopt::clap::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Tc {
    /// Parse a telecommand from a whitespace-separated shell line.
    pub fn from_line(line: &str) -> Result<Self, TcParseError> {
        Ok(Tc::from_iter_safe(line.split_whitespace())?)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
