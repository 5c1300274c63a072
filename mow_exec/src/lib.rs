//! # Mower library.
//!
//! This library exposes the modules of the mower executive so that they can be
//! unit tested and reused.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store - aggregates all module state owned by the control thread
pub mod data_store;

/// Equipment facades - perimeter wire receiver, power monitor and wheel motors
pub mod eqpt;

/// Kinematics - converts a (speed, omega) demand into per-wheel angular rates
pub mod movement;

/// Executive-level parameters
pub mod params;

/// Robot control module - the hierarchical state machine ticked at a fixed cadence
pub mod robot_ctrl;

/// Operator shell - reads telecommands from the command line
pub mod shell;

/// Telecommand definitions - the commands an operator can send to the robot
pub mod tc;

/// Telecommand processor - applies telecommands to the data store
pub mod tc_processor;

/// Telemetry - the status report shared with the operator shell
pub mod telem;

/// Tick scheduler - fixed-period wake-up source for the control loop
pub mod ticker;
