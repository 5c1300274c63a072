//! # Equipment facades
//!
//! This module defines the interfaces to the mower's sensing and actuation
//! hardware. The control logic only ever talks to these traits, so the
//! executive can run against simulated equipment ([`sim`]) and the tests can
//! run against stubs.
//!
//! Each sensor exposes a fresh read, which may fail, and a cached read, which
//! returns the last successfully acquired value. A fresh read failure is never
//! fatal to the control loop: callers fall back to the cached value and count
//! the fault.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod sim;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by equipment accesses.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Sensor read failed: {0}")]
    ReadFailed(String),

    #[error("Actuator write failed: {0}")]
    WriteFailed(String),
}

/// Identifies one of the two drive wheels.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WheelSide {
    Left,
    Right,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Perimeter wire receiver.
///
/// The sensed signal polarity indicates whether the mower is inside
/// (non-negative) or outside (negative) the perimeter wire.
pub trait PerimeterWireRx {
    /// Acquire a fresh signal level from the receiver.
    fn signal_level(&mut self) -> Result<f64, EqptError>;

    /// The most recently acquired signal level.
    fn cached_signal_level(&self) -> f64;
}

/// Stored energy (battery charge) monitor.
pub trait PowerMonitor {
    /// Acquire a fresh stored energy level, in the range `0..=max_energy_level()`.
    fn stored_energy_level(&mut self) -> Result<u16, EqptError>;

    /// The most recently acquired stored energy level.
    fn cached_stored_energy_level(&self) -> u16;

    /// The energy level reported when the battery is full.
    fn max_energy_level(&self) -> u16;
}

/// A single drive wheel motor.
pub trait Motor {
    /// Demand the given angular rate from the motor.
    ///
    /// Units: radians/second, positive is the forwards rolling direction.
    fn set_omega(&mut self, omega_rads: f64) -> Result<(), EqptError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The full set of equipment the control logic needs each tick.
pub struct Eqpt {
    pub perimeter: Box<dyn PerimeterWireRx + Send>,
    pub power: Box<dyn PowerMonitor + Send>,
    pub left_motor: Box<dyn Motor + Send>,
    pub right_motor: Box<dyn Motor + Send>,
}
