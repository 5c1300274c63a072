//! Robot control parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::movement::MovementParams;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the robot control state machine.
///
/// The `Default` values are the flight set, so tests and bench runs work
/// without a parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotCtrlParams {
    /// Stored energy level at or below which the robot heads for the base
    /// station. The threshold is inclusive.
    pub low_energy_threshold: u16,

    /// Number of ticks spent backing away from the perimeter wire.
    pub cutting_backwards_ticks: u32,

    /// Number of ticks spent rotating after backing away.
    pub cutting_rotating_ticks: u32,

    /// Forward speed while cutting inside the wire.
    ///
    /// Units: meters/second
    pub cutting_forward_speed_ms: f64,

    /// Speed while backing away from the wire, negative is backwards.
    ///
    /// Units: meters/second
    pub cutting_backwards_speed_ms: f64,

    /// Yaw rate while rotating to a new cutting heading.
    ///
    /// Units: radians/second
    pub cutting_rotating_omega_rads: f64,

    /// Wheel rate commanded on both wheels while crawling in search of the
    /// perimeter wire.
    ///
    /// Units: radians/second
    pub searching_wheel_omega_rads: f64,

    /// Wheel geometry used by the kinematics.
    pub movement: MovementParams,
}

impl Default for RobotCtrlParams {
    fn default() -> Self {
        Self {
            low_energy_threshold: 20,
            cutting_backwards_ticks: 50,
            cutting_rotating_ticks: 50,
            cutting_forward_speed_ms: 0.1,
            cutting_backwards_speed_ms: -0.1,
            cutting_rotating_omega_rads: 0.1,
            searching_wheel_omega_rads: 0.05,
            movement: MovementParams::default(),
        }
    }
}
