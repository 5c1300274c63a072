//! # Differential drive kinematics
//!
//! Converts a body-frame movement demand, forward speed plus angular rate,
//! into individual wheel angular rates. This is a pure function of the demand
//! and the wheel geometry.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Wheel geometry parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MovementParams {
    /// Distance between the left and right wheel contact points.
    ///
    /// Units: meters
    pub wheel_base_m: f64,

    /// Radius of each drive wheel.
    ///
    /// Units: meters
    pub wheel_radius_m: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            wheel_base_m: 0.3,
            wheel_radius_m: 0.1,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Calculate the wheel angular rates which realise the given body-frame
/// demand.
///
/// # Inputs
/// - `speed_ms`: forward speed in meters/second, positive forwards.
/// - `omega_rads`: yaw rate in radians/second, positive turning left.
///
/// # Outputs
/// - `(left, right)` wheel angular rates in radians/second.
pub fn calc_wheels_omega(
    params: &MovementParams,
    speed_ms: f64,
    omega_rads: f64,
) -> (f64, f64) {
    let half_base = 0.5 * params.wheel_base_m;

    let left = (speed_ms - omega_rads * half_base) / params.wheel_radius_m;
    let right = (speed_ms + omega_rads * half_base) / params.wheel_radius_m;

    (left, right)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_line() {
        let params = MovementParams::default();

        // Equal wheel rates when driving straight, scaled by the wheel radius
        let (left, right) = calc_wheels_omega(&params, 0.1, 0.0);
        assert_eq!(left, right);
        assert!((left - 1.0).abs() < 1e-12);

        // Reversing flips the sign
        let (left, right) = calc_wheels_omega(&params, -0.1, 0.0);
        assert_eq!(left, right);
        assert!((left + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_turn() {
        let params = MovementParams::default();

        // Pure rotation gives opposite wheel rates
        let (left, right) = calc_wheels_omega(&params, 0.0, 0.1);
        assert_eq!(left, -right);
        // Positive omega turns left, so the right wheel leads
        assert!(right > 0.0);
    }

    #[test]
    fn test_zero_demand_is_zero_motion() {
        let params = MovementParams::default();

        assert_eq!(calc_wheels_omega(&params, 0.0, 0.0), (0.0, 0.0));
    }
}
