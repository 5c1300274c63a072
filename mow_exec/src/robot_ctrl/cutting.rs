//! Automatic cutting behaviour
//!
//! While cutting in automatic mode the robot bounces around inside the
//! perimeter wire: drive forward until the wire is reached, back away for a
//! fixed number of ticks, rotate for a fixed number of ticks, repeat. A single
//! countdown is shared by the substates and runs once per tick before the
//! substate is evaluated.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::{CuttingSubstate, RobotCtrl, SearchingSubstate, TopState};
use crate::eqpt::Eqpt;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotCtrl {
    /// Derive the movement demand for one automatic cutting tick.
    ///
    /// May flip the cutting substate in place, or request the transition to
    /// searching when energy runs low, in which case the substates are not
    /// evaluated at all this tick.
    pub(crate) fn cutting_automatic(&mut self, eqpt: &mut Eqpt) -> (f64, f64) {
        // Default no movement
        let mut speed_ms = 0.0;
        let mut omega_rads = 0.0;

        // Search for the base station if stored energy is low. The threshold
        // is inclusive.
        let energy = self.stored_energy(eqpt);
        if energy <= self.params.low_energy_threshold {
            self.request(TopState::SearchingForBaseStation(
                SearchingSubstate::SearchingForPerimeterWire,
            ));

            return (speed_ms, omega_rads);
        }

        let mut cutting = match self.top_state() {
            TopState::Cutting(c) => c,
            // Dispatch contract broken, fail safe with no motion
            _ => return (speed_ms, omega_rads),
        };

        // The countdown is shared by the substates and runs before the switch
        cutting.ticks_left = cutting.ticks_left.saturating_sub(1);

        match cutting.substate {
            CuttingSubstate::Forward => {
                let signal = self.perimeter_signal(eqpt);

                if is_inside_perimeter_wire(signal) {
                    speed_ms = self.params.cutting_forward_speed_ms;
                } else {
                    // Wire reached, back away
                    cutting.ticks_left = self.params.cutting_backwards_ticks;
                    cutting.substate = CuttingSubstate::Backwards;
                }
            }

            CuttingSubstate::Backwards => {
                speed_ms = self.params.cutting_backwards_speed_ms;

                if cutting.ticks_left == 0 {
                    // Rotate to a new heading, starting next tick
                    // TODO: number of rotating ticks should be random
                    cutting.ticks_left = self.params.cutting_rotating_ticks;
                    cutting.substate = CuttingSubstate::Rotating;
                }
            }

            CuttingSubstate::Rotating => {
                omega_rads = self.params.cutting_rotating_omega_rads;

                if cutting.ticks_left == 0 {
                    // The expiry tick itself must not rotate
                    omega_rads = 0.0;
                    cutting.substate = CuttingSubstate::Forward;
                }
            }
        }

        // Substate changes apply within the tick, unlike top state
        // transitions
        self.current = TopState::Cutting(cutting);

        (speed_ms, omega_rads)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The sensed polarity is non-negative while the robot is inside the wire.
fn is_inside_perimeter_wire(signal: f64) -> bool {
    signal >= 0.0
}
