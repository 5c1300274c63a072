//! Searching for the base station
//!
//! Both substates here are acknowledged placeholders: the search advances
//! unconditionally after a single tick of straight crawl, and "following"
//! immediately declares the base station reached. A real implementation replaces the single-shot advances
//! with actual wire detection and line following; the structure below is the
//! extension point for that work.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::{set_wheel_omegas, RobotCtrl, SearchingSubstate, TopState};
use crate::eqpt::Eqpt;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotCtrl {
    /// SearchingForBaseStation - crawl until the perimeter wire is found,
    /// then follow it to the base station.
    ///
    /// Note the wheels are driven directly here, not through the kinematics:
    /// the search crawl is specified as a per-wheel rate.
    pub(crate) fn tick_searching(&mut self, eqpt: &mut Eqpt) {
        let searching = match self.top_state() {
            TopState::SearchingForBaseStation(s) => s,
            // Dispatch contract broken, fail safe with no motion
            _ => {
                set_wheel_omegas(eqpt, 0.0, 0.0);
                return;
            }
        };

        let (left, right) = match searching {
            SearchingSubstate::SearchingForPerimeterWire => {
                // Straight crawl. Placeholder: advances without having
                // detected anything.
                self.current = TopState::SearchingForBaseStation(
                    SearchingSubstate::FollowingPerimeterWire,
                );

                (
                    self.params.searching_wheel_omega_rads,
                    self.params.searching_wheel_omega_rads,
                )
            }

            SearchingSubstate::FollowingPerimeterWire => {
                // Placeholder: declares the base station reached immediately.
                self.request(TopState::InBaseStation);

                (0.0, 0.0)
            }
        };

        set_wheel_omegas(eqpt, left, right);
    }
}
