//! # Telecommand processor module
//!
//! The telecommand processor applies operator commands to the data store. It
//! runs on the control thread between the tick wake-up and the state machine
//! dispatch, so a stop always takes effect on the very next dispatch.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::data_store::DataStore;
use crate::tc::Tc;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the data store to apply the command to the robot control module.
pub fn exec(ds: &mut DataStore, tc: &Tc) {
    match tc {
        Tc::Start => {
            debug!("Recieved Start command");
            ds.robot_ctrl.start();
        }
        Tc::Stop => {
            debug!("Recieved Stop command");
            ds.robot_ctrl.stop();
        }
        Tc::Mode { mode } => {
            debug!("Recieved Mode command");
            ds.robot_ctrl.set_mode(*mode);
        }
        Tc::Manual {
            speed_ms,
            omega_rads,
        } => {
            debug!("Recieved Manual setpoint command");
            ds.robot_ctrl.set_manual_setpoint(*speed_ms, *omega_rads);
        }
        // Status is rendered by the operator shell from the telemetry share,
        // it never reaches the control thread
        Tc::Status => debug!("Status TC recieved on the control thread, ignored"),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::robot_ctrl::{Mode, TopState};

    #[test]
    fn test_commands_reach_the_state_machine() {
        let mut ds = DataStore::default();

        exec(&mut ds, &Tc::Start);
        assert_eq!(ds.robot_ctrl.top_state(), TopState::Starting);

        exec(
            &mut ds,
            &Tc::Mode {
                mode: Mode::Automatic,
            },
        );
        assert_eq!(ds.robot_ctrl.mode(), Mode::Automatic);

        exec(&mut ds, &Tc::Stop);
        assert_eq!(ds.robot_ctrl.top_state(), TopState::Idle);
    }
}
