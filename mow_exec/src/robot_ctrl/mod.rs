//! # Robot control module
//!
//! This module implements the [`RobotCtrl`] hierarchical state machine, which
//! decides on every fixed-period tick what the drive motors should do. The
//! machine is broken down into five top level states:
//!
//! - `Idle` - The robot stands still until an operator starts it.
//! - `Starting` - Transient state between an operator start and cutting.
//! - `Cutting` - The robot is mowing. In automatic mode a substate machine
//!   (forward/backwards/rotating) bounces the robot around inside the
//!   perimeter wire; in manual mode the operator's setpoint is passed through.
//! - `SearchingForBaseStation` - Stored energy ran low and the robot is
//!   looking for the base station. The substates here are acknowledged
//!   placeholders, see [`searching`](self::searching).
//! - `InBaseStation` - The robot is docked and charging.
//!
//! A handler never changes the top level state directly: it requests a
//! transition which is applied at the end of the tick, so a tick always runs
//! exactly one handler and the new state is first dispatched on the following
//! tick. Operator `stop` is the one exception, it forces the idle state
//! immediately, discarding any pending request.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod cutting;
mod params;
mod searching;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Internal
use crate::eqpt::Eqpt;
use crate::movement;
use util::params as util_params;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::RobotCtrlParams;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operating mode, selected by the operator.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Manual,
    Automatic,
}

/// Top level state of the robot.
///
/// The variants for `Cutting` and `SearchingForBaseStation` carry their
/// substate, so a substate can only exist while its top state is current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopState {
    Idle,
    Starting,
    Cutting(CuttingState),
    SearchingForBaseStation(SearchingSubstate),
    InBaseStation,
}

/// Substate of the automatic cutting behaviour.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CuttingSubstate {
    Forward,
    Backwards,
    Rotating,
}

/// Substate of the search for the base station.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SearchingSubstate {
    SearchingForPerimeterWire,
    FollowingPerimeterWire,
}

/// An error which occurs when parsing a mode string.
#[derive(Debug, thiserror::Error)]
#[error("Unrecognised mode '{0}', expected 'manual' or 'automatic'")]
pub struct ParseModeError(String);

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// State of the cutting substate machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuttingState {
    pub substate: CuttingSubstate,

    /// Countdown shared by all cutting substates, decremented once per tick.
    pub ticks_left: u32,
}

/// Manual movement setpoint, written by the operator, read while cutting in
/// manual mode.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ManualSetpoint {
    /// Forward speed in meters/second
    pub speed_ms: f64,

    /// Yaw rate in radians/second
    pub omega_rads: f64,
}

/// Robot control state machine.
///
/// Exactly one instance exists for the process lifetime. It is mutated only
/// on the control thread: by [`RobotCtrl::tick`] and by the operator
/// operations applied between ticks.
pub struct RobotCtrl {
    pub(crate) params: RobotCtrlParams,

    mode: Mode,

    /// The state dispatched on this tick.
    current: TopState,

    /// Transition requested during this tick, applied after dispatch.
    next: Option<TopState>,

    manual: ManualSetpoint,

    /// Number of sensor reads which failed and fell back to the cached value.
    sensor_faults: u64,
}

/// Read-only snapshot of the robot state for the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct RobotReport {
    pub mode: Mode,

    /// Slash-separated state path, e.g. `/cutting/forward`.
    pub state_path: String,

    pub cached_signal_level: f64,

    pub cached_energy_level: u16,

    pub sensor_faults: u64,

    /// The manual setpoint, present only in manual mode.
    pub manual: Option<ManualSetpoint>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Mode {
    fn default() -> Self {
        Mode::Manual
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Mode::Manual),
            "automatic" => Ok(Mode::Automatic),
            _ => Err(ParseModeError(s.into())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Manual => write!(f, "manual"),
            Mode::Automatic => write!(f, "automatic"),
        }
    }
}

impl CuttingState {
    /// The state in which cutting is (re-)entered: backing away first, so a
    /// robot leaving the base station does not drive straight at the wire.
    pub fn entry(params: &RobotCtrlParams) -> Self {
        Self {
            substate: CuttingSubstate::Backwards,
            ticks_left: params.cutting_backwards_ticks,
        }
    }
}

impl fmt::Display for TopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopState::Idle => write!(f, "/idle"),
            TopState::Starting => write!(f, "/starting"),
            TopState::Cutting(c) => {
                let sub = match c.substate {
                    CuttingSubstate::Forward => "forward",
                    CuttingSubstate::Backwards => "backwards",
                    CuttingSubstate::Rotating => "rotating",
                };
                write!(f, "/cutting/{}", sub)
            }
            TopState::SearchingForBaseStation(s) => {
                let sub = match s {
                    SearchingSubstate::SearchingForPerimeterWire => "searching_for_perimeter_wire",
                    SearchingSubstate::FollowingPerimeterWire => "following_perimeter_wire",
                };
                write!(f, "/searching_for_base_station/{}", sub)
            }
            TopState::InBaseStation => write!(f, "/in_base_station"),
        }
    }
}

impl Default for RobotCtrl {
    fn default() -> Self {
        Self {
            params: RobotCtrlParams::default(),
            mode: Mode::Manual,
            current: TopState::Idle,
            next: None,
            manual: ManualSetpoint::default(),
            sensor_faults: 0,
        }
    }
}

impl Default for RobotReport {
    fn default() -> Self {
        Self {
            mode: Mode::Manual,
            state_path: TopState::Idle.to_string(),
            cached_signal_level: 0.0,
            cached_energy_level: 0,
            sensor_faults: 0,
            manual: Some(ManualSetpoint::default()),
        }
    }
}

impl RobotCtrl {
    /// Initialise the module by loading its parameter file.
    pub fn init(&mut self, params_path: &str) -> Result<(), util_params::LoadError> {
        self.params = util_params::load(params_path)?;

        Ok(())
    }

    /// Run one tick of the state machine.
    ///
    /// Dispatches exactly one handler, selected by the current top state, then
    /// applies any transition the handler requested. The transition is first
    /// observed by the following tick's dispatch.
    ///
    /// This function has no failure return: all degradation is internal, the
    /// default-safe branch being zero motion.
    pub fn tick(&mut self, eqpt: &mut Eqpt) {
        trace!("Tick dispatch in state {}", self.current);

        match self.current {
            TopState::Idle => self.tick_idle(eqpt),
            TopState::Starting => self.tick_starting(),
            TopState::Cutting(_) => self.tick_cutting(eqpt),
            TopState::SearchingForBaseStation(_) => self.tick_searching(eqpt),
            TopState::InBaseStation => self.tick_in_base_station(eqpt),
        }

        if let Some(next) = self.next.take() {
            info!("Robot state change: {} -> {}", self.current, next);
            self.current = next;
        }
    }

    // ---- OPERATOR OPERATIONS (applied between ticks, never during dispatch) ----

    /// Start the robot, forcing the starting state.
    pub fn start(&mut self) {
        info!("Robot start requested");
        self.next = None;
        self.current = TopState::Starting;
    }

    /// Stop the robot.
    ///
    /// Takes effect on the very next dispatch, discarding any pending
    /// transition rather than going through the request/apply handoff.
    pub fn stop(&mut self) {
        info!("Robot stop requested");
        self.next = None;
        self.current = TopState::Idle;
    }

    /// Select the operating mode.
    pub fn set_mode(&mut self, mode: Mode) {
        info!("Robot mode set to {}", mode);
        self.mode = mode;
    }

    /// Set the manual movement setpoint.
    pub fn set_manual_setpoint(&mut self, speed_ms: f64, omega_rads: f64) {
        self.manual = ManualSetpoint {
            speed_ms,
            omega_rads,
        };
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn top_state(&self) -> TopState {
        self.current
    }

    /// Build a read-only status snapshot. Sensor values are the cached ones,
    /// a snapshot never triggers a fresh acquisition.
    pub fn report(&self, eqpt: &Eqpt) -> RobotReport {
        RobotReport {
            mode: self.mode,
            state_path: self.current.to_string(),
            cached_signal_level: eqpt.perimeter.cached_signal_level(),
            cached_energy_level: eqpt.power.cached_stored_energy_level(),
            sensor_faults: self.sensor_faults,
            manual: match self.mode {
                Mode::Manual => Some(self.manual),
                Mode::Automatic => None,
            },
        }
    }

    // ---- STATE HANDLERS ----

    /// Idle - the robot stands still.
    fn tick_idle(&mut self, eqpt: &mut Eqpt) {
        set_wheel_omegas(eqpt, 0.0, 0.0);
    }

    /// Starting - no physical action, unconditionally requests cutting.
    fn tick_starting(&mut self) {
        self.request(TopState::Cutting(CuttingState::entry(&self.params)));
    }

    /// Cutting - derive a movement demand from the mode and drive the wheels
    /// through the kinematics.
    fn tick_cutting(&mut self, eqpt: &mut Eqpt) {
        let (speed_ms, omega_rads) = match self.mode {
            Mode::Manual => (self.manual.speed_ms, self.manual.omega_rads),
            Mode::Automatic => self.cutting_automatic(eqpt),
        };

        let (left, right) =
            movement::calc_wheels_omega(&self.params.movement, speed_ms, omega_rads);

        set_wheel_omegas(eqpt, left, right);
    }

    /// InBaseStation - wait, without moving, until the battery is full, then
    /// go back to cutting.
    fn tick_in_base_station(&mut self, eqpt: &mut Eqpt) {
        let energy = self.stored_energy(eqpt);

        if energy == eqpt.power.max_energy_level() {
            self.request(TopState::Cutting(CuttingState::entry(&self.params)));
        }
    }

    // ---- HELPERS ----

    /// Request a top state transition, to be applied at the end of this tick.
    ///
    /// A handler requests at most one transition per tick; a second request is
    /// a contract violation and is ignored in favour of the first.
    pub(crate) fn request(&mut self, next: TopState) {
        if let Some(ref pending) = self.next {
            warn!(
                "Transition to {} requested while {} is already pending, ignored",
                next, pending
            );
            return;
        }

        self.next = Some(next);
    }

    /// Fresh stored energy read, falling back to the cached level on failure.
    pub(crate) fn stored_energy(&mut self, eqpt: &mut Eqpt) -> u16 {
        match eqpt.power.stored_energy_level() {
            Ok(level) => level,
            Err(e) => {
                self.sensor_faults += 1;
                warn!("Energy read failed, using cached level: {}", e);
                eqpt.power.cached_stored_energy_level()
            }
        }
    }

    /// Fresh perimeter signal read, falling back to the cached level on
    /// failure.
    pub(crate) fn perimeter_signal(&mut self, eqpt: &mut Eqpt) -> f64 {
        match eqpt.perimeter.signal_level() {
            Ok(signal) => signal,
            Err(e) => {
                self.sensor_faults += 1;
                warn!("Perimeter signal read failed, using cached level: {}", e);
                eqpt.perimeter.cached_signal_level()
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Issue the per-tick pair of wheel rate demands. Actuator errors are logged
/// and otherwise ignored, they must not take the control loop down.
pub(crate) fn set_wheel_omegas(eqpt: &mut Eqpt, left_rads: f64, right_rads: f64) {
    if let Err(e) = eqpt.left_motor.set_omega(left_rads) {
        warn!("Left motor demand failed: {}", e);
    }
    if let Err(e) = eqpt.right_motor.set_omega(right_rads) {
        warn!("Right motor demand failed: {}", e);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::{EqptError, Motor, PerimeterWireRx, PowerMonitor};
    use std::sync::{Arc, Mutex};

    const MAX_ENERGY: u16 = 100;

    struct StubPerimeter {
        signal: f64,
    }

    impl PerimeterWireRx for StubPerimeter {
        fn signal_level(&mut self) -> Result<f64, EqptError> {
            Ok(self.signal)
        }

        fn cached_signal_level(&self) -> f64 {
            self.signal
        }
    }

    struct StubPower {
        level: u16,
        fail: bool,
    }

    impl PowerMonitor for StubPower {
        fn stored_energy_level(&mut self) -> Result<u16, EqptError> {
            if self.fail {
                Err(EqptError::ReadFailed("stub power failure".into()))
            } else {
                Ok(self.level)
            }
        }

        fn cached_stored_energy_level(&self) -> u16 {
            self.level
        }

        fn max_energy_level(&self) -> u16 {
            MAX_ENERGY
        }
    }

    /// Motor stub which records every demanded rate.
    struct StubMotor {
        demands: Arc<Mutex<Vec<f64>>>,
    }

    impl Motor for StubMotor {
        fn set_omega(&mut self, omega_rads: f64) -> Result<(), EqptError> {
            self.demands.lock().unwrap().push(omega_rads);
            Ok(())
        }
    }

    type MotorLog = Arc<Mutex<Vec<f64>>>;

    fn test_eqpt(signal: f64, energy: u16) -> (Eqpt, MotorLog, MotorLog) {
        let left = Arc::new(Mutex::new(Vec::new()));
        let right = Arc::new(Mutex::new(Vec::new()));

        let eqpt = Eqpt {
            perimeter: Box::new(StubPerimeter { signal }),
            power: Box::new(StubPower {
                level: energy,
                fail: false,
            }),
            left_motor: Box::new(StubMotor {
                demands: left.clone(),
            }),
            right_motor: Box::new(StubMotor {
                demands: right.clone(),
            }),
        };

        (eqpt, left, right)
    }

    fn cutting(substate: CuttingSubstate, ticks_left: u32) -> TopState {
        TopState::Cutting(CuttingState {
            substate,
            ticks_left,
        })
    }

    #[test]
    fn test_idle_issues_zero_wheel_commands() {
        let mut ctrl = RobotCtrl::default();
        let (mut eqpt, left, right) = test_eqpt(0.5, 100);

        ctrl.tick(&mut eqpt);

        assert_eq!(ctrl.top_state(), TopState::Idle);
        assert_eq!(*left.lock().unwrap(), vec![0.0]);
        assert_eq!(*right.lock().unwrap(), vec![0.0]);
    }

    #[test]
    fn test_starting_enters_cutting_without_actuation() {
        let mut ctrl = RobotCtrl::default();
        let (mut eqpt, left, right) = test_eqpt(0.5, 100);

        ctrl.start();
        assert_eq!(ctrl.top_state(), TopState::Starting);

        ctrl.tick(&mut eqpt);

        // No actuator calls on the starting tick, cutting entered backwards
        assert!(left.lock().unwrap().is_empty());
        assert!(right.lock().unwrap().is_empty());
        assert_eq!(
            ctrl.top_state(),
            cutting(
                CuttingSubstate::Backwards,
                ctrl.params.cutting_backwards_ticks
            )
        );
    }

    #[test]
    fn test_low_energy_threshold_is_inclusive() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Forward, 10);

        // Energy exactly at the threshold heads for the base station, and the
        // substates are not evaluated: were they, the inside-wire signal
        // would command forward motion.
        let (mut eqpt, left, right) = test_eqpt(0.5, 20);
        ctrl.tick(&mut eqpt);

        assert_eq!(
            ctrl.top_state(),
            TopState::SearchingForBaseStation(SearchingSubstate::SearchingForPerimeterWire)
        );
        assert_eq!(*left.lock().unwrap(), vec![0.0]);
        assert_eq!(*right.lock().unwrap(), vec![0.0]);
    }

    #[test]
    fn test_energy_above_threshold_keeps_cutting() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Forward, 10);

        let (mut eqpt, left, right) = test_eqpt(0.5, 21);
        ctrl.tick(&mut eqpt);

        // Still cutting, driving forward inside the wire
        assert_eq!(ctrl.top_state(), cutting(CuttingSubstate::Forward, 9));

        let expected = movement::calc_wheels_omega(
            &ctrl.params.movement,
            ctrl.params.cutting_forward_speed_ms,
            0.0,
        );
        assert_eq!(*left.lock().unwrap(), vec![expected.0]);
        assert_eq!(*right.lock().unwrap(), vec![expected.1]);
    }

    #[test]
    fn test_forward_leaves_wire_enters_backwards() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Forward, 10);

        // Signal negative: outside the wire
        let (mut eqpt, left, right) = test_eqpt(-0.5, 21);
        ctrl.tick(&mut eqpt);

        // The substate flips to backwards with a fresh countdown, the top
        // state stays cutting, and this tick issues no motion
        assert_eq!(
            ctrl.top_state(),
            cutting(
                CuttingSubstate::Backwards,
                ctrl.params.cutting_backwards_ticks
            )
        );
        assert_eq!(*left.lock().unwrap(), vec![0.0]);
        assert_eq!(*right.lock().unwrap(), vec![0.0]);
    }

    #[test]
    fn test_backwards_countdown_expiry() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Backwards, 1);

        let (mut eqpt, left, right) = test_eqpt(0.5, 50);
        ctrl.tick(&mut eqpt);

        // The expiry tick still issues the backwards demand
        let expected = movement::calc_wheels_omega(
            &ctrl.params.movement,
            ctrl.params.cutting_backwards_speed_ms,
            0.0,
        );
        assert_eq!(*left.lock().unwrap(), vec![expected.0]);
        assert_eq!(*right.lock().unwrap(), vec![expected.1]);

        // The following tick starts rotating with a fresh countdown
        assert_eq!(
            ctrl.top_state(),
            cutting(
                CuttingSubstate::Rotating,
                ctrl.params.cutting_rotating_ticks
            )
        );
    }

    #[test]
    fn test_rotating_holds_until_expiry() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Rotating, 5);

        let (mut eqpt, left, right) = test_eqpt(0.5, 50);
        ctrl.tick(&mut eqpt);

        let expected = movement::calc_wheels_omega(
            &ctrl.params.movement,
            0.0,
            ctrl.params.cutting_rotating_omega_rads,
        );
        assert_eq!(*left.lock().unwrap(), vec![expected.0]);
        assert_eq!(*right.lock().unwrap(), vec![expected.1]);
        assert_eq!(ctrl.top_state(), cutting(CuttingSubstate::Rotating, 4));
    }

    #[test]
    fn test_rotating_expiry_zeroes_omega() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Rotating, 1);

        let (mut eqpt, left, right) = test_eqpt(0.5, 50);
        ctrl.tick(&mut eqpt);

        // Omega is forced to zero on the expiry tick itself
        assert_eq!(*left.lock().unwrap(), vec![0.0]);
        assert_eq!(*right.lock().unwrap(), vec![0.0]);
        assert_eq!(ctrl.top_state(), cutting(CuttingSubstate::Forward, 0));
    }

    #[test]
    fn test_manual_passthrough_ignores_sensors_and_substate() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Manual);
        ctrl.set_manual_setpoint(0.2, 0.3);
        ctrl.current = cutting(CuttingSubstate::Forward, 5);

        // Outside the wire and below the energy threshold: manual mode must
        // ignore both
        let (mut eqpt, left, right) = test_eqpt(-0.5, 5);
        ctrl.tick(&mut eqpt);

        let expected = movement::calc_wheels_omega(&ctrl.params.movement, 0.2, 0.3);
        assert_eq!(*left.lock().unwrap(), vec![expected.0]);
        assert_eq!(*right.lock().unwrap(), vec![expected.1]);

        // Substate untouched, no transition requested
        assert_eq!(ctrl.top_state(), cutting(CuttingSubstate::Forward, 5));
    }

    #[test]
    fn test_searching_is_single_shot() {
        let mut ctrl = RobotCtrl::default();
        ctrl.current =
            TopState::SearchingForBaseStation(SearchingSubstate::SearchingForPerimeterWire);

        let (mut eqpt, left, right) = test_eqpt(0.5, 10);
        ctrl.tick(&mut eqpt);

        // Straight crawl, both wheels the same sign, then an unconditional
        // advance to following
        let rate = ctrl.params.searching_wheel_omega_rads;
        assert_eq!(*left.lock().unwrap(), vec![rate]);
        assert_eq!(*right.lock().unwrap(), vec![rate]);
        assert_eq!(
            ctrl.top_state(),
            TopState::SearchingForBaseStation(SearchingSubstate::FollowingPerimeterWire)
        );

        // Following commands zero motion and docks on the next tick
        ctrl.tick(&mut eqpt);
        assert_eq!(*left.lock().unwrap(), vec![rate, 0.0]);
        assert_eq!(*right.lock().unwrap(), vec![rate, 0.0]);
        assert_eq!(ctrl.top_state(), TopState::InBaseStation);
    }

    #[test]
    fn test_in_base_station_waits_for_full_charge() {
        let mut ctrl = RobotCtrl::default();
        ctrl.current = TopState::InBaseStation;

        // One below full: stay docked, no actuator calls
        let (mut eqpt, left, right) = test_eqpt(0.5, MAX_ENERGY - 1);
        ctrl.tick(&mut eqpt);

        assert_eq!(ctrl.top_state(), TopState::InBaseStation);
        assert!(left.lock().unwrap().is_empty());
        assert!(right.lock().unwrap().is_empty());

        // Exactly full: back to cutting, entered backwards
        let (mut eqpt, _, _) = test_eqpt(0.5, MAX_ENERGY);
        ctrl.tick(&mut eqpt);

        assert_eq!(
            ctrl.top_state(),
            cutting(
                CuttingSubstate::Backwards,
                ctrl.params.cutting_backwards_ticks
            )
        );
    }

    #[test]
    fn test_stop_overrides_pending_transition() {
        let mut ctrl = RobotCtrl::default();
        ctrl.current = cutting(CuttingSubstate::Forward, 10);
        ctrl.request(TopState::SearchingForBaseStation(
            SearchingSubstate::SearchingForPerimeterWire,
        ));

        ctrl.stop();

        // Immediate, pending request discarded
        assert_eq!(ctrl.top_state(), TopState::Idle);
        assert!(ctrl.next.is_none());

        // The next dispatch runs the idle handler
        let (mut eqpt, left, _) = test_eqpt(0.5, 100);
        ctrl.tick(&mut eqpt);
        assert_eq!(ctrl.top_state(), TopState::Idle);
        assert_eq!(*left.lock().unwrap(), vec![0.0]);
    }

    #[test]
    fn test_double_transition_request_keeps_first() {
        let mut ctrl = RobotCtrl::default();

        ctrl.request(TopState::InBaseStation);
        ctrl.request(TopState::Starting);

        assert_eq!(ctrl.next, Some(TopState::InBaseStation));
    }

    #[test]
    fn test_energy_read_failure_uses_cached_level() {
        let mut ctrl = RobotCtrl::default();
        ctrl.set_mode(Mode::Automatic);
        ctrl.current = cutting(CuttingSubstate::Forward, 5);

        let (mut eqpt, left, _) = test_eqpt(0.5, 50);
        eqpt.power = Box::new(StubPower {
            level: 50,
            fail: true,
        });

        ctrl.tick(&mut eqpt);

        // Cached level 50 is above the threshold, so cutting continues on the
        // cached value and the fault is counted
        assert_eq!(ctrl.sensor_faults, 1);
        assert_eq!(ctrl.top_state(), cutting(CuttingSubstate::Forward, 4));

        let expected = movement::calc_wheels_omega(
            &ctrl.params.movement,
            ctrl.params.cutting_forward_speed_ms,
            0.0,
        );
        assert_eq!(*left.lock().unwrap(), vec![expected.0]);
    }

    #[test]
    fn test_report_reflects_mode_and_state() {
        let mut ctrl = RobotCtrl::default();
        ctrl.current = cutting(CuttingSubstate::Rotating, 3);
        ctrl.set_manual_setpoint(0.1, 0.0);

        let (eqpt, _, _) = test_eqpt(0.25, 80);

        let report = ctrl.report(&eqpt);
        assert_eq!(report.state_path, "/cutting/rotating");
        assert_eq!(report.cached_signal_level, 0.25);
        assert_eq!(report.cached_energy_level, 80);
        assert!(report.manual.is_some());

        // Automatic mode omits the manual setpoint
        ctrl.set_mode(Mode::Automatic);
        assert!(ctrl.report(&eqpt).manual.is_none());
    }
}
