//! Main mower executive entry point.
//!
//! # Architecture
//!
//! Three threads:
//!
//! - The ticker thread, which does nothing but mark the fixed tick boundaries.
//! - The control thread (this one), which on every tick drains pending
//!   telecommands, runs the robot control state machine, and publishes a
//!   status report.
//! - The shell thread, which reads operator commands from the command line and
//!   forwards them to the control thread over a channel.
//!
//! All robot state lives in the [`DataStore`] and is touched only by the
//! control thread, so commands and ticks can never interleave.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use mow_lib::{
    data_store::DataStore,
    eqpt::{
        sim::{SimMotor, SimPerimeterWireRx, SimPower},
        Eqpt, WheelSide,
    },
    params::MowExecParams,
    robot_ctrl::TopState,
    shell, tc_processor, telem,
    ticker::Ticker,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("mow_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("RoboMower Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: MowExecParams =
        util::params::load("mow_exec.toml").wrap_err("Could not load exec params")?;

    let tick_period = Duration::from_millis(exec_params.tick_period_ms);
    let tick_period_s = tick_period.as_secs_f64();
    let tick_frequency_hz = 1.0 / tick_period_s;

    info!("Exec parameters loaded, tick period {} ms", exec_params.tick_period_ms);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.robot_ctrl
        .init("robot_ctrl.toml")
        .wrap_err("Failed to initialise RobotCtrl")?;
    info!("RobotCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    let (sim_power, power_handle) = SimPower::new(&exec_params.sim);

    let mut eqpt = Eqpt {
        perimeter: Box::new(SimPerimeterWireRx::new(&exec_params.sim)),
        power: Box::new(sim_power),
        left_motor: Box::new(SimMotor::new(WheelSide::Left)),
        right_motor: Box::new(SimMotor::new(WheelSide::Right)),
    };

    info!("Simulated equipment initialised");

    // ---- INITIALISE OPERATOR SHELL ----

    let (tc_sender, tc_receiver) = mpsc::channel();
    let tm_share = telem::new_share();

    let shell_tm = tm_share.clone();
    let mut history_path = session.session_root.clone();
    history_path.push("shell_history.txt");

    thread::Builder::new()
        .name("shell".into())
        .spawn(move || shell::run(tc_sender, shell_tm, history_path))
        .wrap_err("Failed to spawn the shell thread")?;

    info!("Operator shell started");

    // ---- MAIN LOOP ----

    let ticker = Ticker::start(tick_period).wrap_err("Failed to start the ticker")?;

    info!("Begining main loop\n");

    'main: loop {
        // Block until the next tick boundary
        ticker.wait()?;

        let tick_start_instant = Instant::now();

        ds.tick_start(tick_frequency_hz);

        // ---- TELECOMMAND PROCESSING ----

        // Drain all commands the shell sent since the last tick
        loop {
            match tc_receiver.try_recv() {
                Ok(tc) => tc_processor::exec(&mut ds, &tc),
                Err(TryRecvError::Empty) => break,
                // Shell thread gone, the operator has exited
                Err(TryRecvError::Disconnected) => {
                    info!("Operator shell exited, stopping");
                    break 'main;
                }
            }
        }

        // ---- EQUIPMENT MANAGEMENT ----

        // The simulated battery charges while the robot is docked
        power_handle.set_charging(matches!(
            ds.robot_ctrl.top_state(),
            TopState::InBaseStation
        ));

        // ---- CONTROL ALGORITHM PROCESSING ----

        ds.robot_ctrl.tick(&mut eqpt);

        // ---- TICK MANAGEMENT ----

        let tick_dur = Instant::now() - tick_start_instant;
        ds.last_tick_dur_s = tick_dur.as_secs_f64();

        if tick_dur > tick_period {
            warn!(
                "Tick overran by {:.06} s",
                ds.last_tick_dur_s - tick_period_s
            );
            ds.watchdog_count += 1;
            ds.num_consec_overruns += 1;
        } else {
            ds.num_consec_overruns = 0;
        }

        // ---- TELEMETRY ----

        let report = ds.status_report(&eqpt, tick_period_s);

        match tm_share.lock() {
            Ok(mut tm) => *tm = report.clone(),
            Err(_) => warn!("Telemetry share poisoned"),
        }

        // Snapshot the report to the session directory on the 1Hz
        if ds.is_1_hz_tick {
            if let Err(e) = save_report(&session, &report) {
                warn!("Could not save status report: {}", e);
            }
        }

        ds.num_ticks += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}

/// Write the latest status report into the session directory as JSON.
fn save_report(session: &Session, report: &mow_lib::telem::StatusReport) -> Result<(), Report> {
    let mut path = session.session_root.clone();
    path.push("status.json");

    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, report)?;

    Ok(())
}
