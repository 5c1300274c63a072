//! # Operator shell
//!
//! Command line surface for the operator, running on its own thread. Lines
//! are parsed into telecommands and sent over a channel to the control
//! thread; the `status` command is handled locally by rendering the latest
//! telemetry snapshot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

// Internal
use crate::tc::Tc;
use crate::telem::{StatusReport, TmShare};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "RoboMower $ ";

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the shell until the operator exits or the control thread goes away.
pub fn run(tc_sender: Sender<Tc>, tm: TmShare, history_path: PathBuf) {
    let mut rl = Editor::<()>::new();
    if rl.load_history(&history_path).is_err() {
        debug!("No shell history found");
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line);

                match Tc::from_line(line) {
                    Ok(Tc::Status) => match tm.lock() {
                        Ok(report) => print_report(&report),
                        Err(_) => warn!("Telemetry share poisoned, no status available"),
                    },
                    Ok(tc) => {
                        if tc_sender.send(tc).is_err() {
                            // Control thread gone, nothing left to command
                            break;
                        }
                    }
                    // Parse errors never reach the control thread, report
                    // them to the operator and carry on
                    Err(e) => println!("{}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Shell read error: {:?}", e);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        warn!("Could not save shell history: {}", e);
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Render a status report for the operator.
fn print_report(report: &StatusReport) {
    println!("mode = {}", report.robot.mode);
    println!("state = {}", report.robot.state_path);
    println!("tick period = {:.3} s", report.tick_period_s);
    println!("last tick duration = {:.6} s", report.last_tick_dur_s);
    println!(
        "perimeter signal level = {:.2}",
        report.robot.cached_signal_level
    );
    println!("energy level = {}", report.robot.cached_energy_level);
    println!("watchdog count = {}", report.watchdog_count);
    println!("sensor faults = {}", report.robot.sensor_faults);
    println!("ticks = {}", report.num_ticks);

    if let Some(manual) = report.robot.manual {
        println!("speed = {:.2} m/s", manual.speed_ms);
        println!("omega = {:.2} rad/s", manual.omega_rads);
    }
}
