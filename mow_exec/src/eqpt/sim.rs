//! # Simulated equipment
//!
//! Stand-in implementations of the equipment traits so the executive can run
//! on a desktop machine without mower hardware attached.
//!
//! The battery model is driven by fresh reads: each read drains one unit of
//! energy every `drain_read_interval` reads while discharging, and restores
//! one unit per read while the charging flag is raised. The main loop raises
//! the flag through a [`SimPowerHandle`] while the robot is docked in the base
//! station.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// Internal
use super::{EqptError, Motor, PerimeterWireRx, PowerMonitor, WheelSide};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulated equipment.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Perimeter signal level returned while inside the wire.
    pub inside_signal_level: f64,

    /// If non-zero, every Nth fresh signal read reports the outside-the-wire
    /// polarity instead, so the automatic cutting logic gets exercised.
    pub outside_every_n_reads: u64,

    /// Energy level reported by a full battery.
    pub max_energy_level: u16,

    /// Energy level at startup.
    pub initial_energy_level: u16,

    /// Number of fresh energy reads per unit of energy drained while
    /// discharging.
    pub drain_read_interval: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            inside_signal_level: 0.5,
            outside_every_n_reads: 0,
            max_energy_level: 100,
            initial_energy_level: 100,
            drain_read_interval: 20,
        }
    }
}

/// Simulated perimeter wire receiver.
pub struct SimPerimeterWireRx {
    params: SimParams,
    num_reads: u64,
    cached: f64,
}

/// Simulated battery monitor.
pub struct SimPower {
    params: SimParams,
    level: u16,
    reads_since_drain: u64,
    charging: Arc<AtomicBool>,
}

/// Handle through which the main loop drives the simulated battery's charging
/// state.
#[derive(Clone)]
pub struct SimPowerHandle {
    charging: Arc<AtomicBool>,
}

/// Simulated wheel motor, traces demanded rates.
pub struct SimMotor {
    side: WheelSide,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimPerimeterWireRx {
    pub fn new(params: &SimParams) -> Self {
        Self {
            params: params.clone(),
            num_reads: 0,
            cached: params.inside_signal_level,
        }
    }
}

impl PerimeterWireRx for SimPerimeterWireRx {
    fn signal_level(&mut self) -> Result<f64, EqptError> {
        self.num_reads += 1;

        let outside = self.params.outside_every_n_reads != 0
            && self.num_reads % self.params.outside_every_n_reads == 0;

        self.cached = if outside {
            -self.params.inside_signal_level
        } else {
            self.params.inside_signal_level
        };

        Ok(self.cached)
    }

    fn cached_signal_level(&self) -> f64 {
        self.cached
    }
}

impl SimPower {
    /// Create the simulated battery and the handle used to control its
    /// charging state.
    pub fn new(params: &SimParams) -> (Self, SimPowerHandle) {
        let charging = Arc::new(AtomicBool::new(false));

        (
            Self {
                params: params.clone(),
                level: params.initial_energy_level,
                reads_since_drain: 0,
                charging: charging.clone(),
            },
            SimPowerHandle { charging },
        )
    }
}

impl PowerMonitor for SimPower {
    fn stored_energy_level(&mut self) -> Result<u16, EqptError> {
        if self.charging.load(Ordering::Relaxed) {
            if self.level < self.params.max_energy_level {
                self.level += 1;
            }
            self.reads_since_drain = 0;
        } else {
            self.reads_since_drain += 1;

            if self.reads_since_drain >= self.params.drain_read_interval {
                self.reads_since_drain = 0;
                self.level = self.level.saturating_sub(1);
            }
        }

        Ok(self.level)
    }

    fn cached_stored_energy_level(&self) -> u16 {
        self.level
    }

    fn max_energy_level(&self) -> u16 {
        self.params.max_energy_level
    }
}

impl SimPowerHandle {
    /// Set whether the simulated battery is charging.
    pub fn set_charging(&self, charging: bool) {
        self.charging.store(charging, Ordering::Relaxed);
    }
}

impl SimMotor {
    pub fn new(side: WheelSide) -> Self {
        Self { side }
    }
}

impl Motor for SimMotor {
    fn set_omega(&mut self, omega_rads: f64) -> Result<(), EqptError> {
        trace!("{:?} wheel omega demand: {:.3} rad/s", self.side, omega_rads);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_power_drains_and_charges() {
        let params = SimParams {
            max_energy_level: 10,
            initial_energy_level: 10,
            drain_read_interval: 2,
            ..SimParams::default()
        };
        let (mut power, handle) = SimPower::new(&params);

        // Two reads per unit drained
        assert_eq!(power.stored_energy_level().unwrap(), 10);
        assert_eq!(power.stored_energy_level().unwrap(), 9);
        assert_eq!(power.cached_stored_energy_level(), 9);

        // Charging restores one unit per read, capped at max
        handle.set_charging(true);
        assert_eq!(power.stored_energy_level().unwrap(), 10);
        assert_eq!(power.stored_energy_level().unwrap(), 10);
    }

    #[test]
    fn test_sim_perimeter_flips_outside() {
        let params = SimParams {
            inside_signal_level: 0.5,
            outside_every_n_reads: 3,
            ..SimParams::default()
        };
        let mut rx = SimPerimeterWireRx::new(&params);

        assert_eq!(rx.signal_level().unwrap(), 0.5);
        assert_eq!(rx.signal_level().unwrap(), 0.5);
        assert_eq!(rx.signal_level().unwrap(), -0.5);
        assert_eq!(rx.cached_signal_level(), -0.5);
        assert_eq!(rx.signal_level().unwrap(), 0.5);
    }
}
