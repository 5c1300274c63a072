//! Executive-level parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::eqpt::sim::SimParams;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters controlling the executable itself, loaded from `mow_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MowExecParams {
    /// Control tick period in milliseconds
    pub tick_period_ms: u64,

    /// Simulated equipment parameters
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MowExecParams {
    fn default() -> Self {
        Self {
            tick_period_ms: 50,
            sim: SimParams::default(),
        }
    }
}
