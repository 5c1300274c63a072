//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable giving the software root directory.
pub const ROOT_ENV_VAR: &str = "MOWER_SW_ROOT";

/// Get the root directory of the software installation.
///
/// The root is read from the `MOWER_SW_ROOT` environment variable. If the
/// variable is not set the current working directory is used instead, so that
/// running from a source checkout needs no setup.
pub fn get_mower_sw_root() -> std::io::Result<PathBuf> {
    match env::var(ROOT_ENV_VAR) {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => env::current_dir(),
    }
}
