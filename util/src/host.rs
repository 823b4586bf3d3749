//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "HWY_PLANNER_SW_ROOT";

/// Get the software root directory.
///
/// The root holds the `params` and `sessions` directories, as well as any map
/// data referenced by the parameter files.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
