//! # Planner Executable Parameters
//!
//! This module provides parameters for the planner executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::NetParams;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlanExecParams {
    /// Directory, relative to the software root, in which sessions are created
    pub sessions_dir: String,

    /// Path to the highway map, relative to the software root
    pub map_file: String,

    /// Length of the highway loop
    ///
    /// Units: meters
    pub max_s_m: f64,

    /// Cycles taking longer than this are reported
    ///
    /// Units: seconds
    pub max_cycle_time_s: f64,

    pub net: NetParams,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
