//! # Planner
//!
//! Per-cycle orchestration of the planning core. Each cycle predicts the traffic, evaluates which
//! lanes are safe, updates the lane and speed decision and generates the trajectory.
//!
//! The `Planner` owns the only state carried between cycles, the `PlannerState`. A cycle which
//! fails leaves it untouched.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod frame;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use frame::handle_frame;
pub use params::*;
pub use state::*;

use crate::traj_gen::TrajGenError;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while initialising the planner.
#[derive(Debug, thiserror::Error)]
pub enum PlannerInitError {
    #[error("Could not load the planner parameters: {0}")]
    ParamsLoadError(LoadError),

    #[error("Invalid planner parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Could not create the planner archives: {0}")]
    ArchiveError(ArchiveError),
}

/// Errors which can occur during a planning cycle.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("The planner has not been initialised")]
    NotInit,

    #[error("Trajectory generation failed: {0}")]
    TrajGenError(TrajGenError),
}

/// Telemetry which cannot be planned from.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("The previous path has {0} x values but {1} y values")]
    PreviousPathMismatch(usize, usize),

    #[error("The telemetry field {0} is not finite")]
    NonFinite(&'static str),
}
