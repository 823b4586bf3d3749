//! # Behaviour planner
//!
//! Decides, once per cycle, which lane to target and at what speed, from the safety evaluation
//! of the surrounding traffic.
//!
//! The update is pure: it takes the previous `PlannerState` and returns the next one, leaving
//! the caller to decide when to commit it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::{planner::Params, traffic::SafetyReport};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State carried by the planner from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlannerState {
    /// Lane being targeted, 0 is the leftmost
    pub lane_index: usize,

    /// Planned speed.
    ///
    /// Units: miles per hour
    pub speed_mph: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The decision taken on a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    /// Hold lane and speed
    Keep,
    Accelerate,
    Decelerate,
    ChangeLeft,
    ChangeRight,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlannerState {
    /// State at start up: stopped in the initial lane.
    pub fn initial(params: &Params) -> Self {
        Self {
            lane_index: params.initial_lane,
            speed_mph: 0.0,
        }
    }
}

impl Default for PlannerState {
    fn default() -> Self {
        PlannerState::initial(&Params::default())
    }
}

impl Default for Decision {
    fn default() -> Self {
        Decision::Keep
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the next planner state.
///
/// When blocked the planner prefers moving left, then right, and slows down if neither lane is
/// clear. Otherwise it accelerates towards the target speed. At most one lane is changed per
/// call and the speed stays within `[0, target_speed_mph]`.
pub fn update(
    state: &PlannerState,
    safety: &SafetyReport,
    params: &Params,
) -> (PlannerState, Decision) {
    let mut next = *state;

    let decision = if safety.blocked_ahead {
        match (
            safety.left_clear,
            safety.right_clear,
            state.lane_index.checked_sub(1),
        ) {
            (true, _, Some(left)) => {
                next.lane_index = left;
                Decision::ChangeLeft
            }
            (_, true, _) if state.lane_index + 1 < params.num_lanes => {
                next.lane_index = state.lane_index + 1;
                Decision::ChangeRight
            }
            _ => {
                next.speed_mph = state.speed_mph - params.speed_step_mph;
                Decision::Decelerate
            }
        }
    } else if state.speed_mph < params.target_speed_mph {
        next.speed_mph = state.speed_mph + params.speed_step_mph;
        Decision::Accelerate
    } else {
        Decision::Keep
    };

    next.speed_mph = clamp(next.speed_mph, 0.0, params.target_speed_mph);

    (next, decision)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
