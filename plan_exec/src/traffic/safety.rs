//! Evaluation of the predicted traffic against the ego forecast.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{EgoForecast, PredictedVehicle};
use crate::{planner::Params, ref_path::ReferencePath};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of the safety evaluation for a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SafetyReport {
    /// A vehicle is, or will be, too close ahead in the ego lane
    pub blocked_ahead: bool,

    /// A change into the lane to the left is possible
    pub left_clear: bool,

    /// A change into the lane to the right is possible
    pub right_clear: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// `true` if a vehicle at `other_d_m` is in the lane centred on `lane_d_m`.
pub fn in_same_lane(lane_d_m: f64, other_d_m: f64, params: &Params) -> bool {
    (other_d_m - lane_d_m).abs() <= 0.5 * params.lane_width_m
}

/// `true` if `other_s_m` is ahead of `from_s_m` by no more than `threshold_m`, measured the
/// short way round the loop.
pub fn close_and_ahead(
    from_s_m: f64,
    other_s_m: f64,
    threshold_m: f64,
    ref_path: &ReferencePath,
) -> bool {
    let gap_m = ref_path.s_gap(from_s_m, other_s_m);
    gap_m >= 0.0 && gap_m <= threshold_m
}

/// Evaluate the predicted traffic.
///
/// `lane_index` is the lane currently targeted by the planner, whose centre is the `d` of the
/// ego forecast. A vehicle blocking that lane is not considered for the adjacent lanes.
pub fn evaluate(
    ego: &EgoForecast,
    traffic: &[PredictedVehicle],
    lane_index: usize,
    params: &Params,
    ref_path: &ReferencePath,
) -> SafetyReport {
    let mut report = SafetyReport {
        blocked_ahead: false,
        left_clear: lane_index > 0,
        right_clear: lane_index + 1 < params.num_lanes,
    };

    let ego_s_m = ego.predicted.s_m;
    let ego_d_m = ego.predicted.d_m;

    for vehicle in traffic {
        let other = &vehicle.predicted;

        if in_same_lane(ego_d_m, other.d_m, params)
            && close_and_ahead(ego_s_m, other.s_m, params.blocking_distance_m, ref_path)
        {
            trace!("Vehicle {} blocks the ego lane", vehicle.id);
            report.blocked_ahead = true;
            continue;
        }

        let unsafe_gap = close_and_ahead(
            ego_s_m,
            other.s_m,
            params.lane_change_ahead_gap_m,
            ref_path,
        ) || close_and_ahead(other.s_m, ego_s_m, params.lane_change_side_gap_m, ref_path)
            || close_and_ahead(
                ego.current_s_m,
                vehicle.current.s_m,
                params.lane_change_side_gap_m,
                ref_path,
            )
            || close_and_ahead(
                vehicle.current.s_m,
                ego.current_s_m,
                params.lane_change_side_gap_m,
                ref_path,
            );

        if !unsafe_gap {
            continue;
        }

        if in_same_lane(ego_d_m - params.lane_width_m, other.d_m, params) {
            trace!("Vehicle {} prevents a change to the left", vehicle.id);
            report.left_clear = false;
        }
        if in_same_lane(ego_d_m + params.lane_width_m, other.d_m, params) {
            trace!("Vehicle {} prevents a change to the right", vehicle.id);
            report.right_clear = false;
        }
    }

    report
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
