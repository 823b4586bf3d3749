//! Parameters structure for the Planner

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Planner.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- ROAD ----

    /// Width of a single lane.
    ///
    /// Units: meters
    pub lane_width_m: f64,

    /// Number of lanes on the ego vehicle's side of the road, lane 0 is the leftmost.
    pub num_lanes: usize,

    /// Lane the ego vehicle starts in.
    pub initial_lane: usize,

    // ---- TIMING ----

    /// Number of points in every emitted trajectory.
    pub trajectory_length: usize,

    /// Time between consecutive trajectory points, which is also the simulator's step.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    // ---- SPEED ----

    /// Speed the planner tries to reach when the lane ahead is free.
    ///
    /// Units: miles per hour
    pub target_speed_mph: f64,

    /// Change in planned speed in a single cycle.
    ///
    /// Units: miles per hour
    pub speed_step_mph: f64,

    /// Conversion factor from miles per hour to meters per second.
    pub mph_to_ms: f64,

    // ---- TRAJECTORY ----

    /// Distances ahead of the ego vehicle, along the track, of the forward spline anchors.
    ///
    /// Units: meters
    pub anchor_offsets_m: Vec<f64>,

    /// Distance ahead, in the vehicle frame, over which new points are spaced.
    ///
    /// Units: meters
    pub resample_distance_m: f64,

    // ---- SAFETY ----

    /// A vehicle in the ego lane closer than this ahead of the ego forecast blocks it.
    ///
    /// Units: meters
    pub blocking_distance_m: f64,

    /// Required gap ahead of the ego forecast in a lane before changing into it.
    ///
    /// Units: meters
    pub lane_change_ahead_gap_m: f64,

    /// Required gap behind the ego forecast, and either side of the ego's current position, in
    /// a lane before changing into it.
    ///
    /// Units: meters
    pub lane_change_side_gap_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Inconsistencies found in a loaded parameter set.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("There must be at least one lane")]
    NoLanes,

    #[error("The initial lane ({0}) is not one of the {1} lanes")]
    InvalidInitialLane(usize, usize),

    #[error("The trajectory length must be at least 1")]
    EmptyTrajectory,

    #[error("Parameter {0} must be positive and finite, found {1}")]
    NotPositive(&'static str, f64),

    #[error("Anchor offsets must be positive and strictly increasing, found {0:?}")]
    InvalidAnchorOffsets(Vec<f64>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            lane_width_m: 4.0,
            num_lanes: 3,
            initial_lane: 1,
            trajectory_length: 50,
            cycle_period_s: 0.02,
            target_speed_mph: 49.0,
            speed_step_mph: 0.2,
            mph_to_ms: 0.447,
            anchor_offsets_m: vec![50.0, 70.0, 90.0],
            resample_distance_m: 30.0,
            blocking_distance_m: 20.0,
            lane_change_ahead_gap_m: 20.0,
            lane_change_side_gap_m: 15.0,
        }
    }
}

impl Params {
    /// Check that the parameters describe a usable planner.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.num_lanes == 0 {
            return Err(ParamsError::NoLanes);
        }
        if self.initial_lane >= self.num_lanes {
            return Err(ParamsError::InvalidInitialLane(self.initial_lane, self.num_lanes));
        }
        if self.trajectory_length == 0 {
            return Err(ParamsError::EmptyTrajectory);
        }

        for &(name, value) in &[
            ("lane_width_m", self.lane_width_m),
            ("cycle_period_s", self.cycle_period_s),
            ("target_speed_mph", self.target_speed_mph),
            ("speed_step_mph", self.speed_step_mph),
            ("mph_to_ms", self.mph_to_ms),
            ("resample_distance_m", self.resample_distance_m),
            ("blocking_distance_m", self.blocking_distance_m),
            ("lane_change_ahead_gap_m", self.lane_change_ahead_gap_m),
            ("lane_change_side_gap_m", self.lane_change_side_gap_m),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamsError::NotPositive(name, value));
            }
        }

        let offsets_ok = !self.anchor_offsets_m.is_empty()
            && self.anchor_offsets_m[0] > 0.0
            && self.anchor_offsets_m.windows(2).all(|w| w[1] > w[0])
            && self.anchor_offsets_m.iter().all(|o| o.is_finite());
        if !offsets_ok {
            return Err(ParamsError::InvalidAnchorOffsets(self.anchor_offsets_m.clone()));
        }

        Ok(())
    }

    /// Lateral offset of the centre of the given lane.
    pub fn lane_centre_d_m(&self, lane_index: usize) -> f64 {
        lane_index as f64 * self.lane_width_m + 0.5 * self.lane_width_m
    }

    /// Convert a speed in miles per hour into meters per second.
    pub fn speed_ms(&self, speed_mph: f64) -> f64 {
        speed_mph * self.mph_to_ms
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
