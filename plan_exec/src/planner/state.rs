//! Implementations for the Planner state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::Serialize;
use std::time::Instant;

// Internal
use super::{InputError, Params, PlannerError, PlannerInitError};
use crate::{
    behaviour::{self, Decision, PlannerState},
    ref_path::ReferencePath,
    traffic,
    traj_gen::{self, Trajectory},
    vehicle::{TrackedVehicle, VehicleState},
};
use comms_if::sim::Telemetry;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planner module state
#[derive(Default)]
pub struct Planner {
    pub(crate) params: Params,

    /// `None` until the planner is initialised
    pub(crate) ref_path: Option<ReferencePath>,

    state: PlannerState,

    num_cycles: u64,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Data needed to initialise the planner.
pub struct InitData {
    /// Path to the parameter file, relative to the params directory
    pub params_path: String,

    /// The loaded reference path
    pub ref_path: ReferencePath,
}

/// Input data to the Planner, built from one telemetry message.
#[derive(Debug, Clone)]
pub struct InputData {
    pub ego: VehicleState,

    /// Points of the previous trajectory the simulator has not driven yet
    pub previous_path_m: Vec<Vector2<f64>>,

    /// Other vehicles on the ego side of the road
    pub traffic: Vec<TrackedVehicle>,
}

/// Status report for Planner processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub cycle: u64,
    pub lookahead_steps: usize,
    pub blocked_ahead: bool,
    pub left_clear: bool,
    pub right_clear: bool,
    pub decision: Decision,
    pub lane_index: usize,
    pub speed_mph: f64,
    pub num_reused_points: usize,
    pub num_new_points: usize,
    pub proc_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputData {
    /// Build the input data from a telemetry message.
    pub fn from_telemetry(telem: &Telemetry) -> Result<Self, InputError> {
        for &(name, value) in &[
            ("x", telem.x),
            ("y", telem.y),
            ("s", telem.s),
            ("d", telem.d),
            ("yaw", telem.yaw),
            ("speed", telem.speed),
        ] {
            if !value.is_finite() {
                return Err(InputError::NonFinite(name));
            }
        }

        if telem.previous_path_x.len() != telem.previous_path_y.len() {
            return Err(InputError::PreviousPathMismatch(
                telem.previous_path_x.len(),
                telem.previous_path_y.len(),
            ));
        }

        let previous_path_m: Vec<Vector2<f64>> = telem
            .previous_path_x
            .iter()
            .zip(telem.previous_path_y.iter())
            .map(|(&x, &y)| Vector2::new(x, y))
            .collect();
        if previous_path_m.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(InputError::NonFinite("previous_path"));
        }

        if telem
            .sensor_fusion
            .iter()
            .any(|entry| entry.iter().any(|v| !v.is_finite()))
        {
            return Err(InputError::NonFinite("sensor_fusion"));
        }

        Ok(Self {
            ego: VehicleState::from_raw(
                telem.x,
                telem.y,
                telem.s,
                telem.d,
                telem.yaw,
                telem.speed,
            ),
            previous_path_m,
            traffic: telem
                .sensor_fusion
                .iter()
                .map(TrackedVehicle::from_sensor_fusion)
                .collect(),
        })
    }
}

impl Planner {
    /// Create a planner without a session, which will not archive its status reports.
    pub fn new(params: Params, ref_path: ReferencePath) -> Result<Self, PlannerInitError> {
        params.validate().map_err(PlannerInitError::InvalidParams)?;

        Ok(Self {
            state: PlannerState::initial(&params),
            params,
            ref_path: Some(ref_path),
            ..Default::default()
        })
    }

    /// Replace the planner state, for starting from a known lane and speed.
    pub fn with_state(mut self, state: PlannerState) -> Self {
        self.state = state;
        self
    }

    /// The state decided on the last successful cycle.
    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of successful cycles so far.
    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }
}

impl State for Planner {
    type InitData = InitData;
    type InitError = PlannerInitError;

    type InputData = InputData;
    type OutputData = Trajectory;
    type StatusReport = StatusReport;
    type ProcError = PlannerError;

    /// Initialise the Planner module.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(&init_data.params_path)
            .map_err(PlannerInitError::ParamsLoadError)?;

        *self = Planner::new(params, init_data.ref_path)?;

        self.arch_report = Archiver::from_path(session, "planner/status_report.csv")
            .map_err(PlannerInitError::ArchiveError)?;

        Ok(())
    }

    /// Perform one planning cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let ref_path = self.ref_path.as_ref().ok_or(PlannerError::NotInit)?;

        let start = Instant::now();
        let params = &self.params;

        // ---- PREDICTION ----

        let lookahead_steps = input_data
            .previous_path_m
            .len()
            .min(params.trajectory_length);
        let horizon_s = traffic::horizon_s(lookahead_steps, params);

        let predicted = traffic::predict_traffic(&input_data.traffic, horizon_s, ref_path);
        let ego_forecast = traffic::forecast_ego(
            &input_data.ego,
            self.state.lane_index,
            self.state.speed_mph,
            horizon_s,
            params,
        );

        // ---- BEHAVIOUR ----

        let safety = traffic::evaluate(
            &ego_forecast,
            &predicted,
            self.state.lane_index,
            params,
            ref_path,
        );
        let (next_state, decision) = behaviour::update(&self.state, &safety, params);

        debug!(
            "Blocked: {}, left clear: {}, right clear: {}, decision: {:?}, lane: {}, speed: {:.1} mph",
            safety.blocked_ahead,
            safety.left_clear,
            safety.right_clear,
            decision,
            next_state.lane_index,
            next_state.speed_mph
        );

        // ---- TRAJECTORY ----

        let trajectory = traj_gen::generate(
            &input_data.ego,
            &input_data.previous_path_m,
            &next_state,
            params,
            ref_path,
        )
        .map_err(PlannerError::TrajGenError)?;

        // Only commit the new state once the cycle has succeeded
        self.state = next_state;
        self.num_cycles += 1;

        self.report = StatusReport {
            cycle: self.num_cycles,
            lookahead_steps,
            blocked_ahead: safety.blocked_ahead,
            left_clear: safety.left_clear,
            right_clear: safety.right_clear,
            decision,
            lane_index: next_state.lane_index,
            speed_mph: next_state.speed_mph,
            num_reused_points: trajectory.num_reused,
            num_new_points: trajectory.num_new(),
            proc_time_s: start.elapsed().as_secs_f64(),
        };

        Ok((trajectory, self.report))
    }
}

impl Archived for Planner {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ref_path::{test_tracks::straight_track, Frenet};

    /// Ego in the middle lane of the straight track at `s`, heading along it.
    fn ego_at(s_m: f64, speed_mph: f64) -> VehicleState {
        VehicleState::from_raw(s_m, -6.0, s_m, 6.0, 0.0, speed_mph)
    }

    /// A vehicle at `s` on the straight track, in the lane with centre `d`.
    fn vehicle(id: i64, s_m: f64, d_m: f64, speed_ms: f64) -> TrackedVehicle {
        TrackedVehicle {
            id,
            position_m: Vector2::new(s_m, -d_m),
            velocity_ms: Vector2::new(speed_ms, 0.0),
            frenet: Frenet::new(s_m, d_m),
        }
    }

    fn input(ego: VehicleState, previous_path_m: Vec<Vector2<f64>>, traffic: Vec<TrackedVehicle>)
        -> InputData
    {
        InputData {
            ego,
            previous_path_m,
            traffic,
        }
    }

    fn planner(state: PlannerState) -> Planner {
        Planner::new(Params::default(), straight_track())
            .unwrap()
            .with_state(state)
    }

    #[test]
    fn test_uninitialised() {
        let mut planner = Planner::default();
        assert!(matches!(
            planner.proc(&input(ego_at(100.0, 0.0), vec![], vec![])),
            Err(PlannerError::NotInit)
        ));
    }

    #[test]
    fn test_start_on_empty_road() {
        let mut planner = Planner::new(Params::default(), straight_track()).unwrap();
        assert_eq!(planner.state().lane_index, 1);
        assert_eq!(planner.state().speed_mph, 0.0);

        let (traj, report) = planner
            .proc(&input(ego_at(100.0, 0.0), vec![], vec![]))
            .unwrap();

        assert!((planner.state().speed_mph - 0.2).abs() < 1e-12);
        assert_eq!(planner.state().lane_index, 1);
        assert_eq!(report.decision, Decision::Accelerate);
        assert_eq!(report.cycle, 1);
        assert_eq!(planner.num_cycles(), 1);

        assert_eq!(traj.len(), 50);
        let mut last_x = 100.0;
        for p in &traj.points_m {
            assert!(p.x > last_x);
            assert!((p.y + 6.0).abs() < 1e-6);
            last_x = p.x;
        }
    }

    #[test]
    fn test_blocked_changes_left() {
        let mut planner = planner(PlannerState {
            lane_index: 1,
            speed_mph: 30.0,
        });

        let traffic = vec![vehicle(0, 110.0, 6.0, 0.0)];
        let (_, report) = planner
            .proc(&input(ego_at(100.0, 30.0), vec![], traffic))
            .unwrap();

        assert!(report.blocked_ahead);
        assert!(report.left_clear);
        assert_eq!(report.decision, Decision::ChangeLeft);
        assert_eq!(planner.state().lane_index, 0);
    }

    #[test]
    fn test_side_vehicle_prevents_change() {
        let params = Params::default();
        let mut planner = planner(PlannerState {
            lane_index: 1,
            speed_mph: 45.0,
        });

        // A full previous path puts the ego forecast about 20 m ahead of where it is now
        let step_m = 45.0 * params.mph_to_ms * params.cycle_period_s;
        let prev: Vec<Vector2<f64>> = (0..50)
            .map(|i| Vector2::new(100.0 + step_m * (i + 1) as f64, -6.0))
            .collect();

        // A vehicle blocking ahead of the forecast, and a stopped vehicle in the left lane beside
        // the ego. The stopped vehicle is predicted more than 15 m behind the forecast.
        let traffic = vec![
            vehicle(0, 110.0, 6.0, 20.0),
            vehicle(1, 100.0, 2.0, 0.0),
        ];
        let (_, report) = planner
            .proc(&input(ego_at(100.0, 45.0), prev, traffic))
            .unwrap();

        assert!(report.blocked_ahead);
        assert!(!report.left_clear);
        assert!(report.right_clear);
        assert_eq!(report.decision, Decision::ChangeRight);
        assert_eq!(planner.state().lane_index, 2);
    }

    #[test]
    fn test_blocked_everywhere_to_standstill() {
        let mut planner = planner(PlannerState {
            lane_index: 1,
            speed_mph: 0.1,
        });

        let traffic = vec![
            vehicle(0, 110.0, 6.0, 0.0),
            vehicle(1, 100.0, 2.0, 0.0),
            vehicle(2, 100.0, 10.0, 0.0),
        ];
        let (traj, report) = planner
            .proc(&input(ego_at(100.0, 0.1), vec![], traffic))
            .unwrap();

        assert_eq!(report.decision, Decision::Decelerate);
        assert_eq!(planner.state().speed_mph, 0.0);
        assert_eq!(traj.len(), 50);
        for p in &traj.points_m {
            assert!((p - Vector2::new(100.0, -6.0)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_bounds_over_many_cycles() {
        let params = Params::default();
        let mut planner = planner(PlannerState::initial(&params));

        let mut s = 100.0;
        for cycle in 0..400 {
            // Alternate between a free road and one blocked in every lane
            let traffic = if (cycle / 50) % 2 == 0 {
                vec![]
            } else {
                vec![
                    vehicle(0, s + 10.0, 6.0, 0.0),
                    vehicle(1, s + 10.0, 2.0, 0.0),
                    vehicle(2, s + 10.0, 10.0, 0.0),
                    vehicle(3, s, 2.0, 0.0),
                    vehicle(4, s, 10.0, 0.0),
                ]
            };

            let d = params.lane_centre_d_m(planner.state().lane_index);
            let ego = VehicleState::from_raw(s, -d, s, d, 0.0, planner.state().speed_mph);

            let (traj, _) = planner.proc(&input(ego, vec![], traffic)).unwrap();
            assert_eq!(traj.len(), params.trajectory_length);

            let state = planner.state();
            assert!(state.lane_index < params.num_lanes);
            assert!(state.speed_mph >= 0.0 && state.speed_mph <= params.target_speed_mph);

            s += params.speed_ms(state.speed_mph) * params.cycle_period_s;
        }
    }

    #[test]
    fn test_failed_cycle_keeps_state() {
        let initial = PlannerState {
            lane_index: 1,
            speed_mph: 0.0,
        };
        let mut planner = planner(initial);

        // Stopped and facing backwards, the trajectory cannot be built
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 180.0, 0.0);
        let traffic = vec![vehicle(0, 110.0, 6.0, 0.0)];

        assert!(matches!(
            planner.proc(&input(ego, vec![], traffic)),
            Err(PlannerError::TrajGenError(_))
        ));
        assert_eq!(planner.state(), &initial);
        assert_eq!(planner.num_cycles(), 0);
    }

    #[test]
    fn test_from_telemetry() {
        let mut telem = Telemetry {
            x: 909.48,
            y: 1128.67,
            s: 124.83,
            d: 6.16,
            yaw: 90.0,
            speed: 10.0,
            previous_path_x: vec![909.5, 909.6],
            previous_path_y: vec![1128.7, 1128.8],
            end_path_s: 125.0,
            end_path_d: 6.0,
            sensor_fusion: vec![[3.0, 1000.0, 1150.0, 10.0, 0.0, 200.0, 2.0]],
        };

        let input = InputData::from_telemetry(&telem).unwrap();
        assert_eq!(input.previous_path_m[1], Vector2::new(909.6, 1128.8));
        assert_eq!(input.traffic[0].id, 3);
        assert!((input.ego.yaw_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        telem.previous_path_y.pop();
        assert!(matches!(
            InputData::from_telemetry(&telem),
            Err(InputError::PreviousPathMismatch(2, 1))
        ));

        telem.previous_path_y.push(1128.8);
        telem.speed = std::f64::NAN;
        assert!(matches!(
            InputData::from_telemetry(&telem),
            Err(InputError::NonFinite("speed"))
        ));
    }
}
