//! # Trajectory generator
//!
//! Builds the path the ego vehicle follows for the next `trajectory_length` simulator steps.
//!
//! The unconsumed tail of the previous path is kept as is, so that the vehicle never sees a
//! discontinuity. It is then extended by fitting a spline through a few anchor points, expressed
//! in the vehicle frame at the end of the previous path, and sampling it at a spacing which
//! gives the planned speed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod frame;
mod spline;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;

// Internal
pub use frame::*;
pub use spline::*;

use crate::{
    behaviour::PlannerState,
    planner::Params,
    ref_path::{Frenet, ReferencePath},
    vehicle::VehicleState,
};
use comms_if::sim::Control;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum forward spacing, in the vehicle frame, between two kept anchors.
pub const MIN_ANCHOR_SPACING_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planned path, one point per simulator step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Points in the map frame
    pub points_m: Vec<Vector2<f64>>,

    /// Number of points at the start of `points_m` taken from the previous path
    pub num_reused: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajGenError {
    #[error("Only {0} anchor(s) are ahead of each other, at least 2 are needed")]
    TooFewAnchors(usize),

    #[error("Could not fit the trajectory spline: {0}")]
    SplineError(SplineError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.is_empty()
    }

    /// Number of points appended to the reused ones.
    pub fn num_new(&self) -> usize {
        self.points_m.len() - self.num_reused
    }

    /// Convert into the control message sent to the simulator.
    pub fn to_control(&self) -> Control {
        Control {
            next_x: self.points_m.iter().map(|p| p.x).collect(),
            next_y: self.points_m.iter().map(|p| p.y).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the trajectory for this cycle.
///
/// `previous_path` is the unconsumed part of the last trajectory, in driving order. `state` is
/// the planner state decided for this cycle.
pub fn generate(
    ego: &VehicleState,
    previous_path: &[Vector2<f64>],
    state: &PlannerState,
    params: &Params,
    ref_path: &ReferencePath,
) -> Result<Trajectory, TrajGenError> {
    let reused = &previous_path[..previous_path.len().min(params.trajectory_length)];
    let speed_ms = params.speed_ms(state.speed_mph);

    // ---- REFERENCE POINT ----

    let (before_m, ref_m, ref_yaw_rad) = match reused {
        [.., before, last] => {
            let diff_m = last - before;
            let yaw_rad = if diff_m.norm() > std::f64::EPSILON {
                diff_m.y.atan2(diff_m.x)
            } else {
                ego.yaw_rad
            };
            (*before, *last, yaw_rad)
        }
        _ => {
            // Synthetic point where the vehicle was one step ago
            let heading = Vector2::new(ego.yaw_rad.cos(), ego.yaw_rad.sin());
            (
                ego.position_m - heading * (params.cycle_period_s * speed_ms),
                ego.position_m,
                ego.yaw_rad,
            )
        }
    };

    // ---- ANCHORS ----

    let target_d_m = params.lane_centre_d_m(state.lane_index);

    let mut anchors_m = vec![before_m, ref_m];
    anchors_m.extend(
        params
            .anchor_offsets_m
            .iter()
            .map(|offset| ref_path.to_cartesian(&Frenet::new(ego.frenet.s_m + offset, target_d_m))),
    );

    let local_m = to_vehicle_frame(&anchors_m, &ref_m, ref_yaw_rad);

    let mut xs: Vec<f64> = Vec::with_capacity(local_m.len());
    let mut ys: Vec<f64> = Vec::with_capacity(local_m.len());
    for p in &local_m {
        let ahead = xs
            .last()
            .map_or(true, |&last_x| p.x > last_x + MIN_ANCHOR_SPACING_M);

        if ahead {
            xs.push(p.x);
            ys.push(p.y);
        } else {
            trace!("Dropping anchor at {:?}, not ahead of the previous one", p);
        }
    }

    if xs.len() < 2 {
        return Err(TrajGenError::TooFewAnchors(xs.len()));
    }

    let spline = CubicSpline::new(&xs, &ys).map_err(TrajGenError::SplineError)?;

    // ---- RESAMPLING ----

    let target_x_m = params.resample_distance_m;
    let target_y_m = spline.eval(target_x_m);
    let chord_m = target_x_m.hypot(target_y_m);

    let step_m = speed_ms * params.cycle_period_s;
    let num_new = params.trajectory_length - reused.len();

    let mut points_m = Vec::with_capacity(params.trajectory_length);
    points_m.extend_from_slice(reused);

    if step_m <= std::f64::EPSILON {
        // Stationary, hold at the reference point
        points_m.extend(std::iter::repeat(ref_m).take(num_new));
    } else {
        let num_steps = (chord_m / step_m).floor().max(1.0);
        let x_step_m = target_x_m / num_steps;

        let new_local_m: Vec<Vector2<f64>> = (0..num_new)
            .map(|i| {
                let x = x_step_m * (i + 1) as f64;
                Vector2::new(x, spline.eval(x))
            })
            .collect();

        points_m.extend(to_global_frame(&new_local_m, &ref_m, ref_yaw_rad));
    }

    trace!(
        "Trajectory: {} reused, {} new, ends at {:?}",
        reused.len(),
        num_new,
        points_m.last()
    );

    Ok(Trajectory {
        points_m,
        num_reused: reused.len(),
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ref_path::test_tracks::{circle_track, straight_track};

    fn state(lane_index: usize, speed_mph: f64) -> PlannerState {
        PlannerState {
            lane_index,
            speed_mph,
        }
    }

    /// Straight previous path along the middle lane of the straight track, starting at `x`.
    fn straight_previous(x: f64, num: usize, step_m: f64) -> Vec<Vector2<f64>> {
        (0..num)
            .map(|i| Vector2::new(x + step_m * (i + 1) as f64, -6.0))
            .collect()
    }

    #[test]
    fn test_straight_track_start() {
        let params = Params::default();
        let path = straight_track();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 0.0);

        let traj = generate(&ego, &[], &state(1, 0.2), &params, &path).unwrap();

        assert_eq!(traj.len(), 50);
        assert_eq!(traj.num_reused, 0);

        let step_m = 0.2 * 0.447 * 0.02;
        let mut last_x = 100.0;
        for p in &traj.points_m {
            assert!(p.x > last_x);
            assert!((p.x - last_x) < 1.5 * step_m);
            assert!((p.y + 6.0).abs() < 1e-6);
            last_x = p.x;
        }
    }

    #[test]
    fn test_reuses_previous_path() {
        let params = Params::default();
        let path = straight_track();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 20.0);
        let step_m = 20.0 * 0.447 * 0.02;

        for &num_prev in &[0, 1, 2, 10, 49, 50] {
            let prev = straight_previous(100.0, num_prev, step_m);
            let traj = generate(&ego, &prev, &state(1, 20.0), &params, &path).unwrap();

            assert_eq!(traj.len(), 50);
            assert_eq!(traj.num_reused, num_prev);
            assert_eq!(&traj.points_m[..num_prev], &prev[..]);

            // The first new point continues from the last reused one
            if num_prev >= 2 && num_prev < 50 {
                let gap_m = (traj.points_m[num_prev] - traj.points_m[num_prev - 1]).norm();
                assert!(gap_m > 0.5 * step_m && gap_m < 1.5 * step_m, "gap {}", gap_m);
            }
        }

        // Longer previous paths are truncated
        let prev = straight_previous(100.0, 60, step_m);
        let traj = generate(&ego, &prev, &state(1, 20.0), &params, &path).unwrap();
        assert_eq!(traj.len(), 50);
        assert_eq!(traj.num_reused, 50);
    }

    #[test]
    fn test_lane_change_moves_towards_target() {
        let params = Params::default();
        let path = straight_track();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 40.0);
        let step_m = 40.0 * 0.447 * 0.02;
        let prev = straight_previous(100.0, 5, step_m);

        // Lane 0 is at d = 2, which is y = -2 on this track
        let traj = generate(&ego, &prev, &state(0, 40.0), &params, &path).unwrap();
        let last = traj.points_m[49];
        assert!(last.y > -6.0 && last.y < -2.0 + 0.5);

        let mut last_y = -6.0 - 1e-9;
        for p in &traj.points_m[5..] {
            assert!(p.y >= last_y);
            last_y = p.y;
        }
    }

    #[test]
    fn test_standstill() {
        let params = Params::default();
        let path = straight_track();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 0.0);

        let traj = generate(&ego, &[], &state(1, 0.0), &params, &path).unwrap();

        assert_eq!(traj.len(), 50);
        for p in &traj.points_m {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!((p - Vector2::new(100.0, -6.0)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_standstill_with_previous_path() {
        let params = Params::default();
        let path = straight_track();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 0.1);

        // Stopping at the end of what is left of the last path
        let prev = straight_previous(100.0, 5, 0.2);
        let traj = generate(&ego, &prev, &state(1, 0.0), &params, &path).unwrap();

        assert_eq!(traj.len(), 50);
        assert_eq!(traj.num_reused, 5);
        assert_eq!(&traj.points_m[..5], &prev[..]);

        let last_reused = prev[4];
        for p in &traj.points_m[5..] {
            assert!((p - last_reused).norm() < 1e-9);
        }
    }

    #[test]
    fn test_coincident_previous_points() {
        let params = Params::default();
        let path = straight_track();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 10.0);

        // The vehicle stopped at the end of its last path
        let prev = vec![Vector2::new(101.0, -6.0); 3];
        let traj = generate(&ego, &prev, &state(1, 10.0), &params, &path).unwrap();

        assert_eq!(traj.len(), 50);
        assert!(traj.points_m[3].x > 101.0);
        assert!((traj.points_m[3].y + 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_anchor_ahead() {
        let params = Params::default();
        let path = straight_track();

        // Stopped and facing backwards along the track, so every forward anchor is behind the
        // vehicle and the synthetic previous point is on top of it
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 180.0, 0.0);

        assert!(matches!(
            generate(&ego, &[], &state(1, 0.0), &params, &path),
            Err(TrajGenError::TooFewAnchors(_))
        ));
    }

    #[test]
    fn test_across_loop_end() {
        let params = Params::default();
        let path = circle_track();
        let max_s = path.max_s_m();

        // Ego in the middle lane just before the end of the loop
        let s = max_s - 20.0;
        let pos = path.to_cartesian(&Frenet::new(s, 6.0));
        let ahead = path.to_cartesian(&Frenet::new(s + 1.0, 6.0)) - pos;
        let yaw_deg = ahead.y.atan2(ahead.x).to_degrees();
        let ego = VehicleState::from_raw(pos.x, pos.y, s, 6.0, yaw_deg, 45.0);

        let traj = generate(&ego, &[], &state(1, 45.0), &params, &path).unwrap();
        assert_eq!(traj.len(), 50);

        // Every point stays close to the middle lane
        for p in &traj.points_m {
            let f = path.to_frenet(p, ego.yaw_rad);
            assert!((f.d_m - 6.0).abs() < 0.5, "d = {}", f.d_m);
        }
    }

    #[test]
    fn test_to_control() {
        let traj = Trajectory {
            points_m: vec![Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0)],
            num_reused: 1,
        };

        let control = traj.to_control();
        assert_eq!(control.next_x, vec![1.0, 3.0]);
        assert_eq!(control.next_y, vec![2.0, 4.0]);
        assert_eq!(traj.num_new(), 1);
    }
}
