//! Constant velocity prediction of the tracked vehicles and of the ego vehicle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::{
    planner::Params,
    ref_path::{Frenet, ReferencePath},
    vehicle::{TrackedVehicle, VehicleState},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A tracked vehicle with its position at the end of the look-ahead horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictedVehicle {
    pub id: i64,

    /// Frenet position as reported this cycle
    pub current: Frenet,

    /// Frenet position at the end of the horizon
    pub predicted: Frenet,
}

/// Where the ego vehicle is expected to be at the end of the look-ahead horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EgoForecast {
    /// Reported `s` this cycle
    pub current_s_m: f64,

    /// Forecast position, `d` being the centre of the lane the planner is targeting
    pub predicted: Frenet,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Look-ahead horizon covered by the given number of unconsumed path points.
pub fn horizon_s(lookahead_steps: usize, params: &Params) -> f64 {
    lookahead_steps as f64 * params.cycle_period_s
}

/// Move a vehicle along its current velocity for `horizon_s` and express the result in the
/// Frenet frame.
pub fn predict_vehicle(
    vehicle: &TrackedVehicle,
    horizon_s: f64,
    ref_path: &ReferencePath,
) -> PredictedVehicle {
    let position_m = vehicle.position_m + vehicle.velocity_ms * horizon_s;

    PredictedVehicle {
        id: vehicle.id,
        current: vehicle.frenet,
        predicted: ref_path.to_frenet(&position_m, vehicle.heading_rad()),
    }
}

/// Predict every tracked vehicle over the horizon.
pub fn predict_traffic(
    vehicles: &[TrackedVehicle],
    horizon_s: f64,
    ref_path: &ReferencePath,
) -> Vec<PredictedVehicle> {
    vehicles
        .iter()
        .map(|v| predict_vehicle(v, horizon_s, ref_path))
        .collect()
}

/// Forecast the ego vehicle at the end of the horizon.
///
/// The ego is assumed to travel along the track at the planned speed (not the measured one) and
/// to be centred in the lane it is being steered into.
pub fn forecast_ego(
    ego: &VehicleState,
    lane_index: usize,
    speed_mph: f64,
    horizon_s: f64,
    params: &Params,
) -> EgoForecast {
    EgoForecast {
        current_s_m: ego.frenet.s_m,
        predicted: Frenet::new(
            ego.frenet.s_m + horizon_s * params.speed_ms(speed_mph),
            params.lane_centre_d_m(lane_index),
        ),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ref_path::test_tracks::straight_track;
    use nalgebra::Vector2;

    #[test]
    fn test_predict_vehicle() {
        let path = straight_track();

        // 20 m/s along the track, 6 m to the right of the centre line
        let v = TrackedVehicle {
            id: 7,
            position_m: Vector2::new(100.0, -6.0),
            velocity_ms: Vector2::new(20.0, 0.0),
            frenet: Frenet::new(100.0, 6.0),
        };

        let p = predict_vehicle(&v, 1.0, &path);
        assert_eq!(p.id, 7);
        assert_eq!(p.current, Frenet::new(100.0, 6.0));
        assert!((p.predicted.s_m - 120.0).abs() < 1e-9);
        assert!((p.predicted.d_m - 6.0).abs() < 1e-9);

        // A zero horizon keeps the vehicle where it is
        let p = predict_vehicle(&v, 0.0, &path);
        assert!((p.predicted.s_m - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_ego() {
        let params = Params::default();
        let ego = VehicleState::from_raw(100.0, -6.0, 100.0, 6.0, 0.0, 40.0);

        let steps = 10;
        let f = forecast_ego(&ego, 2, 20.0, horizon_s(steps, &params), &params);

        assert_eq!(f.current_s_m, 100.0);
        assert!((f.predicted.s_m - (100.0 + 10.0 * 0.02 * 20.0 * 0.447)).abs() < 1e-9);
        assert_eq!(f.predicted.d_m, 10.0);
    }
}
