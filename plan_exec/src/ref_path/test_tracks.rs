//! Synthetic tracks used by the unit tests.

use nalgebra::Vector2;
use std::f64::consts::{FRAC_PI_2, TAU};

use super::{ReferencePath, Waypoint};

/// Spacing of the waypoints on the straight track.
pub const STRAIGHT_SPACING_M: f64 = 30.0;

/// Number of waypoints on the straight track.
pub const STRAIGHT_NUM_WAYPOINTS: usize = 101;

/// Radius of the circular track.
pub const CIRCLE_RADIUS_M: f64 = 400.0;

/// Number of waypoints on the circular track.
pub const CIRCLE_NUM_WAYPOINTS: usize = 200;

/// A straight track along the +X axis from 0 to 3000 m.
///
/// The loop closes by running straight back to the origin, tests keep well away from that
/// segment.
pub fn straight_track() -> ReferencePath {
    let waypoints = (0..STRAIGHT_NUM_WAYPOINTS)
        .map(|i| {
            let x = i as f64 * STRAIGHT_SPACING_M;
            Waypoint {
                position_m: Vector2::new(x, 0.0),
                s_m: x,
                normal: Vector2::new(0.0, -1.0),
            }
        })
        .collect();

    let length_m = (STRAIGHT_NUM_WAYPOINTS - 1) as f64 * STRAIGHT_SPACING_M;

    ReferencePath::new(waypoints, 2.0 * length_m).unwrap()
}

/// A counter-clockwise circular track centred on the `d` sign reference point, so that positive
/// `d` is outwards.
pub fn circle_track() -> ReferencePath {
    let dtheta = TAU / CIRCLE_NUM_WAYPOINTS as f64;
    let chord_m = 2.0 * CIRCLE_RADIUS_M * (0.5 * dtheta).sin();
    let centre = Vector2::new(super::D_SIGN_REF_POINT_M[0], super::D_SIGN_REF_POINT_M[1]);

    let waypoints = (0..CIRCLE_NUM_WAYPOINTS)
        .map(|i| {
            let theta = i as f64 * dtheta - FRAC_PI_2;
            let radial = Vector2::new(theta.cos(), theta.sin());
            Waypoint {
                position_m: centre + radial * CIRCLE_RADIUS_M,
                s_m: i as f64 * chord_m,
                normal: radial,
            }
        })
        .collect();

    ReferencePath::new(waypoints, CIRCLE_NUM_WAYPOINTS as f64 * chord_m).unwrap()
}
