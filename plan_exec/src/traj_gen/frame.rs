//! Transforms between the map frame and the vehicle frame.
//!
//! The vehicle frame has its origin at a reference point with its X axis along the reference
//! heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation2, Vector2};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Express map frame points in the vehicle frame at `origin_m` with heading `yaw_rad`.
pub fn to_vehicle_frame(
    points_m: &[Vector2<f64>],
    origin_m: &Vector2<f64>,
    yaw_rad: f64,
) -> Vec<Vector2<f64>> {
    let rot = Rotation2::new(-yaw_rad);

    points_m.iter().map(|p| rot * (p - origin_m)).collect()
}

/// Express vehicle frame points, in the frame at `origin_m` with heading `yaw_rad`, in the map
/// frame.
pub fn to_global_frame(
    points_m: &[Vector2<f64>],
    origin_m: &Vector2<f64>,
    yaw_rad: f64,
) -> Vec<Vector2<f64>> {
    let rot = Rotation2::new(yaw_rad);

    points_m.iter().map(|p| rot * *p + origin_m).collect()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
