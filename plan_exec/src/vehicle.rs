//! # Vehicles
//!
//! Per-cycle descriptions of the ego vehicle and of the other vehicles reported by sensor fusion.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::ref_path::Frenet;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose and speed of the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleState {
    /// Position in the map frame
    pub position_m: Vector2<f64>,

    /// Position in the Frenet frame, as reported by the simulator
    pub frenet: Frenet,

    /// Heading in the map frame.
    ///
    /// Units: radians
    pub yaw_rad: f64,

    /// Units: miles per hour
    pub speed_mph: f64,
}

/// Another vehicle on the road, as reported by sensor fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedVehicle {
    pub id: i64,

    /// Position in the map frame
    pub position_m: Vector2<f64>,

    /// Velocity in the map frame.
    ///
    /// Units: meters/second
    pub velocity_ms: Vector2<f64>,

    /// Position in the Frenet frame, as reported by sensor fusion
    pub frenet: Frenet,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleState {
    /// Build the ego state from the raw telemetry values, `yaw` in degrees and `speed` in mph.
    pub fn from_raw(x: f64, y: f64, s: f64, d: f64, yaw_deg: f64, speed_mph: f64) -> Self {
        Self {
            position_m: Vector2::new(x, y),
            frenet: Frenet::new(s, d),
            yaw_rad: yaw_deg.to_radians(),
            speed_mph,
        }
    }
}

impl TrackedVehicle {
    /// Build a vehicle from a sensor fusion entry, `[id, x, y, vx, vy, s, d]`.
    pub fn from_sensor_fusion(entry: &[f64; 7]) -> Self {
        Self {
            id: entry[0] as i64,
            position_m: Vector2::new(entry[1], entry[2]),
            velocity_ms: Vector2::new(entry[3], entry[4]),
            frenet: Frenet::new(entry[5], entry[6]),
        }
    }

    /// Heading of the vehicle's velocity.
    pub fn heading_rad(&self) -> f64 {
        self.velocity_ms.y.atan2(self.velocity_ms.x)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
