//! # Planner library.
//!
//! This library holds the motion planning core of the planner executable, so that it can be used
//! by benchmarks and by other crates in the workspace.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Behaviour planner - decides the lane and speed to target
pub mod behaviour;

/// Planner - runs one planning cycle per telemetry message
pub mod planner;

/// Reference path - the road centre line and the Frenet frame built on it
pub mod ref_path;

/// Traffic - prediction of the other vehicles and lane safety evaluation
pub mod traffic;

/// Trajectory generator - builds the path sent to the simulator
pub mod traj_gen;

/// Ego and tracked vehicle descriptions
pub mod vehicle;
