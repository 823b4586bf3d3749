//! # Communications interface crate.
//!
//! Provides the wire format exchanged with the driving simulator and the
//! network abstractions used to carry it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulator message definitions (telemetry in, control out)
pub mod sim;

/// Network module
pub mod net;
