//! # Traffic
//!
//! Prediction of where the other vehicles will be once the ego vehicle has driven the rest of
//! its previous path, and evaluation of which lanes that leaves safe.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod predict;
mod safety;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use predict::*;
pub use safety::*;
