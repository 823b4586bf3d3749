//! Cyclic module interface
//!
//! A cyclic module is set up once from a parameter file and then driven once
//! per simulator message. The planner in `plan_exec` is the only one so far,
//! the trait keeps the executable's main loop independent of its internals.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// Persistent state of a cyclic module.
pub trait State {
    /// Everything `init` needs beyond the session, typically a parameter
    /// file path plus any data loaded by the executable.
    type InitData;
    type InitError;

    /// One cycle's worth of input.
    type InputData;
    /// The product of a cycle, sent on by the executable.
    type OutputData;
    /// Diagnostics for a cycle, logged and archived by the caller.
    type StatusReport;
    type ProcError;

    /// Prepare the module for cyclic processing.
    ///
    /// Any files the module writes during the run go under the session's
    /// archive directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run a single cycle.
    ///
    /// A cycle either completes and commits its changes to the persistent
    /// state, or fails and leaves the state exactly as it found it.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
