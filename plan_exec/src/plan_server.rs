//! # Planner Server Module
//!
//! This module abstracts over the networking side of the planner executable. The simulator bridge
//! sends each frame it receives from the simulator as a request, and forwards the reply back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::{open_socket, zmq, NetParams, SocketError, SocketOptions};
use log::debug;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the networking part of the planner executable.
///
/// Every frame returned by [`PlanServer::recv_frame`] must be answered with exactly one call to
/// [`PlanServer::send_frame`] before the next frame can be received.
pub struct PlanServer {
    /// REP socket which accepts frames from the bridge
    socket: zmq::Socket,

    /// Reply which timed out, it is owed to the bridge before any further frame is received
    pending_reply: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`PlanServer`]
#[derive(thiserror::Error, Debug)]
pub enum PlanServerError {
    #[error("Socket error: {0}")]
    SocketError(SocketError),

    #[error("Could not receive a frame from the bridge: {0}")]
    RecvError(zmq::Error),

    #[error("Timed out sending the reply to the bridge, it will be resent")]
    SendTimeout,

    #[error("Could not send the reply to the bridge: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanServer {
    /// Create a new instance of the planner server.
    ///
    /// This function will not wait for a connection from the bridge before returning.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PlanServerError> {
        let socket_options = SocketOptions {
            bind: true,
            linger: 1,
            recv_timeout: 1000,
            send_timeout: 100,
            ..Default::default()
        };

        let socket = open_socket(ctx, zmq::REP, socket_options, &params.plan_endpoint)
            .map_err(PlanServerError::SocketError)?;

        Ok(Self {
            socket,
            pending_reply: None,
        })
    }

    /// Receive the next frame from the bridge.
    ///
    /// `Ok(None)` is returned if nothing arrived before the receive timeout, or if a reply which
    /// timed out earlier still could not be delivered.
    ///
    /// Bytes which are not valid UTF-8 are replaced rather than rejected, so that a corrupt frame
    /// still gets a reply once decoding it fails.
    pub fn recv_frame(&mut self) -> Result<Option<String>, PlanServerError> {
        if let Some(reply) = self.pending_reply.take() {
            match self.send_frame(&reply) {
                Ok(()) => debug!("Delivered the delayed reply"),
                Err(PlanServerError::SendTimeout) => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        match self.socket.recv_bytes(0) {
            Ok(b) => Ok(Some(String::from_utf8_lossy(&b).into_owned())),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(PlanServerError::RecvError(e)),
        }
    }

    /// Send the reply to the last received frame.
    ///
    /// A reply which times out is kept and resent by the next call to
    /// [`PlanServer::recv_frame`].
    pub fn send_frame(&mut self, frame: &str) -> Result<(), PlanServerError> {
        match self.socket.send(frame, 0) {
            Ok(()) => Ok(()),
            Err(zmq::Error::EAGAIN) => {
                self.pending_reply = Some(frame.to_string());
                Err(PlanServerError::SendTimeout)
            }
            Err(e) => Err(PlanServerError::SendError(e)),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
