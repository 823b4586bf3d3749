//! # Network Module
//!
//! This module provides networking abstractions over ZMQ. The planner only needs a single
//! request-reply link to the simulator bridge, so the abstraction here is a thin layer which
//! creates a socket, applies a set of options and binds or connects it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Deserialize;
use zmq::{Context, Socket, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| SocketError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters shared by executables talking to the simulator bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Endpoint on which the planner serves telemetry requests, such as `"tcp://*:4567"`
    pub plan_endpoint: String,
}

/// Represents options which can be set on a socket.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation. Times are in
/// milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SocketOptions {
    /// Indicates if the socket should bind itself to the endpoint. Servers should have this value
    /// set as `true`, clients should have it set as `false`.
    pub bind: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,

    /// `ZMQ_HEARTBEAT_IVL`: Set interval between sending ZMTP heartbeats
    pub heartbeat_ivl: i32,

    /// `ZMQ_HEARTBEAT_TIMEOUT`: Set timeout for ZMTP heartbeats
    pub heartbeat_timeout: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum SocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Could not bind or connect the socket to {0}: {1}")]
    CouldNotConnect(String, zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), SocketError> {
        set_sockopts!(
            socket,
            (set_linger, self.linger),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout),
            (set_heartbeat_ivl, self.heartbeat_ivl),
            (set_heartbeat_timeout, self.heartbeat_timeout)
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            linger: 30_000,
            recv_timeout: -1,
            send_timeout: -1,
            heartbeat_ivl: 0,
            heartbeat_timeout: 0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a socket of the given type, apply the options to it and bind or connect it to the
/// endpoint.
pub fn open_socket(
    ctx: &Context,
    socket_type: SocketType,
    options: SocketOptions,
    endpoint: &str,
) -> Result<Socket, SocketError> {
    let socket = ctx.socket(socket_type).map_err(SocketError::CreateSocketError)?;

    options.set(&socket)?;

    if options.bind {
        socket.bind(endpoint)
    } else {
        socket.connect(endpoint)
    }
    .map_err(|e| SocketError::CouldNotConnect(endpoint.into(), e))?;

    debug!(
        "{} socket {} to {}",
        if options.bind { "Bound" } else { "Connected" },
        match socket_type {
            SocketType::REP => "REP",
            SocketType::REQ => "REQ",
            _ => "other",
        },
        endpoint
    );

    Ok(socket)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
