//! # Simulator messages
//!
//! The driving simulator speaks socket.io style event frames: a `42` prefix followed by a JSON
//! array holding the event name and its payload, for example
//! `42["telemetry",{"x":909.48,...}]`. This module defines the telemetry payload sent to the
//! planner and the control payload sent back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prefix marking a websocket message (4) carrying an event (2).
pub const EVENT_PREFIX: &str = "42";

/// Name of the event carrying telemetry from the simulator.
pub const TELEMETRY_EVENT: &str = "telemetry";

/// Reply asking the simulator to hand control back to the user.
pub const MANUAL_FRAME: &str = "42[\"manual\",{}]";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry from the simulator, sent once per update.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Telemetry {
    /// Ego position, map frame
    pub x: f64,
    pub y: f64,

    /// Ego Frenet position
    pub s: f64,
    pub d: f64,

    /// Ego heading in degrees
    pub yaw: f64,

    /// Ego speed in miles per hour
    pub speed: f64,

    /// X coordinates of the points of the previous path not yet driven
    pub previous_path_x: Vec<f64>,

    /// Y coordinates of the points of the previous path not yet driven
    pub previous_path_y: Vec<f64>,

    /// Frenet s of the last point of the previous path
    pub end_path_s: f64,

    /// Frenet d of the last point of the previous path
    pub end_path_d: f64,

    /// Other vehicles on the same side of the road, each as `[id, x, y, vx, vy, s, d]`
    pub sensor_fusion: Vec<[f64; 7]>,
}

/// Path the ego vehicle shall follow, one point per simulation step.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Control {
    pub next_x: Vec<f64>,
    pub next_y: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An event decoded from a simulator frame.
#[derive(Debug)]
pub enum SimEvent {
    /// The simulator is in autonomous mode and sent fresh telemetry.
    Telemetry(Telemetry),

    /// The simulator sent an event with no payload, it expects a manual reply.
    Manual,

    /// Any other named event, which the planner ignores.
    Other(String),
}

/// Errors which can occur while decoding a simulator frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("The frame is not a socket.io event (missing \"42\" prefix)")]
    NotAnEvent,

    #[error("The frame contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("The frame is not an [event, payload] array")]
    MalformedEvent,

    #[error("The telemetry payload is invalid: {0}")]
    InvalidTelemetry(serde_json::Error),

    #[error("The control payload could not be serialized: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimEvent {
    /// Decode an event from a raw simulator frame.
    pub fn from_frame(frame: &str) -> Result<Self, FrameError> {
        let body = frame
            .strip_prefix(EVENT_PREFIX)
            .ok_or(FrameError::NotAnEvent)?;

        let value: Value = serde_json::from_str(body).map_err(FrameError::InvalidJson)?;

        let (name, payload) = match value.as_array().map(|a| a.as_slice()) {
            Some([Value::String(name)]) => (name, &Value::Null),
            Some([Value::String(name), payload, ..]) => (name, payload),
            _ => return Err(FrameError::MalformedEvent),
        };

        // A null payload means the simulator is in manual mode
        if payload.is_null() {
            return Ok(SimEvent::Manual);
        }

        match name.as_str() {
            TELEMETRY_EVENT => serde_json::from_value(payload.clone())
                .map(SimEvent::Telemetry)
                .map_err(FrameError::InvalidTelemetry),
            other => Ok(SimEvent::Other(other.to_string())),
        }
    }
}

impl Control {
    /// Encode the control as a simulator `control` event frame.
    pub fn to_frame(&self) -> Result<String, FrameError> {
        let payload = serde_json::to_string(self).map_err(FrameError::SerializationError)?;

        Ok(format!("{}[\"control\",{}]", EVENT_PREFIX, payload))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TELEMETRY_FRAME: &str = r#"42["telemetry",{"x":909.48,"y":1128.67,"yaw":0,"speed":0,"s":124.8336,"d":6.164833,"previous_path_x":[909.5,909.6],"previous_path_y":[1128.7,1128.7],"end_path_s":0,"end_path_d":0,"sensor_fusion":[[0,1048.9,1158.7,16.1,1.2,263.3,2.1],[1,775.8,1425.2,0,0,6719.2,-280.2]]}]"#;

    #[test]
    fn test_telemetry_frame() {
        let t = match SimEvent::from_frame(TELEMETRY_FRAME).unwrap() {
            SimEvent::Telemetry(t) => t,
            e => panic!("Expected telemetry, got {:?}", e),
        };

        assert_eq!(t.x, 909.48);
        assert_eq!(t.previous_path_x.len(), 2);
        assert_eq!(t.sensor_fusion.len(), 2);
        assert_eq!(t.sensor_fusion[0][3], 16.1);
        assert_eq!(t.sensor_fusion[1][6], -280.2);
    }

    #[test]
    fn test_manual_and_invalid_frames() {
        assert!(matches!(
            SimEvent::from_frame("42[\"telemetry\",null]"),
            Ok(SimEvent::Manual)
        ));
        assert!(matches!(
            SimEvent::from_frame("42[\"hello\",{\"a\":1}]"),
            Ok(SimEvent::Other(ref n)) if n == "hello"
        ));
        assert!(matches!(SimEvent::from_frame("2"), Err(FrameError::NotAnEvent)));
        assert!(matches!(
            SimEvent::from_frame("42[\"telemetry\","),
            Err(FrameError::InvalidJson(_))
        ));
        assert!(matches!(
            SimEvent::from_frame("42{\"a\":1}"),
            Err(FrameError::MalformedEvent)
        ));
        assert!(matches!(
            SimEvent::from_frame("42[\"telemetry\",{\"x\":1.0}]"),
            Err(FrameError::InvalidTelemetry(_))
        ));
    }

    #[test]
    fn test_control_frame() {
        let control = Control {
            next_x: vec![1.0, 2.5],
            next_y: vec![0.0, -1.0],
        };

        assert_eq!(
            control.to_frame().unwrap(),
            "42[\"control\",{\"next_x\":[1.0,2.5],\"next_y\":[0.0,-1.0]}]"
        );
    }
}
