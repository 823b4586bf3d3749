//! Handling of a single simulator frame

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};

// Internal
use super::{InputData, Planner};
use comms_if::sim::{SimEvent, MANUAL_FRAME};
use util::module::State;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Answer one frame from the simulator.
///
/// Telemetry runs a planning cycle and is answered with the control frame of the new trajectory.
/// Anything else, including frames which cannot be decoded or planned from, skips the cycle and
/// is answered with the manual frame. A skipped cycle leaves the planner state unchanged.
pub fn handle_frame(planner: &mut Planner, frame: &str) -> String {
    let input = match SimEvent::from_frame(frame) {
        Ok(SimEvent::Telemetry(telem)) => match InputData::from_telemetry(&telem) {
            Ok(i) => i,
            Err(e) => {
                warn!("Skipping cycle, invalid telemetry: {}", e);
                return MANUAL_FRAME.to_string();
            }
        },
        Ok(SimEvent::Manual) => return MANUAL_FRAME.to_string(),
        Ok(SimEvent::Other(name)) => {
            debug!("Ignoring \"{}\" event", name);
            return MANUAL_FRAME.to_string();
        }
        Err(e) => {
            warn!("Skipping cycle, could not decode frame: {}", e);
            return MANUAL_FRAME.to_string();
        }
    };

    let trajectory = match planner.proc(&input) {
        Ok((t, _)) => t,
        Err(e) => {
            warn!("Skipping cycle, planning failed: {}", e);
            return MANUAL_FRAME.to_string();
        }
    };

    trace!("Trajectory: {:?}", trajectory.points_m);

    match trajectory.to_control().to_frame() {
        Ok(f) => f,
        Err(e) => {
            warn!("Could not encode the trajectory: {}", e);
            MANUAL_FRAME.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        behaviour::PlannerState,
        planner::Params,
        ref_path::test_tracks::straight_track,
    };
    use comms_if::sim::Control;

    /// Telemetry for the stopped ego in the middle lane of the straight track.
    fn telemetry_frame(yaw_deg: f64, sensor_fusion: &str) -> String {
        format!(
            "42[\"telemetry\",{{\"x\":100.0,\"y\":-6.0,\"s\":100.0,\"d\":6.0,\"yaw\":{},\
             \"speed\":0.0,\"previous_path_x\":[],\"previous_path_y\":[],\"end_path_s\":0,\
             \"end_path_d\":0,\"sensor_fusion\":{}}}]",
            yaw_deg, sensor_fusion
        )
    }

    /// A vehicle far ahead in the left lane.
    const FREE_ROAD: &str = "[[0,300.0,-2.0,10.0,0.0,300.0,2.0]]";

    /// A stopped vehicle 10 m ahead in the ego lane.
    const BLOCKED: &str = "[[0,110.0,-6.0,0.0,0.0,110.0,6.0]]";

    fn planner() -> Planner {
        Planner::new(Params::default(), straight_track()).unwrap()
    }

    #[test]
    fn test_telemetry_gets_control() {
        let mut planner = planner();

        let reply = handle_frame(&mut planner, &telemetry_frame(0.0, FREE_ROAD));

        let body = reply.strip_prefix("42").unwrap();
        let (name, control): (String, Control) = serde_json::from_str(body).unwrap();
        assert_eq!(name, "control");
        assert_eq!(control.next_x.len(), 50);
        assert_eq!(control.next_y.len(), 50);
        assert!(control.next_x.iter().all(|&x| x > 100.0));

        assert_eq!(planner.num_cycles(), 1);
        assert!((planner.state().speed_mph - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_skipped_frames_get_manual() {
        let mut planner = planner();
        let initial: PlannerState = *planner.state();

        for frame in &[
            // Invalid UTF-8 after lossy decoding
            "42\u{fffd}\u{fffd}",
            "garbage",
            "42[\"telemetry\",null]",
            "42[\"telemetry\",{\"x\":\"a\",\"y\":[],\"s\":null}]",
            "42[\"hello\",{\"a\":1}]",
            "42[\"telemetry\",{\"x\":1.0}]",
        ] {
            assert_eq!(handle_frame(&mut planner, frame), MANUAL_FRAME, "frame {}", frame);
            assert_eq!(planner.state(), &initial);
            assert_eq!(planner.num_cycles(), 0);
        }
    }

    #[test]
    fn test_failed_plan_gets_manual() {
        let mut planner = planner();
        let initial: PlannerState = *planner.state();

        // Held stopped by the vehicle ahead while facing backwards, no anchor lies ahead
        assert_eq!(handle_frame(&mut planner, &telemetry_frame(180.0, BLOCKED)), MANUAL_FRAME);
        assert_eq!(planner.state(), &initial);
        assert_eq!(planner.num_cycles(), 0);

        // The planner keeps working afterwards
        assert_ne!(handle_frame(&mut planner, &telemetry_frame(0.0, FREE_ROAD)), MANUAL_FRAME);
        assert_eq!(planner.num_cycles(), 1);
    }
}
