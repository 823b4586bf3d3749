//! Main planner executable entry point.
//!
//! # Architecture
//!
//! The executable serves frames forwarded from the driving simulator:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the highway map and initialise the planner
//!     - Main loop:
//!         - Receive a frame
//!         - Decode the telemetry, skipping the cycle if it is malformed
//!         - Run one planning cycle
//!         - Reply with the trajectory, or hand control back to the simulator
//!
//! # Simulator bridge
//!
//! The simulator speaks socket.io over a websocket, which the planner does not implement. An
//! external bridge must accept the simulator's websocket connection and, for every `42...` event
//! message it receives, send the message text unchanged as a ZMQ request to `plan_endpoint` (see
//! `plan_exec.toml`). The reply, a `control` or `manual` event frame, is written back to the
//! websocket as is. Exactly one reply is sent per request.
//!
//! Usage: `plan_exec [MAP_FILE]`. The map file given on the command line is used in place of the
//! one in `plan_exec.toml`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planner server abstraction.
mod plan_server;

/// Parameters for the planner executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

// Internal
use params::PlanExecParams;
use plan_lib::{
    planner::{handle_frame, InitData, Planner},
    ref_path::ReferencePath,
};
use plan_server::PlanServer;
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- LOAD PARAMETERS ----

    let exec_params: PlanExecParams =
        util::params::load("plan_exec.toml").wrap_err("Could not load exec params")?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("plan_exec", &exec_params.sessions_dir)
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Highway Planner Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD MAP ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let map_path = match args.len() {
        1 => host::get_sw_root()
            .wrap_err("Could not get the software root")?
            .join(&exec_params.map_file),
        2 => PathBuf::from(&args[1]),
        n => return Err(eyre!("Expected zero or one argument, found {}", n - 1)),
    };

    info!("Loading map from {:?}", map_path);

    let ref_path = ReferencePath::from_map_file(&map_path, exec_params.max_s_m)
        .wrap_err("Failed to load the map")?;

    info!(
        "Map loaded, {} waypoints, track length {} m",
        ref_path.len(),
        ref_path.max_s_m()
    );

    // ---- INITIALISE MODULES ----

    let mut planner = Planner::default();
    planner
        .init(
            InitData {
                params_path: "planner.toml".into(),
                ref_path,
            },
            &session,
        )
        .wrap_err("Failed to initialise the Planner")?;
    info!("Planner init complete");

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut server = PlanServer::new(&zmq_ctx, &exec_params.net)
        .wrap_err("Failed to initialise the PlanServer")?;
    info!("PlanServer listening on {}", exec_params.net.plan_endpoint);

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    loop {
        let frame = match server.recv_frame() {
            Ok(Some(f)) => f,
            Ok(None) => continue,
            Err(e) => return Err(e).wrap_err("Could not receive a frame from the bridge"),
        };

        let cycle_start = Instant::now();

        let cycles_before = planner.num_cycles();
        let reply = handle_frame(&mut planner, &frame);

        // Every request must get exactly one reply, a failed send is retried by the server
        if let Err(e) = server.send_frame(&reply) {
            warn!("Could not reply to the bridge: {}", e);
        }

        if planner.num_cycles() > cycles_before {
            if let Err(e) = planner.write() {
                warn!("Could not archive the Planner status: {}", e);
            }
        }

        let cycle_time_s = cycle_start.elapsed().as_secs_f64();
        if cycle_time_s > exec_params.max_cycle_time_s {
            warn!(
                "Cycle overran, took {:.6} s (budget {:.6} s)",
                cycle_time_s, exec_params.max_cycle_time_s
            );
        }
    }
}
