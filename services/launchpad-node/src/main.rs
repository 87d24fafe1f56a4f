use anyhow::{bail, Context};
use launchpad_core::{logging, Config, Engine, MemoryLog};
use launchpad_domain::{resolve_relation, DroneTwin, LaunchPadState, LaunchPadTwin, MissionLogTwin};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const NODE_PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    protocol_version: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--version-json") {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let config = match parse_config_path(&args)? {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default_config(),
    };
    logging::init_from_config(&config.log);

    let node_id = config.node.node_id.clone();
    let launchpad_id = config.node.launchpad_id.clone();
    info!(
        node_id = %node_id,
        launchpad = %launchpad_id,
        change_buffer = config.engine.change_buffer,
        "Launchpad node starting"
    );

    let log = Arc::new(MemoryLog::with_capacity(
        node_id.clone(),
        config.engine.change_buffer,
    ));
    let engine = Engine::new(log);

    LaunchPadTwin::emit_launchpad_registered(&engine, launchpad_id.clone())
        .context("registering launchpad")?;

    let mut launchpad = engine.subscribe(LaunchPadTwin::new(launchpad_id.clone()))?;
    let mut mission_log = engine.subscribe(MissionLogTwin::new(launchpad_id.clone()))?;
    let mut mounted = resolve_relation(
        &engine,
        LaunchPadTwin::new(launchpad_id.clone()),
        |pad: &LaunchPadState| pad.drone().map(|drone| DroneTwin::new(drone)),
    )?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            state = launchpad.changed() => {
                let state = state?;
                info!(launchpad = %launchpad_id, state = ?state, "Launchpad state changed");
            }
            state = mission_log.changed() => {
                let state = state?;
                info!(
                    launchpad = %launchpad_id,
                    queued = state.next_missions.len(),
                    current = ?state.current_mission.as_ref().map(|m| m.id.as_str()),
                    completed = state.completed_missions.len(),
                    "Mission log changed"
                );
            }
            state = mounted.changed() => {
                match state? {
                    Some(drone) => info!(
                        launchpad = %launchpad_id,
                        drone = %drone.id(),
                        state = drone.kind(),
                        battery = ?drone.battery(),
                        "Mounted drone changed"
                    ),
                    None => info!(launchpad = %launchpad_id, "No drone mounted"),
                }
            }
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    info!(node_id = %node_id, "Shutting down");
    launchpad.cancel().await?;
    mission_log.cancel().await?;
    mounted.cancel().await?;
    Ok(())
}

fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            bail!("--config was provided without a path");
        }
    }

    Ok(None)
}
