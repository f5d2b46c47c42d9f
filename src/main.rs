// src/main.rs
// Offline entry point: replays the supervisor against a fixed robot pose, or
// builds the vibration map CSV.
//
// Usage: epuck-maintenance [config.yaml] [supervisor|map]

use epuck_maintenance::host::{FixedPosition, LogSink, SilentReceiver, TickBudget};
use epuck_maintenance::supervisor::read_accelerometer_data;
use epuck_maintenance::{ControllerConfig, ControllerError, Supervisor, VibrationMap};
use log::{error, info};
use std::error::Error;
use std::path::Path;

const DEFAULT_CONFIG: &str = "epuck.yaml";

fn run_supervisor(config: &ControllerConfig) -> Result<(), ControllerError> {
    let mut supervisor = Supervisor::from_config(
        config.supervisor.clone(),
        FixedPosition::new(config.supervisor.robot_position),
        LogSink::new(),
        SilentReceiver,
    );
    let mut clock = TickBudget::new(config.supervisor.max_ticks);
    let summary = supervisor.run(&mut clock, config.robot.time_step_ms);
    info!(
        "replayed {} ticks ({} ms simulated), {} frames emitted",
        summary.ticks,
        clock.elapsed_ms(),
        supervisor.emitter().sent()
    );
    Ok(())
}

fn run_map(config: &ControllerConfig) -> Result<(), ControllerError> {
    let dataset = read_accelerometer_data(&config.supervisor.dataset_path);
    let map = VibrationMap::generate(&dataset, &config.map);

    let [sx, sy] = config.map.source;
    if let Some(entry) = map.query(sx as u32, sy as u32, 11) {
        info!("acceleration at source cell, t=11: {:?}", entry.vibration());
    }
    map.write_csv(&config.map.output_path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let mode = args.next().unwrap_or_else(|| "supervisor".to_string());

    let config = ControllerConfig::load_or_default(Path::new(&config_path))?;
    info!("starting {} with {}", mode, config_path);

    match mode.as_str() {
        "supervisor" => run_supervisor(&config)?,
        "map" => run_map(&config)?,
        other => {
            error!("unknown mode {:?}, expected supervisor or map", other);
            return Err(format!("unknown mode: {}", other).into());
        }
    }

    info!("done");
    Ok(())
}
