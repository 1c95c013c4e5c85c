//! # VCU Control Unit
//!
//! Runs the control core at its configured tick period against the hosted
//! simulation plant. The plant answers the core's setpoint frames with
//! inverter status, and plays a scripted driver: brake held, ready-to-drive
//! pressed, then a gas ramp.
//!
//! Build with `--features rt` to pace the loop with
//! `clock_nanosleep(TIMER_ABSTIME)` under SCHED_FIFO.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vcu_common::config::ConfigLoader;
use vcu_common::consts::DEFAULT_CONFIG_PATH;
use vcu_common::vehicle::config::VcuConfig;
use vcu_control_unit::config::{ConfigSource, load};
use vcu_control_unit::cycle::{CycleRunner, rt_setup};
use vcu_control_unit::io::InboundQueue;
use vcu_control_unit::sim::{DriverScript, SimBus, SimVehicle};
use vcu_control_unit::vcu::Vcu;

/// VCU Control Unit: stage sequencer, inverter protocol and fault handling
#[derive(Parser, Debug)]
#[command(name = "vcu_control_unit")]
#[command(version)]
#[command(about = "Cyclic vehicle control core driven against a simulated vehicle")]
struct Args {
    /// Path to the VCU configuration TOML. Defaults are used when the
    /// default path does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    ticks: Option<u64>,

    /// CPU core to pin the loop to (rt feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("VCU Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("VCU Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let required = args.config != PathBuf::from(DEFAULT_CONFIG_PATH);
    let loaded = load(&args.config, required)?;
    if loaded.source == ConfigSource::Defaults {
        info!("running with stock vehicle configuration");
    }
    let config = loaded.config;
    info!(
        tick_period_us = config.tick_period_us,
        liveness_timeout = config.liveness.timeout_ticks,
        error_scan = ?config.fault_policy.inverter_error_scan,
        "config OK"
    );

    rt_setup(args.cpu_core, args.rt_priority)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let vcu = Vcu::new(config, SimBus::new(), InboundQueue::new());
    let mut runner = CycleRunner::new(vcu)?;
    let mut plant = SimVehicle::new(DriverScript::default());

    runner.run(&running, args.ticks, |tick, vcu| {
        let sent = vcu.io_mut().take_sent();
        for frame in plant.step(tick, &sent) {
            if vcu.inbound_mut().push_back(frame).is_err() {
                warn!(id = frame.id, "inbound queue full, frame lost");
            }
        }
    })?;

    let state = runner.vcu().state();
    info!(
        stage = ?state.stage,
        fault = %state.last_handled_fault,
        contactor = state.main_contactor,
        "final state"
    );
    Ok(())
}

/// `RUST_LOG` wins, then `--verbose`, then the `log_level` of the config file.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else {
        VcuConfig::load(&args.config)
            .map(|c| c.log_level)
            .unwrap_or_default()
            .as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
