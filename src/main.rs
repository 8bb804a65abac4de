//! # Motor Bridge
//!
//! Drive a microcontroller motor board from a game controller over a serial link.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with a non-blocking tracing subscriber
//!    - Load configuration (first CLI argument, else `config/default.toml`, else defaults)
//!    - Open the serial port (fatal on failure)
//!    - Open the first usable controller (optional: without one, nothing is sent)
//!
//! 2. **Main Loop**
//!    - Sample, encode and send one motor frame every poll period
//!    - `r` + Enter on stdin sends the reset frame, `q` + Enter quits
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C or `q` stops the loop
//!    - Controller released, port closed, final counters logged
//!
//! Expected output:
//! ```text
//! INFO motor_bridge: Motor Bridge v0.1.0 starting...
//! INFO motor_bridge::serial: Opened serial port /dev/ttyUSB0 at 38400 baud
//! INFO motor_bridge::controller::device: Found gamepad 'Xbox Wireless Controller' at /dev/input/event5 (5 axes, 11 buttons, 2 hats)
//! INFO motor_bridge::poll_loop: Starting poll loop at 50 ms on /dev/ttyUSB0
//! ```

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use motor_bridge::config::Config;
use motor_bridge::controller::device::Gamepad;
use motor_bridge::controller::sampler::ControllerSampler;
use motor_bridge::display::LogDisplay;
use motor_bridge::motor::encoder::check_capabilities;
use motor_bridge::poll_loop::{LoopCommand, LoopSettings, PollLoop};
use motor_bridge::serial::{PortConfig, SerialTransport};
use motor_bridge::telemetry::FrameLogger;

/// Config file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Pending operator commands before senders wait
const COMMAND_QUEUE_DEPTH: usize = 8;

#[tokio::main]
async fn main() -> Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Motor Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(std::env::args().nth(1))?;

    let transport = SerialTransport::open(PortConfig::from(&config.serial)).map_err(|e| {
        error!("Cannot open serial port {}: {}", config.serial.port, e);
        e
    })?;

    let sampler = open_controller(config.controller.device_path());

    let mut poll_loop = PollLoop::new(sampler, transport, LogDisplay::new(), LoopSettings::from(&config));
    if config.telemetry.enabled {
        match FrameLogger::new(&config.telemetry) {
            Ok(logger) => poll_loop = poll_loop.with_frame_log(logger),
            Err(e) => warn!("Frame log disabled: {}", e),
        }
    }

    let (commands, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    spawn_ctrl_c(commands.clone());
    spawn_stdin_commands(commands);

    info!("Type 'r' + Enter to reset the motors, 'q' + Enter or Ctrl+C to exit");

    let stats = poll_loop.run(rx).await;
    info!(
        "Total: {} ticks, {} frames sent, {} dropped, {} without controller, {} resets",
        stats.ticks, stats.frames_sent, stats.frames_dropped, stats.empty_ticks, stats.resets_sent
    );

    Ok(())
}

fn load_config(arg: Option<String>) -> Result<Config> {
    match arg {
        Some(path) => {
            let config = Config::load(&path).with_context(|| format!("loading config {}", path))?;
            info!("Loaded configuration from {}", path);
            Ok(config)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            let config = Config::load(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("loading config {}", DEFAULT_CONFIG_PATH))?;
            info!("Loaded configuration from {}", DEFAULT_CONFIG_PATH);
            Ok(config)
        }
        None => {
            info!("No configuration file, using defaults");
            Ok(Config::default())
        }
    }
}

/// Opens the controller, or logs why not and carries on without one.
fn open_controller(device_path: Option<&str>) -> Option<ControllerSampler> {
    let gamepad = match Gamepad::open(device_path) {
        Ok(gamepad) => gamepad,
        Err(e) => {
            warn!("{}; no frames will be sent", e);
            return None;
        }
    };

    if let Err(e) = check_capabilities(&gamepad.capabilities()) {
        warn!("{} at {}; no frames will be sent", e, gamepad.device_path());
        return None;
    }

    match gamepad.into_sampler() {
        Ok(sampler) => Some(sampler),
        Err(e) => {
            warn!("{}; no frames will be sent", e);
            None
        }
    }
}

fn spawn_ctrl_c(commands: mpsc::Sender<LoopCommand>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down...");
                let _ = commands.send(LoopCommand::Quit).await;
            }
            Err(e) => warn!("Cannot listen for Ctrl+C: {}", e),
        }
    });
}

/// Reads operator commands on a plain thread; a blocked stdin read must not
/// hold up runtime shutdown.
fn spawn_stdin_commands(commands: mpsc::Sender<LoopCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = parse_command(&line) else {
                debug!("Ignoring input {:?}", line);
                continue;
            };
            if commands.blocking_send(command).is_err() {
                break;
            }
        }
    });
}

fn parse_command(line: &str) -> Option<LoopCommand> {
    match line.trim() {
        "r" | "R" => Some(LoopCommand::Reset),
        "q" | "Q" => Some(LoopCommand::Quit),
        _ => None,
    }
}
