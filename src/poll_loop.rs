//! # Poll Loop
//!
//! Fixed-period driver for the sample → encode → send pipeline.
//!
//! ## States
//!
//! ```text
//! Idle --run()--> Ticking --Quit / channel closed--> ShuttingDown
//! ```
//!
//! `ShuttingDown` is terminal: the sampler is released, the serial port is
//! closed and the loop never resumes.
//!
//! ## Tick
//!
//! 1. Poll the sampler. `None` (no controller, or it went away) means nothing
//!    is sent this tick.
//! 2. Encode the snapshot and send it. A failed or timed-out write drops the
//!    frame; the next tick carries fresh state anyway.
//! 3. Render the snapshot, or the last-known one, on the display.
//!
//! Everything runs on one task. A tick that overruns delays the next one
//! instead of overlapping it, and a quit request is only handled between
//! ticks, so the port is never closed under an in-flight write.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::sampler::ControllerSampler;
use crate::controller::snapshot::ControllerSnapshot;
use crate::display::SnapshotDisplay;
use crate::error::MotorBridgeError;
use crate::motor::encoder::{encode_motor_frame, encode_reset_frame};
use crate::motor::protocol::CommandFrame;
use crate::serial::port_trait::SerialPortIO;
use crate::serial::SerialTransport;
use crate::telemetry::{FrameLogger, FrameRecord, RecordKind};

/// Number of ticks between status log messages (~10 s at 50 ms)
pub const LOG_INTERVAL_TICKS: u64 = 200;

/// Commands from the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    /// Send the reset frame out of band
    Reset,
    /// Stop ticking and release everything
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Ticking,
    ShuttingDown,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Loop is not in the Ticking state
    Skipped,
    /// No controller snapshot, nothing sent
    NoSnapshot,
    /// Frame written
    Sent,
    /// Write failed or timed out; frame dropped
    Dropped,
    /// Snapshot could not be encoded
    Rejected,
}

/// Counters reported while running and at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub empty_ticks: u64,
    pub resets_sent: u64,
}

/// Timing and diagnostics settings for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub period: Duration,
    /// Drain readback bytes from the board every tick
    pub read_inbound: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(50),
            read_inbound: false,
        }
    }
}

impl From<&Config> for LoopSettings {
    fn from(config: &Config) -> Self {
        Self {
            period: Duration::from_millis(config.poll.period_ms),
            read_inbound: config.serial.read_inbound,
        }
    }
}

/// Owns the sampler, transport and display for the lifetime of the loop.
pub struct PollLoop<P, D> {
    sampler: Option<ControllerSampler>,
    transport: SerialTransport<P>,
    display: D,
    frame_log: Option<FrameLogger>,
    settings: LoopSettings,
    state: LoopState,
    stats: LoopStats,
    last_snapshot: Option<ControllerSnapshot>,
}

impl<P: SerialPortIO, D: SnapshotDisplay> PollLoop<P, D> {
    /// Creates an idle loop.
    ///
    /// # Arguments
    ///
    /// * `sampler` - Controller sampler, or `None` when no usable controller was found
    /// * `transport` - Open serial transport
    /// * `display` - Renderer for each tick's snapshot
    /// * `settings` - Tick period and diagnostics
    pub fn new(
        sampler: Option<ControllerSampler>,
        transport: SerialTransport<P>,
        display: D,
        settings: LoopSettings,
    ) -> Self {
        Self {
            sampler,
            transport,
            display,
            frame_log: None,
            settings,
            state: LoopState::Idle,
            stats: LoopStats::default(),
            last_snapshot: None,
        }
    }

    /// Records every frame to `logger`.
    #[must_use]
    pub fn with_frame_log(mut self, logger: FrameLogger) -> Self {
        self.frame_log = Some(logger);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Idle → Ticking. Has no effect in any other state.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Ticking;
        }
    }

    /// Runs until a `Quit` command arrives or every command sender is dropped.
    ///
    /// # Returns
    ///
    /// Final counters after shutdown.
    pub async fn run(mut self, mut commands: mpsc::Receiver<LoopCommand>) -> LoopStats {
        self.start();

        let mut ticker = interval(self.settings.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting poll loop at {} ms on {}",
            self.settings.period.as_millis(),
            self.transport.device()
        );

        while self.state == LoopState::Ticking {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }

                command = commands.recv() => match command {
                    Some(LoopCommand::Reset) => {
                        if let Err(e) = self.reset().await {
                            warn!("Reset not delivered: {}", e);
                        }
                    }
                    Some(LoopCommand::Quit) | None => {
                        info!("Quit requested, shutting down...");
                        self.shutdown();
                    }
                },
            }
        }

        self.shutdown();
        self.stats
    }

    /// Runs one sample → encode → send → render cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        if self.state != LoopState::Ticking {
            return TickOutcome::Skipped;
        }

        self.stats.ticks += 1;

        let snapshot = match self.sampler.as_mut().map(ControllerSampler::try_poll) {
            Some(Ok(snapshot)) => Some(snapshot),
            Some(Err(e)) => {
                debug!("No snapshot: {}", e);
                None
            }
            None => None,
        };
        let live = snapshot.is_some();

        let outcome = match &snapshot {
            None => {
                self.stats.empty_ticks += 1;
                TickOutcome::NoSnapshot
            }
            Some(snapshot) => match encode_motor_frame(snapshot) {
                Ok(frame) => self.send_frame(frame).await,
                Err(e) => {
                    warn!("Cannot encode controller state: {}", e);
                    TickOutcome::Rejected
                }
            },
        };

        if self.settings.read_inbound {
            self.drain_inbound().await;
        }

        if let Some(snapshot) = snapshot {
            self.last_snapshot = Some(snapshot);
        }
        match &self.last_snapshot {
            Some(snapshot) => self.display.render(snapshot, live),
            None => self.display.render(&ControllerSnapshot::default(), false),
        }

        if self.stats.ticks % LOG_INTERVAL_TICKS == 0 {
            info!(
                "Ticks: {}, frames sent: {}, dropped: {}, without controller: {}",
                self.stats.ticks,
                self.stats.frames_sent,
                self.stats.frames_dropped,
                self.stats.empty_ticks
            );
        }

        outcome
    }

    /// Sends the reset frame immediately, bypassing the sampler.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the frame could not be written. Ignored
    /// (returns `Ok`) unless the loop is ticking.
    pub async fn reset(&mut self) -> crate::error::Result<()> {
        if self.state != LoopState::Ticking {
            debug!("Ignoring reset while {:?}", self.state);
            return Ok(());
        }

        let frame = encode_reset_frame();
        self.transport.send(frame.as_bytes()).await?;
        self.log_frame(&frame);
        self.stats.resets_sent += 1;
        info!("Motors reset");
        Ok(())
    }

    /// Releases the controller and closes the port. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.state == LoopState::ShuttingDown {
            return;
        }
        self.state = LoopState::ShuttingDown;

        if let Some(sampler) = self.sampler.as_mut() {
            sampler.release();
        }
        self.transport.close();

        if let Some(log) = self.frame_log.as_mut() {
            if let Err(e) = log.flush() {
                warn!("Failed to flush frame log: {}", e);
            }
        }

        info!(
            "Shut down after {} ticks ({} frames sent, {} dropped, {} resets)",
            self.stats.ticks, self.stats.frames_sent, self.stats.frames_dropped, self.stats.resets_sent
        );
    }

    async fn send_frame(&mut self, frame: CommandFrame) -> TickOutcome {
        match self.transport.send(frame.as_bytes()).await {
            Ok(()) => {
                self.stats.frames_sent += 1;
                self.log_frame(&frame);
                TickOutcome::Sent
            }
            Err(e @ MotorBridgeError::WriteTimeout(_)) => {
                self.stats.frames_dropped += 1;
                debug!("Dropped frame: {}", e);
                TickOutcome::Dropped
            }
            Err(e) => {
                self.stats.frames_dropped += 1;
                warn!("Failed to send frame: {}", e);
                TickOutcome::Dropped
            }
        }
    }

    async fn drain_inbound(&mut self) {
        match self.transport.poll_inbound().await {
            Ok(bytes) if !bytes.is_empty() => {
                debug!("Board says: {}", String::from_utf8_lossy(&bytes).trim_end());
                self.record(RecordKind::Readback, &bytes);
            }
            Ok(_) => {}
            Err(e) => debug!("Readback failed: {}", e),
        }
    }

    fn log_frame(&mut self, frame: &CommandFrame) {
        let kind = match frame {
            CommandFrame::Motor(_) => RecordKind::Command,
            CommandFrame::Reset => RecordKind::Reset,
        };
        self.record(kind, frame.as_bytes());
    }

    fn record(&mut self, kind: RecordKind, bytes: &[u8]) {
        if let Some(log) = self.frame_log.as_mut() {
            if let Err(e) = log.record(&FrameRecord::now(kind, bytes)) {
                warn!("Frame log write failed: {}", e);
            }
        }
    }
}
