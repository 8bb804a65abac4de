//! # Controller Sampler
//!
//! Keeps the latest known state of one controller and turns it into a
//! [`ControllerSnapshot`] once per tick.
//!
//! Input arrives as [`InputEvent`]s on a channel fed by the device reader
//! task (see [`super::device`]). [`ControllerSampler::poll`] drains whatever
//! is already queued with `try_recv`, so it never waits for the device.
//! Later events overwrite earlier ones for the same input.
//!
//! When the reader task ends (device unplugged, read error) the channel
//! closes; from then on `poll` returns `None` and the caller sends nothing.
//! Reconnecting requires a restart.
//!
//! ## Usage
//!
//! ```
//! use motor_bridge::controller::sampler::{ControllerSampler, InputEvent};
//! use motor_bridge::controller::snapshot::DeviceCapabilities;
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::unbounded_channel();
//! let caps = DeviceCapabilities { axes: 5, buttons: 10, hats: 1 };
//! let mut sampler = ControllerSampler::new("test pad", caps, vec![0.0; 5], rx);
//!
//! tx.send(InputEvent::ButtonDown { button: 0 }).unwrap();
//! let snapshot = sampler.poll().unwrap();
//! assert!(snapshot.button(0));
//! ```

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::snapshot::{ControllerSnapshot, DeviceCapabilities, HatDirection};
use crate::error::{MotorBridgeError, Result};

/// A single normalized input change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Axis moved; `value` is normalized to -1.0..=1.0
    AxisMotion { axis: usize, value: f32 },
    /// Button pressed
    ButtonDown { button: usize },
    /// Button released
    ButtonUp { button: usize },
    /// Hat switch changed direction
    HatMotion { hat: usize, direction: HatDirection },
}

/// Latest-value store for one connected controller.
#[derive(Debug)]
pub struct ControllerSampler {
    name: String,
    capabilities: DeviceCapabilities,
    axes: Vec<f32>,
    buttons: Vec<bool>,
    hats: Vec<HatDirection>,
    events: UnboundedReceiver<InputEvent>,
    reader: Option<JoinHandle<()>>,
    connected: bool,
}

impl ControllerSampler {
    /// Creates a sampler for a device with the given capabilities.
    ///
    /// # Arguments
    ///
    /// * `name` - Human-readable device name (for logs)
    /// * `capabilities` - Input counts reported by the device
    /// * `initial_axes` - Current axis positions; resized to `capabilities.axes`
    /// * `events` - Receiving end of the device event queue
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        capabilities: DeviceCapabilities,
        mut initial_axes: Vec<f32>,
        events: UnboundedReceiver<InputEvent>,
    ) -> Self {
        initial_axes.resize(capabilities.axes, 0.0);

        Self {
            name: name.into(),
            capabilities,
            axes: initial_axes,
            buttons: vec![false; capabilities.buttons],
            hats: vec![HatDirection::Centered; capabilities.hats],
            events,
            reader: None,
            connected: true,
        }
    }

    /// Attaches the reader task so [`release`](Self::release) can stop it.
    #[must_use]
    pub fn with_reader(mut self, reader: JoinHandle<()>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    /// False once the device has gone away or been released.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Drains queued events and returns the current state.
    ///
    /// # Returns
    ///
    /// * `Some(snapshot)` - Latest value of every axis, button and hat
    /// * `None` - The device is disconnected or released
    pub fn poll(&mut self) -> Option<ControllerSnapshot> {
        self.try_poll().ok()
    }

    /// Like [`poll`](Self::poll), but says why there is no snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DeviceDisconnected` once the reader task has ended or the
    /// sampler was released.
    pub fn try_poll(&mut self) -> Result<ControllerSnapshot> {
        if !self.connected {
            return Err(MotorBridgeError::DeviceDisconnected(self.name.clone()));
        }

        loop {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Controller '{}' disconnected, sending nothing until restart", self.name);
                    self.connected = false;
                    return Err(MotorBridgeError::DeviceDisconnected(self.name.clone()));
                }
            }
        }

        Ok(ControllerSnapshot::new(
            self.axes.clone(),
            self.buttons.clone(),
            self.hats.clone(),
        ))
    }

    /// Stops the reader task and stops producing snapshots. Safe to call twice.
    pub fn release(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
            info!("Released controller '{}'", self.name);
        }
        self.events.close();
        self.connected = false;
    }

    fn apply(&mut self, event: InputEvent) {
        let slot_found = match event {
            InputEvent::AxisMotion { axis, value } => set(&mut self.axes, axis, value),
            InputEvent::ButtonDown { button } => set(&mut self.buttons, button, true),
            InputEvent::ButtonUp { button } => set(&mut self.buttons, button, false),
            InputEvent::HatMotion { hat, direction } => set(&mut self.hats, hat, direction),
        };

        if !slot_found {
            debug!("Ignoring event for unknown input: {:?}", event);
        }
    }
}

impl Drop for ControllerSampler {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

fn set<T>(slots: &mut [T], index: usize, value: T) -> bool {
    match slots.get_mut(index) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}
