//! # Gamepad Device Module
//!
//! Gamepad detection, capability discovery and event reading using the Linux
//! evdev interface.
//!
//! ## Controller Detection
//!
//! Any `/dev/input/event*` device that reports `BTN_SOUTH` plus `ABS_X` and
//! `ABS_Y` is treated as a gamepad. Devices are scanned in path order, so the
//! same controller wins every time when several are plugged in.
//!
//! ## Input Layout
//!
//! evdev codes are mapped to the ordered indices carried in a
//! [`ControllerSnapshot`](super::snapshot::ControllerSnapshot). Codes the
//! device does not report are skipped, so indices stay dense.
//!
//! | Index | Axis | Xbox pad | Button | Xbox pad |
//! |-------|------|----------|--------|----------|
//! | 0 | ABS_X | Left stick X | BTN_SOUTH | A |
//! | 1 | ABS_Y | Left stick Y | BTN_EAST | B |
//! | 2 | ABS_Z − ABS_RZ | Triggers | BTN_NORTH | X |
//! | 3 | ABS_RX | Right stick X | BTN_WEST | Y |
//! | 4 | ABS_RY | Right stick Y | BTN_TL | LB |
//! | 5 | | | BTN_TR | RB |
//! | 6 | | | BTN_SELECT | Back |
//! | 7 | | | BTN_START | Start |
//! | 8 | | | BTN_THUMBL | Left stick click |
//! | 9 | | | BTN_THUMBR | Right stick click |
//! | 10 | | | BTN_MODE | Guide |
//!
//! Both triggers share index 2: each is read as a 0.0..=1.0 pull and the axis
//! is left pull minus right pull. Released triggers read 0.0, the left
//! trigger alone reads up to 1.0 and the right one alone down to -1.0.
//! A pad with only one trigger axis still gets index 2; the missing trigger
//! reads as released.
//!
//! Hats are `ABS_HAT0X/ABS_HAT0Y` and `ABS_HAT1X/ABS_HAT1Y` pairs.
//!
//! xpad reports the X button as `BTN_NORTH` and Y as `BTN_WEST`.

use std::path::Path;

use evdev::{AbsoluteAxisType, Device, EventStream, InputEventKind, Key};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use super::sampler::{ControllerSampler, InputEvent};
use super::snapshot::{DeviceCapabilities, HatDirection};
use crate::error::{MotorBridgeError, Result};

/// Where one snapshot axis comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSlot {
    /// A single absolute axis
    Single(AbsoluteAxisType),
    /// Left trigger minus right trigger
    Triggers {
        left: AbsoluteAxisType,
        right: AbsoluteAxisType,
    },
}

/// Axis slots in snapshot index order.
pub const AXIS_LAYOUT: [AxisSlot; 5] = [
    AxisSlot::Single(AbsoluteAxisType::ABS_X),
    AxisSlot::Single(AbsoluteAxisType::ABS_Y),
    AxisSlot::Triggers {
        left: AbsoluteAxisType::ABS_Z,
        right: AbsoluteAxisType::ABS_RZ,
    },
    AxisSlot::Single(AbsoluteAxisType::ABS_RX),
    AxisSlot::Single(AbsoluteAxisType::ABS_RY),
];

/// Button codes in snapshot index order.
pub const BUTTON_LAYOUT: [Key; 11] = [
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_NORTH,
    Key::BTN_WEST,
    Key::BTN_TL,
    Key::BTN_TR,
    Key::BTN_SELECT,
    Key::BTN_START,
    Key::BTN_THUMBL,
    Key::BTN_THUMBR,
    Key::BTN_MODE,
];

/// Hat axis pairs (x, y) in snapshot index order.
pub const HAT_LAYOUT: [(AbsoluteAxisType, AbsoluteAxisType); 2] = [
    (AbsoluteAxisType::ABS_HAT0X, AbsoluteAxisType::ABS_HAT0Y),
    (AbsoluteAxisType::ABS_HAT1X, AbsoluteAxisType::ABS_HAT1Y),
];

/// Range assumed when the kernel does not report one (8-bit pads).
const FALLBACK_RANGE: AxisRange = AxisRange { min: 0, max: 255 };

/// Raw value range of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    /// Maps a raw reading linearly onto -1.0..=1.0.
    ///
    /// Readings outside the range are clamped. A degenerate range
    /// (`max <= min`) always reads 0.0.
    ///
    /// # Examples
    ///
    /// ```
    /// use motor_bridge::controller::device::AxisRange;
    ///
    /// let stick = AxisRange { min: -32768, max: 32767 };
    /// assert_eq!(stick.normalize(-32768), -1.0);
    /// assert_eq!(stick.normalize(32767), 1.0);
    ///
    /// let trigger = AxisRange { min: 0, max: 255 };
    /// assert_eq!(trigger.normalize(0), -1.0);
    /// ```
    #[must_use]
    pub fn normalize(&self, raw: i32) -> f32 {
        if self.max <= self.min {
            return 0.0;
        }

        let span = f64::from(self.max) - f64::from(self.min);
        let offset = f64::from(raw) - f64::from(self.min);
        let normalized = offset / span * 2.0 - 1.0;

        normalized.clamp(-1.0, 1.0) as f32
    }

    /// Maps a raw trigger reading onto 0.0 (released) ..= 1.0 (fully pulled).
    ///
    /// A degenerate range always reads released.
    #[must_use]
    pub fn pull(&self, raw: i32) -> f32 {
        if self.max <= self.min {
            return 0.0;
        }
        (self.normalize(raw) + 1.0) / 2.0
    }
}

/// A supported axis code with its raw range.
type RangedAxis = (AbsoluteAxisType, AxisRange);

/// A resolved axis slot for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSource {
    Single(RangedAxis),
    /// Either side may be missing; a missing trigger reads released
    Triggers {
        left: Option<RangedAxis>,
        right: Option<RangedAxis>,
    },
}

/// Which evdev codes a device exposes, in snapshot index order.
#[derive(Debug, Clone, PartialEq)]
pub struct InputLayout {
    axes: Vec<AxisSource>,
    buttons: Vec<Key>,
    hats: Vec<(AbsoluteAxisType, AbsoluteAxisType)>,
}

impl InputLayout {
    /// Builds a layout by probing for each known code.
    ///
    /// # Arguments
    ///
    /// * `has_axis` - Whether the device reports an absolute axis
    /// * `has_key` - Whether the device reports a key
    /// * `range_of` - Raw range of a reported axis
    pub fn detect(
        has_axis: impl Fn(AbsoluteAxisType) -> bool,
        has_key: impl Fn(Key) -> bool,
        range_of: impl Fn(AbsoluteAxisType) -> AxisRange,
    ) -> Self {
        let ranged = |axis: AbsoluteAxisType| has_axis(axis).then(|| (axis, range_of(axis)));

        let axes = AXIS_LAYOUT
            .iter()
            .filter_map(|&slot| match slot {
                AxisSlot::Single(axis) => ranged(axis).map(AxisSource::Single),
                AxisSlot::Triggers { left, right } => {
                    let (left, right) = (ranged(left), ranged(right));
                    (left.is_some() || right.is_some()).then_some(AxisSource::Triggers { left, right })
                }
            })
            .collect();

        let buttons = BUTTON_LAYOUT.iter().copied().filter(|&key| has_key(key)).collect();

        let hats = HAT_LAYOUT
            .iter()
            .copied()
            .filter(|&(x, y)| has_axis(x) && has_axis(y))
            .collect();

        Self {
            axes,
            buttons,
            hats,
        }
    }

    fn from_device(device: &Device) -> Self {
        let abs_state = device.get_abs_state().ok();

        Self::detect(
            |axis| {
                device
                    .supported_absolute_axes()
                    .map_or(false, |axes| axes.contains(axis))
            },
            |key| device.supported_keys().map_or(false, |keys| keys.contains(key)),
            |axis| {
                abs_state
                    .as_ref()
                    .map(|state| {
                        let info = state[axis.0 as usize];
                        AxisRange {
                            min: info.minimum,
                            max: info.maximum,
                        }
                    })
                    .unwrap_or(FALLBACK_RANGE)
            },
        )
    }

    #[must_use]
    pub fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            axes: self.axes.len(),
            buttons: self.buttons.len(),
            hats: self.hats.len(),
        }
    }
}

/// Converts raw evdev events into [`InputEvent`]s for one layout.
///
/// Trigger and hat axes arrive separately, so the translator remembers the
/// last value of each to report the combined axis or direction.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    layout: InputLayout,
    /// (left, right) pull per axis slot; only used by trigger slots
    trigger_pulls: Vec<(f32, f32)>,
    hat_axes: Vec<(i32, i32)>,
}

impl EventTranslator {
    #[must_use]
    pub fn new(layout: InputLayout) -> Self {
        let trigger_pulls = vec![(0.0, 0.0); layout.axes.len()];
        let hat_axes = vec![(0, 0); layout.hats.len()];
        Self {
            layout,
            trigger_pulls,
            hat_axes,
        }
    }

    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    /// Loads the current raw position of every axis and returns the
    /// normalized snapshot axes.
    pub fn prime(&mut self, raw_value: impl Fn(AbsoluteAxisType) -> i32) -> Vec<f32> {
        let mut values = Vec::with_capacity(self.layout.axes.len());
        for (index, source) in self.layout.axes.iter().enumerate() {
            let value = match *source {
                AxisSource::Single((code, range)) => range.normalize(raw_value(code)),
                AxisSource::Triggers { left, right } => {
                    let pull = |side: Option<RangedAxis>| {
                        side.map_or(0.0, |(code, range)| range.pull(raw_value(code)))
                    };
                    let pulls = (pull(left), pull(right));
                    self.trigger_pulls[index] = pulls;
                    pulls.0 - pulls.1
                }
            };
            values.push(value);
        }
        values
    }

    /// Translates one evdev event; returns `None` for anything not in the layout.
    pub fn translate(&mut self, event: &evdev::InputEvent) -> Option<InputEvent> {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => self.translate_axis(axis, event.value()),
            InputEventKind::Key(key) => {
                let button = self.layout.buttons.iter().position(|&k| k == key)?;
                // value 2 is autorepeat, still held
                Some(if event.value() == 0 {
                    InputEvent::ButtonUp { button }
                } else {
                    InputEvent::ButtonDown { button }
                })
            }
            _ => None,
        }
    }

    fn translate_axis(&mut self, axis: AbsoluteAxisType, value: i32) -> Option<InputEvent> {
        let is = |side: Option<RangedAxis>| side.filter(|&(code, _)| code == axis);

        for (index, source) in self.layout.axes.iter().enumerate() {
            match *source {
                AxisSource::Single((code, range)) if code == axis => {
                    return Some(InputEvent::AxisMotion {
                        axis: index,
                        value: range.normalize(value),
                    });
                }
                AxisSource::Triggers { left, right } => {
                    let pulls = &mut self.trigger_pulls[index];
                    if let Some((_, range)) = is(left) {
                        pulls.0 = range.pull(value);
                    } else if let Some((_, range)) = is(right) {
                        pulls.1 = range.pull(value);
                    } else {
                        continue;
                    }
                    return Some(InputEvent::AxisMotion {
                        axis: index,
                        value: pulls.0 - pulls.1,
                    });
                }
                AxisSource::Single(_) => {}
            }
        }

        for (hat, &(hat_x, hat_y)) in self.layout.hats.iter().enumerate() {
            let state = &mut self.hat_axes[hat];
            if axis == hat_x {
                state.0 = value;
            } else if axis == hat_y {
                state.1 = value;
            } else {
                continue;
            }
            return Some(InputEvent::HatMotion {
                hat,
                direction: HatDirection::from_axes(state.0, state.1),
            });
        }

        None
    }
}

/// An opened gamepad, ready to be turned into a [`ControllerSampler`].
pub struct Gamepad {
    device: Device,
    device_path: String,
    translator: EventTranslator,
    initial_axes: Vec<f32>,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .field("layout", self.translator.layout())
            .finish_non_exhaustive()
    }
}

impl Gamepad {
    /// Open a gamepad
    ///
    /// Uses `device_path` when given, otherwise scans `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound`: No gamepad found on the system
    /// - `Controller`: The explicit path could not be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use motor_bridge::controller::device::Gamepad;
    ///
    /// let pad = Gamepad::open(None)?;
    /// println!("Connected to controller at: {}", pad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device_path: Option<&str>) -> Result<Self> {
        match device_path {
            Some(path) => Self::open_path(Path::new(path)),
            None => Self::scan(Path::new("/dev/input")),
        }
    }

    /// Open a specific event device
    pub fn open_path(path: &Path) -> Result<Self> {
        let device = Device::open(path).map_err(|e| {
            MotorBridgeError::Controller(format!("Failed to open {}: {}", path.display(), e))
        })?;

        if !Self::is_gamepad(&device) {
            warn!(
                "{} does not look like a gamepad, using it anyway",
                path.display()
            );
        }

        Ok(Self::from_device(device, path))
    }

    fn scan(input_dir: &Path) -> Result<Self> {
        if !input_dir.exists() {
            return Err(MotorBridgeError::Controller(format!(
                "{} directory not found",
                input_dir.display()
            )));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| {
                MotorBridgeError::Controller(format!("Failed to read {}: {}", input_dir.display(), e))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MotorBridgeError::Controller(format!("Failed to read directory entry: {}", e)))?;

        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_node = path
                .file_name()
                .map_or(false, |name| name.to_string_lossy().starts_with("event"));
            if !is_event_node {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if Self::is_gamepad(&device) {
                        return Ok(Self::from_device(device, &path));
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(MotorBridgeError::DeviceNotFound)
    }

    fn from_device(device: Device, path: &Path) -> Self {
        let layout = InputLayout::from_device(&device);
        let device_path = path.to_string_lossy().to_string();

        info!(
            "Found gamepad '{}' at {} ({} axes, {} buttons, {} hats)",
            device.name().unwrap_or("unnamed"),
            device_path,
            layout.axes.len(),
            layout.buttons.len(),
            layout.hats.len()
        );

        let mut translator = EventTranslator::new(layout);
        let initial_axes = match device.get_abs_state() {
            Ok(state) => translator.prime(|axis| state[axis.0 as usize].value),
            Err(e) => {
                debug!("Could not read initial axis state: {}", e);
                vec![0.0; translator.layout().axes.len()]
            }
        };

        Self {
            device,
            device_path,
            translator,
            initial_axes,
        }
    }

    /// Checks for the minimum evdev capabilities of a gamepad.
    pub fn is_gamepad(device: &Device) -> bool {
        let has_south = device
            .supported_keys()
            .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
        let has_stick = device.supported_absolute_axes().map_or(false, |axes| {
            axes.contains(AbsoluteAxisType::ABS_X) && axes.contains(AbsoluteAxisType::ABS_Y)
        });

        has_south && has_stick
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.translator.layout().capabilities()
    }

    /// Starts the reader task and hands back a sampler fed by it.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Controller` if the device cannot be switched to async reads.
    pub fn into_sampler(self) -> Result<ControllerSampler> {
        let name = self.device.name().unwrap_or("unnamed").to_string();
        let capabilities = self.translator.layout().capabilities();
        let translator = self.translator;

        let stream = self.device.into_event_stream().map_err(|e| {
            MotorBridgeError::Controller(format!("Failed to stream {}: {}", self.device_path, e))
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_events(stream, translator, tx, self.device_path));

        Ok(ControllerSampler::new(name, capabilities, self.initial_axes, rx).with_reader(reader))
    }
}

async fn read_events(
    mut stream: EventStream,
    mut translator: EventTranslator,
    tx: UnboundedSender<InputEvent>,
    device_path: String,
) {
    loop {
        match stream.next_event().await {
            Ok(event) => {
                if let Some(input) = translator.translate(&event) {
                    if tx.send(input).is_err() {
                        debug!("Sampler dropped, stopping reader for {}", device_path);
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Lost controller at {}: {}", device_path, e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::encoder::encode_motor_frame;
    use evdev::EventType;

    const STICK: AxisRange = AxisRange {
        min: -32768,
        max: 32767,
    };

    /// Xbox 360 pad as reported by xpad.
    fn xbox_layout() -> InputLayout {
        InputLayout::detect(
            |_| true,
            |key| key != Key::BTN_MODE,
            |axis| match axis {
                AbsoluteAxisType::ABS_Z | AbsoluteAxisType::ABS_RZ => AxisRange { min: 0, max: 255 },
                _ => STICK,
            },
        )
    }

    fn axis_event(axis: AbsoluteAxisType, value: i32) -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    fn key_event(key: Key, value: i32) -> evdev::InputEvent {
        evdev::InputEvent::new(EventType::KEY, key.code(), value)
    }

    #[test]
    fn test_normalize_endpoints_and_clamp() {
        assert_eq!(STICK.normalize(-32768), -1.0);
        assert_eq!(STICK.normalize(32767), 1.0);
        assert_eq!(STICK.normalize(100_000), 1.0);
        assert!(STICK.normalize(0).abs() < 0.001);

        let trigger = AxisRange { min: 0, max: 255 };
        assert_eq!(trigger.normalize(255), 1.0);
        assert_eq!(trigger.normalize(-5), -1.0);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        let flat = AxisRange { min: 10, max: 10 };
        assert_eq!(flat.normalize(10), 0.0);
        assert_eq!(flat.normalize(999), 0.0);
        assert_eq!(flat.pull(999), 0.0);
    }

    #[test]
    fn test_trigger_pull() {
        let trigger = AxisRange { min: 0, max: 255 };
        assert_eq!(trigger.pull(0), 0.0);
        assert_eq!(trigger.pull(255), 1.0);
        assert_eq!(trigger.pull(300), 1.0);
        assert!((trigger.pull(128) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_layout_capabilities() {
        let layout = xbox_layout();
        assert_eq!(
            layout.capabilities(),
            DeviceCapabilities {
                axes: 5,
                buttons: 10,
                hats: 2
            }
        );
    }

    #[test]
    fn test_layout_skips_missing_codes() {
        let layout = InputLayout::detect(
            |axis| {
                !matches!(
                    axis,
                    AbsoluteAxisType::ABS_Z | AbsoluteAxisType::ABS_RZ | AbsoluteAxisType::ABS_HAT1Y
                )
            },
            |key| key == Key::BTN_SOUTH || key == Key::BTN_START,
            |_| STICK,
        );

        // No triggers at all: ABS_RX shifts down to index 2
        assert_eq!(layout.axes[2], AxisSource::Single((AbsoluteAxisType::ABS_RX, STICK)));
        assert_eq!(layout.buttons, vec![Key::BTN_SOUTH, Key::BTN_START]);
        assert_eq!(layout.hats.len(), 1, "HAT1 needs both axes");
    }

    #[test]
    fn test_translate_axis() {
        let mut translator = EventTranslator::new(xbox_layout());

        let event = translator.translate(&axis_event(AbsoluteAxisType::ABS_Y, -32768));
        assert_eq!(event, Some(InputEvent::AxisMotion { axis: 1, value: -1.0 }));

        let event = translator.translate(&axis_event(AbsoluteAxisType::ABS_RY, 32767));
        assert_eq!(event, Some(InputEvent::AxisMotion { axis: 4, value: 1.0 }));

        let event = translator.translate(&axis_event(AbsoluteAxisType::ABS_RX, -32768));
        assert_eq!(event, Some(InputEvent::AxisMotion { axis: 3, value: -1.0 }));
    }

    #[test]
    fn test_triggers_share_one_axis() {
        let mut translator = EventTranslator::new(xbox_layout());
        let mut trigger = |axis, raw| translator.translate(&axis_event(axis, raw));

        assert_eq!(
            trigger(AbsoluteAxisType::ABS_Z, 0),
            Some(InputEvent::AxisMotion { axis: 2, value: 0.0 }),
            "released trigger rests at center"
        );
        assert_eq!(
            trigger(AbsoluteAxisType::ABS_Z, 255),
            Some(InputEvent::AxisMotion { axis: 2, value: 1.0 })
        );
        assert_eq!(
            trigger(AbsoluteAxisType::ABS_RZ, 255),
            Some(InputEvent::AxisMotion { axis: 2, value: 0.0 }),
            "both pulled cancel out"
        );
        assert_eq!(
            trigger(AbsoluteAxisType::ABS_Z, 0),
            Some(InputEvent::AxisMotion { axis: 2, value: -1.0 })
        );
    }

    #[test]
    fn test_single_trigger_pad_keeps_trigger_index() {
        let layout = InputLayout::detect(|axis| axis != AbsoluteAxisType::ABS_RZ, |_| true, |_| STICK);
        assert_eq!(layout.capabilities().axes, 5);
        assert_eq!(layout.axes[3], AxisSource::Single((AbsoluteAxisType::ABS_RX, STICK)));

        let mut translator = EventTranslator::new(layout);
        assert_eq!(
            translator.translate(&axis_event(AbsoluteAxisType::ABS_Z, 32767)),
            Some(InputEvent::AxisMotion { axis: 2, value: 1.0 })
        );
    }

    #[test]
    fn test_prime_seeds_held_trigger() {
        let mut translator = EventTranslator::new(xbox_layout());
        let axes = translator.prime(|axis| if axis == AbsoluteAxisType::ABS_Z { 255 } else { 0 });

        assert_eq!(axes.len(), 5);
        assert_eq!(axes[2], 1.0);

        // Left trigger is still remembered as held
        assert_eq!(
            translator.translate(&axis_event(AbsoluteAxisType::ABS_RZ, 255)),
            Some(InputEvent::AxisMotion { axis: 2, value: 0.0 })
        );
    }

    #[test]
    fn test_pad_at_rest_encodes_rest_frame() {
        let layout = xbox_layout();
        let caps = layout.capabilities();
        let mut translator = EventTranslator::new(layout);
        let initial_axes = translator.prime(|_| 0);

        let (tx, rx) = mpsc::unbounded_channel();
        let mut sampler = ControllerSampler::new("xbox", caps, initial_axes, rx);
        for axis in [
            AbsoluteAxisType::ABS_X,
            AbsoluteAxisType::ABS_Y,
            AbsoluteAxisType::ABS_Z,
            AbsoluteAxisType::ABS_RX,
            AbsoluteAxisType::ABS_RY,
            AbsoluteAxisType::ABS_RZ,
        ] {
            if let Some(input) = translator.translate(&axis_event(axis, 0)) {
                tx.send(input).unwrap();
            }
        }

        let frame = encode_motor_frame(&sampler.poll().unwrap()).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[250, 0, 50, 50, 50, 50, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );

        tx.send(translator.translate(&axis_event(AbsoluteAxisType::ABS_RZ, 255)).unwrap())
            .unwrap();
        let frame = encode_motor_frame(&sampler.poll().unwrap()).unwrap();
        assert_eq!(frame.as_bytes()[5], 0, "right trigger pulls the trigger byte down");

        tx.send(translator.translate(&axis_event(AbsoluteAxisType::ABS_RZ, 0)).unwrap())
            .unwrap();
        tx.send(translator.translate(&axis_event(AbsoluteAxisType::ABS_Z, 255)).unwrap())
            .unwrap();
        let frame = encode_motor_frame(&sampler.poll().unwrap()).unwrap();
        assert_eq!(frame.as_bytes()[5], 100, "left trigger pushes it up");
    }

    #[test]
    fn test_translate_buttons() {
        let mut translator = EventTranslator::new(xbox_layout());

        assert_eq!(
            translator.translate(&key_event(Key::BTN_THUMBR, 1)),
            Some(InputEvent::ButtonDown { button: 9 })
        );
        assert_eq!(
            translator.translate(&key_event(Key::BTN_THUMBR, 2)),
            Some(InputEvent::ButtonDown { button: 9 })
        );
        assert_eq!(
            translator.translate(&key_event(Key::BTN_EAST, 0)),
            Some(InputEvent::ButtonUp { button: 1 })
        );
        // Not part of this layout
        assert_eq!(translator.translate(&key_event(Key::BTN_MODE, 1)), None);
    }

    #[test]
    fn test_translate_hat_combines_axes() {
        let mut translator = EventTranslator::new(xbox_layout());

        assert_eq!(
            translator.translate(&axis_event(AbsoluteAxisType::ABS_HAT0Y, -1)),
            Some(InputEvent::HatMotion {
                hat: 0,
                direction: HatDirection::North
            })
        );
        assert_eq!(
            translator.translate(&axis_event(AbsoluteAxisType::ABS_HAT0X, 1)),
            Some(InputEvent::HatMotion {
                hat: 0,
                direction: HatDirection::NorthEast
            })
        );
        assert_eq!(
            translator.translate(&axis_event(AbsoluteAxisType::ABS_HAT0Y, 0)),
            Some(InputEvent::HatMotion {
                hat: 0,
                direction: HatDirection::East
            })
        );
        assert_eq!(
            translator.translate(&axis_event(AbsoluteAxisType::ABS_HAT1X, -1)),
            Some(InputEvent::HatMotion {
                hat: 1,
                direction: HatDirection::West
            })
        );
    }

    #[test]
    fn test_translate_ignores_other_events() {
        let mut translator = EventTranslator::new(xbox_layout());

        let syn = evdev::InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        assert_eq!(translator.translate(&syn), None);

        let gyro = axis_event(AbsoluteAxisType::ABS_TILT_X, 12);
        assert_eq!(translator.translate(&gyro), None);
    }

    #[test]
    fn test_open_invalid_path_returns_error() {
        let result = Gamepad::open(Some("/dev/input/nonexistent_event_device_12345"));

        match result {
            Err(MotorBridgeError::Controller(msg)) => {
                assert!(msg.contains("nonexistent_event_device_12345"));
            }
            other => panic!("Expected Controller error, got: {:?}", other),
        }
    }

    #[test]
    fn test_scan_missing_directory_returns_error() {
        let result = Gamepad::scan(Path::new("/nonexistent/input"));
        assert!(matches!(result, Err(MotorBridgeError::Controller(_))));
    }

    #[test]
    fn test_scan_without_event_nodes_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mouse0"), b"").unwrap();

        let result = Gamepad::scan(dir.path());
        assert!(matches!(result, Err(MotorBridgeError::DeviceNotFound)));
    }

    // Integration test - only runs with real hardware
    #[tokio::test]
    #[ignore]
    async fn test_sampler_with_real_hardware() {
        let pad = Gamepad::open(None).expect("Controller not found");
        println!("Controller: {:?}", pad);

        let mut sampler = pad.into_sampler().expect("Failed to start reader");
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let snapshot = sampler.poll().expect("Controller disconnected");
        println!("Snapshot: {:?}", snapshot);
        sampler.release();
    }
}
