//! # Motor Frame Encoder
//!
//! Builds motor command frames from controller snapshots.
//!
//! ## Frame Layout
//!
//! | Offset | Source | Mapping |
//! |--------|--------|---------|
//! | 0 | - | constant 250 |
//! | 1 | axis 1 (left stick Y) | [`half_range_clamp`] |
//! | 2 | axis 0 (left stick X) | [`symmetric_to_percentage`] |
//! | 3 | axis 4 (right stick Y) | [`symmetric_to_percentage`] of the negated value |
//! | 4 | axis 3 (right stick X) | [`symmetric_to_percentage`] |
//! | 5 | axis 2 (trigger) | [`symmetric_to_percentage`] |
//! | 6-15 | buttons 0-9 | 0 or 1 |
//! | 16 | - | reserved D-pad, constant 0 |
//!
//! Encoding is pure: the same snapshot always produces the same bytes.

use super::axis::{half_range_clamp, symmetric_to_percentage};
use super::protocol::*;
use crate::controller::snapshot::{ControllerSnapshot, DeviceCapabilities};
use crate::error::{MotorBridgeError, Result};

/// Fewest axes a controller must expose (left stick, trigger, right stick)
pub const MIN_AXES: usize = 5;

/// Fewest buttons a controller must expose
pub const MIN_BUTTONS: usize = offsets::BUTTON_COUNT;

/// Axis indices read by the encoder.
pub mod axes {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 1;
    pub const TRIGGER: usize = 2;
    pub const RIGHT_X: usize = 3;
    pub const RIGHT_Y: usize = 4;
}

/// Verifies that a device exposes enough inputs to fill a motor frame.
///
/// # Errors
///
/// Returns `UnsupportedDevice` if the device has fewer than [`MIN_AXES`]
/// axes or [`MIN_BUTTONS`] buttons.
///
/// # Examples
///
/// ```
/// use motor_bridge::controller::snapshot::DeviceCapabilities;
/// use motor_bridge::motor::encoder::check_capabilities;
///
/// let xbox = DeviceCapabilities { axes: 5, buttons: 11, hats: 1 };
/// assert!(check_capabilities(&xbox).is_ok());
///
/// let stick = DeviceCapabilities { axes: 2, buttons: 2, hats: 0 };
/// assert!(check_capabilities(&stick).is_err());
/// ```
pub fn check_capabilities(capabilities: &DeviceCapabilities) -> Result<()> {
    if capabilities.axes < MIN_AXES || capabilities.buttons < MIN_BUTTONS {
        return Err(MotorBridgeError::UnsupportedDevice {
            axes: capabilities.axes,
            buttons: capabilities.buttons,
            required_axes: MIN_AXES,
            required_buttons: MIN_BUTTONS,
        });
    }
    Ok(())
}

/// Encode a controller snapshot into a 17-byte motor command frame
///
/// # Arguments
///
/// * `snapshot` - Controller state captured this tick
///
/// # Returns
///
/// * `Result<CommandFrame>` - `CommandFrame::Motor` with every byte in range
///
/// # Errors
///
/// Returns `UnsupportedDevice` if the snapshot carries too few axes or buttons.
///
/// # Examples
///
/// ```
/// use motor_bridge::controller::snapshot::ControllerSnapshot;
/// use motor_bridge::motor::encoder::encode_motor_frame;
///
/// let snapshot = ControllerSnapshot::new(vec![0.0; 5], vec![false; 10], vec![]);
/// let frame = encode_motor_frame(&snapshot)?;
/// assert_eq!(
///     frame.as_bytes(),
///     &[250, 0, 50, 50, 50, 50, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
/// );
/// # Ok::<(), motor_bridge::error::MotorBridgeError>(())
/// ```
pub fn encode_motor_frame(snapshot: &ControllerSnapshot) -> Result<CommandFrame> {
    check_capabilities(&snapshot.capabilities())?;

    let axis = |index: usize| snapshot.axis(index).unwrap_or(0.0);

    let mut frame = [0u8; MOTOR_FRAME_SIZE];
    frame[offsets::FLAG] = MOTOR_COMMAND_FLAG;
    frame[offsets::THROTTLE] = half_range_clamp(axis(axes::LEFT_Y));
    frame[offsets::STEER] = symmetric_to_percentage(axis(axes::LEFT_X));
    frame[offsets::CAMERA_Y] = symmetric_to_percentage(-axis(axes::RIGHT_Y));
    frame[offsets::CAMERA_X] = symmetric_to_percentage(axis(axes::RIGHT_X));
    frame[offsets::TRIGGER] = symmetric_to_percentage(axis(axes::TRIGGER));

    for (i, byte) in frame[offsets::BUTTONS..offsets::BUTTONS + offsets::BUTTON_COUNT]
        .iter_mut()
        .enumerate()
    {
        *byte = u8::from(snapshot.button(i));
    }

    frame[offsets::DPAD] = 0;

    Ok(CommandFrame::Motor(frame))
}

/// Encode the standalone reset frame (single byte 251)
#[must_use]
pub fn encode_reset_frame() -> CommandFrame {
    CommandFrame::Reset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::snapshot::HatDirection;

    fn snapshot_with(axes: [f32; 5], buttons: [bool; 10]) -> ControllerSnapshot {
        ControllerSnapshot::new(axes.to_vec(), buttons.to_vec(), vec![HatDirection::Centered])
    }

    fn rest() -> ControllerSnapshot {
        snapshot_with([0.0; 5], [false; 10])
    }

    #[test]
    fn test_encode_rest_position() {
        let frame = encode_motor_frame(&rest()).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[250, 0, 50, 50, 50, 50, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_frame_structure() {
        let frame = encode_motor_frame(&rest()).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), MOTOR_FRAME_SIZE);
        assert_eq!(bytes[0], MOTOR_COMMAND_FLAG);
        assert_eq!(bytes[offsets::DPAD], 0);
    }

    #[test]
    fn test_stick_pulled_back_is_full_throttle() {
        let frame = encode_motor_frame(&snapshot_with([0.0, -1.0, 0.0, 0.0, 0.0], [false; 10])).unwrap();
        assert_eq!(frame.as_bytes()[offsets::THROTTLE], 100);
    }

    #[test]
    fn test_stick_pushed_forward_is_zero_throttle() {
        let frame = encode_motor_frame(&snapshot_with([0.0, 0.5, 0.0, 0.0, 0.0], [false; 10])).unwrap();
        assert_eq!(frame.as_bytes()[offsets::THROTTLE], 0);
    }

    #[test]
    fn test_axis_routing() {
        // left X, left Y, trigger, right X, right Y
        let frame = encode_motor_frame(&snapshot_with([1.0, 0.0, -1.0, 0.5, 1.0], [false; 10])).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes[offsets::STEER], 100);
        assert_eq!(bytes[offsets::TRIGGER], 0);
        assert_eq!(bytes[offsets::CAMERA_X], 75);
        // right Y is inverted
        assert_eq!(bytes[offsets::CAMERA_Y], 0);
    }

    #[test]
    fn test_buttons_fill_bytes_six_to_fifteen() {
        let mut buttons = [false; 10];
        buttons[0] = true; // A
        buttons[7] = true; // Start
        buttons[9] = true; // Right stick click

        let frame = encode_motor_frame(&snapshot_with([0.0; 5], buttons)).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(&bytes[6..16], &[1, 0, 0, 0, 0, 0, 0, 1, 0, 1]);
        assert_eq!(bytes[offsets::DPAD], 0);
    }

    #[test]
    fn test_extra_inputs_are_ignored() {
        let snapshot = ControllerSnapshot::new(
            vec![0.0; 6],
            vec![true; 11],
            vec![HatDirection::North, HatDirection::West],
        );
        let frame = encode_motor_frame(&snapshot).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), 17);
        assert!(bytes[6..16].iter().all(|&b| b == 1));
        assert_eq!(bytes[offsets::DPAD], 0, "hat state is not transmitted");
    }

    #[test]
    fn test_adversarial_axes_stay_in_range() {
        let nasty = [
            f32::NAN,
            f32::INFINITY,
            f32::NEG_INFINITY,
            -1e9,
            1e9,
            -1.0000001,
            f32::MIN_POSITIVE,
        ];
        for &a in &nasty {
            for &b in &nasty {
                let frame = encode_motor_frame(&snapshot_with([a, b, a, b, a], [true; 10])).unwrap();
                let bytes = frame.as_bytes();
                assert_eq!(bytes[0], 250);
                assert!(bytes[1..6].iter().all(|&v| v <= 100), "{:?} / {:?} -> {:?}", a, b, bytes);
                assert_eq!(bytes[16], 0);
            }
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let snapshot = snapshot_with([0.3, -0.7, 0.1, -0.2, 0.9], [true, false, true, false, true, false, true, false, true, false]);
        let first = encode_motor_frame(&snapshot).unwrap();
        for _ in 0..10 {
            assert_eq!(encode_motor_frame(&snapshot).unwrap(), first);
        }
    }

    #[test]
    fn test_too_few_axes_is_unsupported() {
        let snapshot = ControllerSnapshot::new(vec![0.0; 4], vec![false; 10], vec![]);
        match encode_motor_frame(&snapshot) {
            Err(MotorBridgeError::UnsupportedDevice { axes, required_axes, .. }) => {
                assert_eq!(axes, 4);
                assert_eq!(required_axes, MIN_AXES);
            }
            other => panic!("Expected UnsupportedDevice, got: {:?}", other),
        }
    }

    #[test]
    fn test_too_few_buttons_is_unsupported() {
        let snapshot = ControllerSnapshot::new(vec![0.0; 5], vec![false; 9], vec![]);
        assert!(matches!(
            encode_motor_frame(&snapshot),
            Err(MotorBridgeError::UnsupportedDevice { buttons: 9, .. })
        ));
    }

    #[test]
    fn test_check_capabilities_boundaries() {
        let exact = DeviceCapabilities { axes: 5, buttons: 10, hats: 0 };
        assert!(check_capabilities(&exact).is_ok());

        let short = DeviceCapabilities { axes: 5, buttons: 9, hats: 1 };
        assert!(check_capabilities(&short).is_err());
    }

    #[test]
    fn test_encode_reset_frame() {
        let frame = encode_reset_frame();
        assert_eq!(frame.as_bytes(), &[RESET_FLAG]);
        assert_eq!(frame.len(), RESET_FRAME_SIZE);
    }
}
