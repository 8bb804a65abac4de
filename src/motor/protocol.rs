//! # Motor Protocol Constants and Types
//!
//! Wire definitions for the motor-control link. Two frame types exist and the
//! receiver tells them apart by the first byte alone:
//!
//! | First byte | Frame | Total length |
//! |------------|-------|--------------|
//! | `0xFA` (250) | Motor command | 17 bytes |
//! | `0xFB` (251) | Reset | 1 byte |
//!
//! There is no checksum, no length prefix and no acknowledgement.

/// Opcode that introduces a motor command frame
pub const MOTOR_COMMAND_FLAG: u8 = 250;

/// Opcode of the standalone reset frame
pub const RESET_FLAG: u8 = 251;

/// Motor command payload size (everything after the flag byte)
pub const MOTOR_PAYLOAD_SIZE: usize = 16;

/// Motor command frame size (flag + payload)
pub const MOTOR_FRAME_SIZE: usize = 1 + MOTOR_PAYLOAD_SIZE;

/// Reset frame size
pub const RESET_FRAME_SIZE: usize = 1;

/// Percentage range carried by analog bytes
pub const PERCENT_MIN: u8 = 0;
pub const PERCENT_MAX: u8 = 100;
pub const PERCENT_CENTER: u8 = 50;

/// Byte offsets inside a motor command frame.
pub mod offsets {
    /// Flag / opcode (always 250)
    pub const FLAG: usize = 0;
    /// Left stick Y, forward-only throttle (0-100)
    pub const THROTTLE: usize = 1;
    /// Axis 0, left stick X (0-100)
    pub const STEER: usize = 2;
    /// Axis 4 inverted, right stick Y (0-100)
    pub const CAMERA_Y: usize = 3;
    /// Axis 3, right stick X (0-100)
    pub const CAMERA_X: usize = 4;
    /// Axis 2, trigger (0-100)
    pub const TRIGGER: usize = 5;
    /// First of the ten button bytes (A, B, X, Y, LB, RB, Back, Start, LStick, RStick)
    pub const BUTTONS: usize = 6;
    /// Number of button bytes
    pub const BUTTON_COUNT: usize = 10;
    /// Reserved D-pad byte (always 0)
    pub const DPAD: usize = BUTTONS + BUTTON_COUNT;
}

const RESET_BYTES: [u8; RESET_FRAME_SIZE] = [RESET_FLAG];

/// A frame ready to be written to the serial link.
///
/// Frames are built once per tick, sent, and dropped. They never carry an
/// out-of-range byte: every value is clamped while encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFrame {
    /// 17-byte motor command (flag + 16 payload bytes)
    Motor([u8; MOTOR_FRAME_SIZE]),
    /// 1-byte reset command
    Reset,
}

impl CommandFrame {
    /// Returns the bytes to put on the wire.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CommandFrame::Motor(bytes) => bytes,
            CommandFrame::Reset => &RESET_BYTES,
        }
    }

    /// Number of bytes on the wire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Frames are never empty; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Short label used in logs and the frame log.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CommandFrame::Motor(_) => "command",
            CommandFrame::Reset => "reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_sizes() {
        assert_eq!(MOTOR_FRAME_SIZE, 17);
        assert_eq!(RESET_FRAME_SIZE, 1);
        assert_eq!(offsets::DPAD, 16, "D-pad byte follows the ten button bytes");
    }

    #[test]
    fn test_reset_frame_bytes() {
        let frame = CommandFrame::Reset;
        assert_eq!(frame.as_bytes(), &[251]);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.kind(), "reset");
    }

    #[test]
    fn test_motor_frame_bytes() {
        let mut bytes = [0u8; MOTOR_FRAME_SIZE];
        bytes[offsets::FLAG] = MOTOR_COMMAND_FLAG;
        let frame = CommandFrame::Motor(bytes);

        assert_eq!(frame.len(), 17);
        assert_eq!(frame.as_bytes()[0], 0xFA);
        assert_eq!(frame.kind(), "command");
        assert!(!frame.is_empty());
    }
}
