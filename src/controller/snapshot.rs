//! # Controller Snapshot
//!
//! Immutable capture of controller state at one poll tick.

use std::fmt;

/// Discrete direction of a hat switch (D-pad).
///
/// Codes run clockwise starting at north-west, with 0 meaning released:
///
/// ```text
///   1 2 3
///   8 0 4
///   7 6 5
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HatDirection {
    #[default]
    Centered = 0,
    NorthWest = 1,
    North = 2,
    NorthEast = 3,
    East = 4,
    SouthEast = 5,
    South = 6,
    SouthWest = 7,
    West = 8,
}

impl HatDirection {
    /// Builds a direction from the two hat axes.
    ///
    /// `x`: -1 = left, 1 = right. `y`: -1 = up, 1 = down (evdev convention).
    /// Any other magnitude is treated by sign only.
    ///
    /// # Examples
    ///
    /// ```
    /// use motor_bridge::controller::snapshot::HatDirection;
    ///
    /// assert_eq!(HatDirection::from_axes(0, -1), HatDirection::North);
    /// assert_eq!(HatDirection::from_axes(1, 1), HatDirection::SouthEast);
    /// assert_eq!(HatDirection::from_axes(0, 0).code(), 0);
    /// ```
    #[must_use]
    pub fn from_axes(x: i32, y: i32) -> Self {
        match (x.signum(), y.signum()) {
            (0, 0) => HatDirection::Centered,
            (-1, -1) => HatDirection::NorthWest,
            (0, -1) => HatDirection::North,
            (1, -1) => HatDirection::NorthEast,
            (1, 0) => HatDirection::East,
            (1, 1) => HatDirection::SouthEast,
            (0, 1) => HatDirection::South,
            (-1, 1) => HatDirection::SouthWest,
            _ => HatDirection::West,
        }
    }

    /// Numeric direction code (0-8).
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HatDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Number of inputs of each kind a device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    pub axes: usize,
    pub buttons: usize,
    pub hats: usize,
}

/// Controller state at one instant.
///
/// Axis values are normalized to -1.0..=1.0 (not enforced here; the motor
/// encoder clamps), buttons are pressed/released, hats are discrete
/// directions. A snapshot is never mutated after construction.
///
/// # Examples
///
/// ```
/// use motor_bridge::controller::snapshot::{ControllerSnapshot, HatDirection};
///
/// let snapshot = ControllerSnapshot::new(
///     vec![0.0; 5],
///     vec![false; 10],
///     vec![HatDirection::Centered],
/// );
/// assert_eq!(snapshot.capabilities().axes, 5);
/// assert_eq!(snapshot.axis(7), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControllerSnapshot {
    axes: Vec<f32>,
    buttons: Vec<bool>,
    hats: Vec<HatDirection>,
}

impl ControllerSnapshot {
    #[must_use]
    pub fn new(axes: Vec<f32>, buttons: Vec<bool>, hats: Vec<HatDirection>) -> Self {
        Self {
            axes,
            buttons,
            hats,
        }
    }

    #[must_use]
    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    #[must_use]
    pub fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    #[must_use]
    pub fn hats(&self) -> &[HatDirection] {
        &self.hats
    }

    /// Axis value by index, if the device has that axis.
    #[must_use]
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    /// Button state by index; missing buttons read as released.
    #[must_use]
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Input counts carried by this snapshot.
    #[must_use]
    pub fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            axes: self.axes.len(),
            buttons: self.buttons.len(),
            hats: self.hats.len(),
        }
    }
}
