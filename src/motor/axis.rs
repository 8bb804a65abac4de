//! # Axis Mapping
//!
//! Converts normalized controller axes (-1.0 to 1.0) into the percentage bytes
//! the motor board understands.
//!
//! ## Conversions
//!
//! | Function | Rest position | Full negative | Full positive |
//! |----------|---------------|---------------|---------------|
//! | [`symmetric_to_percentage`] | 50 | 0 | 100 |
//! | [`half_range_clamp`] | 0 | 100 | 0 |
//!
//! [`half_range_clamp`] is the throttle mapping: only "pulled back" deflection
//! (negative raw values) produces output, everything else reads 0. The motor
//! board treats this byte as a one-directional throttle.
//!
//! Both functions clamp their output into 0-100 even when fed out-of-range or
//! NaN input, so a glitching axis can never produce an invalid frame byte.
//!
//! ## Usage
//!
//! ```
//! use motor_bridge::motor::axis::{half_range_clamp, symmetric_to_percentage};
//!
//! assert_eq!(symmetric_to_percentage(0.0), 50);
//! assert_eq!(half_range_clamp(-1.0), 100);
//! assert_eq!(half_range_clamp(0.5), 0);
//! ```

use super::protocol::{PERCENT_CENTER, PERCENT_MAX, PERCENT_MIN};

/// Maps a symmetric axis to 0-100 with rest at 50.
///
/// Computes `round((v + 1.0) * 50.0)` after clamping `v` into -1.0..=1.0.
/// NaN reads as the rest position.
///
/// # Examples
///
/// ```
/// use motor_bridge::motor::axis::symmetric_to_percentage;
///
/// assert_eq!(symmetric_to_percentage(-1.0), 0);
/// assert_eq!(symmetric_to_percentage(1.0), 100);
/// assert_eq!(symmetric_to_percentage(7.5), 100);
/// ```
#[must_use]
pub fn symmetric_to_percentage(value: f32) -> u8 {
    if value.is_nan() {
        return PERCENT_CENTER;
    }

    let v = value.clamp(-1.0, 1.0);
    let scaled = ((2.0 - (1.0 - v)) * 100.0 / 2.0).round();

    clamp_percentage(scaled)
}

/// Maps the primary stick to a forward-only throttle in 0-100.
///
/// The raw value is negated first so that pulling the stick back reads
/// positive. Zero or negative results map to 0; positive results scale to
/// `round(result * 100)`, capped at 100.
///
/// # Examples
///
/// ```
/// use motor_bridge::motor::axis::half_range_clamp;
///
/// assert_eq!(half_range_clamp(-0.5), 50);
/// assert_eq!(half_range_clamp(0.0), 0);
/// assert_eq!(half_range_clamp(f32::NAN), 0);
/// ```
#[must_use]
pub fn half_range_clamp(value: f32) -> u8 {
    let pulled = -value;

    if pulled.is_nan() || pulled <= 0.0 {
        return PERCENT_MIN;
    }

    clamp_percentage((pulled * 100.0).round())
}

#[inline]
fn clamp_percentage(value: f32) -> u8 {
    value.clamp(f32::from(PERCENT_MIN), f32::from(PERCENT_MAX)) as u8
}
