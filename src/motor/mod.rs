//! # Motor Protocol Module
//!
//! The byte protocol spoken to the motor microcontroller.
//!
//! This module handles:
//! - Wire constants and the two frame types (motor command, reset)
//! - Mapping normalized axes to percentage bytes
//! - Encoding controller snapshots into command frames

pub mod axis;
pub mod encoder;
pub mod protocol;
