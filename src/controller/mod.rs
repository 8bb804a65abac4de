//! # Controller Module
//!
//! Game controller input handling.
//!
//! This module handles:
//! - Controller detection and connection via evdev
//! - Normalizing axis, button and hat events into one layout
//! - Sampling the latest state once per tick

pub mod device;
pub mod sampler;
pub mod snapshot;
