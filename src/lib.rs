//! # Motor Bridge Library
//!
//! Drive a microcontroller motor board from a game controller over a serial link.
//!
//! Every poll period the controller state is sampled, packed into a 17-byte
//! motor command frame and written to the board at 38,400 baud. A one-byte
//! reset frame can be sent at any time to stop the motors.

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod motor;
pub mod poll_loop;
pub mod serial;
pub mod telemetry;
