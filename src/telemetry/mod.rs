//! # Telemetry Module
//!
//! Handles frame logging to JSONL files with rotation.
//!
//! This module handles:
//! - Recording outbound command and reset frames
//! - Recording diagnostic bytes read back from the board
//! - Writing to rotating log files (max N records per file)
//! - Retaining only last M files

pub mod logger;

pub use logger::{FrameLogger, FrameRecord, RecordKind};
