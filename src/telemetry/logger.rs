//! # Frame Logger
//!
//! Appends every frame sent to (and every byte read back from) the motor
//! board to rotating JSON Lines files.
//!
//! ```text
//! {"timestamp":"2026-10-16T09:12:03.120Z","kind":"command","bytes":[250,0,50,50,50,50,0,0,0,0,0,0,0,0,0,0,0]}
//! {"timestamp":"2026-10-16T09:12:03.140Z","kind":"reset","bytes":[251]}
//! ```
//!
//! A new file is started after `max_records_per_file` records; only the
//! newest `max_files_to_keep` files are retained.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TelemetryConfig;
use crate::error::Result;

const FILE_PREFIX: &str = "frames_";
const FILE_EXTENSION: &str = "jsonl";

/// What a logged record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Motor command frame sent
    Command,
    /// Reset frame sent
    Reset,
    /// Bytes received from the board
    Readback,
}

/// One line of the frame log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub kind: RecordKind,
    pub bytes: &'a [u8],
}

impl<'a> FrameRecord<'a> {
    pub fn now(kind: RecordKind, bytes: &'a [u8]) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            bytes,
        }
    }
}

/// Rotating JSONL writer.
#[derive(Debug)]
pub struct FrameLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files_opened: u64,
}

impl FrameLogger {
    /// Creates the log directory if needed. No file is opened until the
    /// first record.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir)?;
        info!("Frame log enabled in {}", config.log_dir);

        Ok(Self {
            log_dir: PathBuf::from(&config.log_dir),
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files_opened: 0,
        })
    }

    /// Appends one record, rotating first if the current file is full.
    pub fn record(&mut self, record: &FrameRecord<'_>) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S%.3f"),
            self.files_opened,
            FILE_EXTENSION
        );
        let path = self.log_dir.join(name);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened frame log {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files_opened += 1;

        self.prune()
    }

    /// Deletes the oldest log files beyond the retention limit.
    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Removing old frame log {}", path.display());
            fs::remove_file(path)?;
        }

        Ok(())
    }
}

impl Drop for FrameLogger {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .map_or(false, |name| {
                name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
            });
        if is_log {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, per_file: usize, keep: usize) -> TelemetryConfig {
        TelemetryConfig {
            enabled: true,
            log_dir: dir.path().to_string_lossy().to_string(),
            max_records_per_file: per_file,
            max_files_to_keep: keep,
        }
    }

    fn read_lines(dir: &Path) -> Vec<String> {
        let mut files = log_files(dir).unwrap();
        files.sort();
        files
            .iter()
            .flat_map(|f| {
                fs::read_to_string(f)
                    .unwrap()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_no_file_until_first_record() {
        let dir = TempDir::new().unwrap();
        let _logger = FrameLogger::new(&config(&dir, 10, 10)).unwrap();
        assert!(log_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir, 10, 10);
        cfg.log_dir = dir.path().join("nested/logs").to_string_lossy().to_string();

        let logger = FrameLogger::new(&cfg).unwrap();
        assert!(logger.log_dir().is_dir());
    }

    #[test]
    fn test_records_are_json_lines() {
        let dir = TempDir::new().unwrap();
        let mut logger = FrameLogger::new(&config(&dir, 10, 10)).unwrap();

        logger.record(&FrameRecord::now(RecordKind::Reset, &[251])).unwrap();
        logger
            .record(&FrameRecord::now(RecordKind::Readback, b"ok"))
            .unwrap();
        logger.flush().unwrap();

        let lines = read_lines(dir.path());
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["kind"], "reset");
        assert_eq!(first["bytes"], serde_json::json!([251]));
        assert!(first["timestamp"].is_string());

        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second["kind"], "readback");
        assert_eq!(second["bytes"], serde_json::json!([111, 107]));
    }

    #[test]
    fn test_rotates_after_max_records() {
        let dir = TempDir::new().unwrap();
        let mut logger = FrameLogger::new(&config(&dir, 2, 10)).unwrap();

        for _ in 0..5 {
            logger.record(&FrameRecord::now(RecordKind::Command, &[250])).unwrap();
        }
        logger.flush().unwrap();

        assert_eq!(log_files(dir.path()).unwrap().len(), 3);
        assert_eq!(read_lines(dir.path()).len(), 5);
    }

    #[test]
    fn test_keeps_only_newest_files() {
        let dir = TempDir::new().unwrap();
        let mut logger = FrameLogger::new(&config(&dir, 1, 2)).unwrap();

        for i in 0..5u8 {
            logger.record(&FrameRecord::now(RecordKind::Command, &[i])).unwrap();
        }
        logger.flush().unwrap();

        assert_eq!(log_files(dir.path()).unwrap().len(), 2);

        // Oldest records were pruned with their files
        let lines = read_lines(dir.path());
        assert!(lines[0].contains("[3]"));
        assert!(lines[1].contains("[4]"));
    }

    #[test]
    fn test_ignores_foreign_files_when_pruning() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        let mut logger = FrameLogger::new(&config(&dir, 1, 1)).unwrap();

        for _ in 0..3 {
            logger.record(&FrameRecord::now(RecordKind::Command, &[250])).unwrap();
        }

        assert!(dir.path().join("notes.txt").exists());
    }
}
