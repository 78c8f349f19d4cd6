//! Recording state management
//!
//! Defines the recording options, per-device configurations, the
//! coordinator state machine and the summary of a finished run.

use crate::capture::traits::{DeviceClass, DeviceInfo, StreamSelection};
use crate::utils::error::RecorderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extension of the container files written by the camera subsystem
pub const CONTAINER_EXTENSION: &str = "bag";

pub const DEFAULT_OUTPUT_DIR: &str = "/tmp";
pub const DEFAULT_FILE_PREFIX: &str = "000";
pub const DEFAULT_RECORD_FOR_S: u64 = 5;

/// Longest recording window accepted from the command line (one day)
pub const MAX_RECORD_FOR_S: u64 = 24 * 60 * 60;

/// Check that `prefix` names a file inside the output directory.
///
/// Path separators and absolute paths are rejected: joined onto the output
/// directory they would place files somewhere else.
pub fn parse_file_prefix(prefix: &str) -> Result<String, RecorderError> {
    if prefix.is_empty() {
        return Err(RecorderError::Recording(
            "file prefix must not be empty".to_string(),
        ));
    }
    if prefix.chars().any(std::path::is_separator) || Path::new(prefix).is_absolute() {
        return Err(RecorderError::Recording(format!(
            "file prefix {prefix:?} must be a plain file name, not a path"
        )));
    }
    Ok(prefix.to_string())
}

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Pipelines are running
    Recording,
    /// All pipelines were stopped
    Complete,
}

/// Options for a recording run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOptions {
    /// Directory the container files are written to
    pub output_dir: PathBuf,

    /// Base name shared by every file of this run
    pub file_prefix: String,

    /// Length of the recording window
    pub record_for: Duration,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            record_for: Duration::from_secs(DEFAULT_RECORD_FOR_S),
        }
    }
}

impl RecordingOptions {
    /// `<output_dir>/<file_prefix>`, the stem every output file starts with
    pub fn common_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_prefix)
    }

    /// Destination for a device of `class`, optionally disambiguated by serial
    pub fn output_path(&self, class: DeviceClass, serial: Option<&str>) -> PathBuf {
        let mut name = format!("{}-{}", self.file_prefix, class.role_suffix());
        if let Some(serial) = serial {
            name.push('-');
            name.push_str(serial);
        }
        name.push('.');
        name.push_str(CONTAINER_EXTENSION);
        self.output_dir.join(name)
    }

    /// Glob-style pattern matching every file of this run
    pub fn output_pattern(&self) -> String {
        format!(
            "{}-*.{}",
            self.common_path().display(),
            CONTAINER_EXTENSION
        )
    }
}

/// Recording configuration for a single device
///
/// Built once per recognized device and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfiguration {
    device: DeviceInfo,
    class: DeviceClass,
    output_path: PathBuf,
    streams: StreamSelection,
}

impl DeviceConfiguration {
    pub fn new(device: DeviceInfo, class: DeviceClass, output_path: PathBuf) -> Self {
        Self {
            device,
            class,
            output_path,
            streams: class.stream_selection(),
        }
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn serial_number(&self) -> &str {
        &self.device.serial_number
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn streams(&self) -> StreamSelection {
        self.streams
    }
}

/// A device that was recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedDevice {
    pub name: String,
    pub serial_number: String,
    pub class: DeviceClass,
    pub output_path: PathBuf,
}

impl From<&DeviceConfiguration> for RecordedDevice {
    fn from(config: &DeviceConfiguration) -> Self {
        Self {
            name: config.device().name.clone(),
            serial_number: config.serial_number().to_string(),
            class: config.class(),
            output_path: config.output_path().to_path_buf(),
        }
    }
}

/// Result of a completed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    /// Pattern matching every output file
    pub output_pattern: String,

    /// Recorded devices, in start order
    pub devices: Vec<RecordedDevice>,

    /// Wall-clock time the first pipeline was started
    pub started_at: DateTime<Utc>,

    /// Wall-clock time the last pipeline was stopped
    pub stopped_at: DateTime<Utc>,

    /// Time between the first start and the last stop in milliseconds
    pub duration_ms: f64,
}

impl RecordingSummary {
    /// Output files created, in start order
    pub fn output_files(&self) -> Vec<&Path> {
        self.devices.iter().map(|d| d.output_path.as_path()).collect()
    }
}
