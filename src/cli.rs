use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::recorder::state::{
    parse_file_prefix, RecordingOptions, DEFAULT_FILE_PREFIX, DEFAULT_OUTPUT_DIR,
    DEFAULT_RECORD_FOR_S, MAX_RECORD_FOR_S,
};

/// Command line configuration for a capture run.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rs-record-trajectory",
    version,
    about = "Record data from Realsense cameras for a fixed period of time."
)]
pub struct Args {
    /// Directory to store the data.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
    /// File prefix to name the file.
    #[arg(long, default_value = DEFAULT_FILE_PREFIX, value_parser = parse_file_prefix)]
    pub file_prefix: String,
    /// Number of seconds to record for.
    #[arg(
        long,
        default_value_t = DEFAULT_RECORD_FOR_S,
        value_parser = clap::value_parser!(u64).range(..=MAX_RECORD_FOR_S)
    )]
    pub record_for_s: u64,
    /// Camera subsystem to record from.
    #[arg(long, value_enum, default_value_t = BackendKind::Realsense)]
    pub backend: BackendKind,
    /// Only list connected devices and how they would be recorded.
    #[arg(long, default_value_t = false)]
    pub list_devices: bool,
    /// Write a JSON summary of the recording to this path.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Intel RealSense cameras through librealsense.
    Realsense,
    /// Built-in fake with one depth and one tracking camera.
    Simulated,
}

impl Args {
    pub fn recording_options(&self) -> RecordingOptions {
        RecordingOptions {
            output_dir: self.output_dir.clone(),
            file_prefix: self.file_prefix.clone(),
            record_for: Duration::from_secs(self.record_for_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rs-record-trajectory"]).unwrap();
        assert_eq!(args.backend, BackendKind::Realsense);
        assert!(!args.list_devices);
        assert!(args.summary.is_none());
        assert_eq!(args.recording_options(), RecordingOptions::default());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "rs-record-trajectory",
            "--output-dir",
            "/data/session",
            "--file-prefix",
            "walk-01",
            "--record-for-s",
            "30",
            "--backend",
            "simulated",
        ])
        .unwrap();
        let options = args.recording_options();
        assert_eq!(options.output_dir, PathBuf::from("/data/session"));
        assert_eq!(options.file_prefix, "walk-01");
        assert_eq!(options.record_for, Duration::from_secs(30));
        assert_eq!(args.backend, BackendKind::Simulated);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["rs-record-trajectory", "--record-for-s", "-1"]).is_err());
        assert!(Args::try_parse_from(["rs-record-trajectory", "--file-prefix", ""]).is_err());
        assert!(Args::try_parse_from(["rs-record-trajectory", "--file-prefix", "/x"]).is_err());
        assert!(Args::try_parse_from(["rs-record-trajectory", "--file-prefix", "a/b"]).is_err());
        assert!(Args::try_parse_from([
            "rs-record-trajectory",
            "--record-for-s",
            "18446744073709551615",
        ])
        .is_err());
    }

    #[test]
    fn test_longest_window_is_accepted() {
        let args = Args::try_parse_from(["rs-record-trajectory", "--record-for-s", "86400"]).unwrap();
        assert_eq!(args.recording_options().record_for, Duration::from_secs(MAX_RECORD_FOR_S));
    }
}
