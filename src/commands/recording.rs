//! The capture run: enumerate, configure, record, report

use crate::capture::traits::CameraBackend;
use crate::recorder::builder::build_configurations;
use crate::recorder::state::{parse_file_prefix, RecordingOptions, RecordingSummary};
use crate::recorder::RecordingCoordinator;
use crate::reporter::Reporter;
use crate::utils::error::RecorderResult;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Record every recognized device for `options.record_for`.
///
/// Returns `None` when no connected device is recordable; in that case no
/// pipeline is started and nothing is written to disk.
pub async fn record<B: CameraBackend, W: Write>(
    backend: &B,
    options: &RecordingOptions,
    summary_path: Option<&Path>,
    reporter: &mut Reporter<W>,
) -> RecorderResult<Option<RecordingSummary>> {
    parse_file_prefix(&options.file_prefix)?;

    reporter.looking_for_devices()?;
    let devices = backend.query_devices()?;
    tracing::debug!("Found {} device(s)", devices.len());

    let configs = build_configurations(&devices, options, reporter)?;
    if configs.is_empty() {
        tracing::warn!(
            "None of the {} connected device(s) is a depth or tracking camera",
            devices.len()
        );
        reporter.nothing_to_record()?;
        return Ok(None);
    }

    fs::create_dir_all(&options.output_dir)?;

    let mut coordinator = RecordingCoordinator::new(backend, options.clone());
    let summary = coordinator.run(configs, reporter).await?;
    reporter.saved_files(&summary)?;

    if let Some(path) = summary_path {
        write_summary(&summary, path)?;
        reporter.summary_written(path)?;
    }

    Ok(Some(summary))
}

/// Write `summary` as pretty JSON, creating parent directories as needed
pub fn write_summary(summary: &RecordingSummary, path: &Path) -> RecorderResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(summary)?;
    fs::write(path, content)?;

    tracing::debug!("Saved recording summary to {:?}", path);
    Ok(())
}
