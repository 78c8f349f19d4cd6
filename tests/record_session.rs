use rs_record_trajectory::capture::simulated::{PipelineEvent, SimulatedBackend};
use rs_record_trajectory::capture::traits::DeviceInfo;
use rs_record_trajectory::commands::recording::record;
use rs_record_trajectory::recorder::state::RecordingOptions;
use rs_record_trajectory::reporter::Reporter;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn options(dir: &Path) -> RecordingOptions {
    RecordingOptions {
        output_dir: dir.join("captures"),
        file_prefix: "session".to_string(),
        record_for: Duration::from_secs(1),
    }
}

#[tokio::test(start_paused = true)]
async fn no_recordable_devices_creates_nothing() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new(vec![DeviceInfo::new("Intel RealSense L515", "333", "L500")]);
    let options = options(dir.path());
    let summary_path = dir.path().join("summary.json");
    let mut reporter = Reporter::new(Vec::new());

    let summary = record(&backend, &options, Some(&summary_path), &mut reporter)
        .await
        .unwrap();

    assert!(summary.is_none());
    assert!(backend.events().is_empty());
    assert!(!options.output_dir.exists());
    assert!(!summary_path.exists());
}

#[tokio::test(start_paused = true)]
async fn depth_and_tracking_record_to_distinct_files() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::new(vec![
        DeviceInfo::new("Dx", "111", "D400"),
        DeviceInfo::new("Lx", "333", "L500"),
        DeviceInfo::new("Tx", "222", "T200"),
    ]);
    let options = options(dir.path());
    let summary_path = dir.path().join("meta").join("summary.json");
    let mut reporter = Reporter::new(Vec::new());

    let summary = record(&backend, &options, Some(&summary_path), &mut reporter)
        .await
        .unwrap()
        .expect("devices were recorded");

    let depth = options.output_dir.join("session-depth.bag");
    let pose = options.output_dir.join("session-pose.bag");
    assert_eq!(summary.output_files(), vec![depth.as_path(), pose.as_path()]);
    assert!(depth.exists());
    assert!(pose.exists());

    let starts = backend
        .events()
        .into_iter()
        .filter(|e| matches!(e, PipelineEvent::Started { .. }))
        .count();
    assert_eq!(starts, 2);
    assert!(backend.claimed_serials().is_empty());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(written["devices"][1]["class"], "tracking");
    assert_eq!(written["devices"][1]["serialNumber"], "222");
    assert!(written["durationMs"].as_f64().unwrap() >= 1000.0);

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(out.starts_with("Looking for devices...\nEnabling: Dx 111... done.\nEnabling: Tx 222... done.\n"));
    assert!(out.contains("Stopping pipelines... done.\n"));
    assert!(out.contains(&format!("Saved files to: {}", options.output_pattern())));
}

#[tokio::test(start_paused = true)]
async fn enumeration_failure_is_fatal() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::demo();
    backend.fail_enumeration("failed to set power state");
    let mut reporter = Reporter::new(Vec::new());

    let err = record(&backend, &options(dir.path()), None, &mut reporter)
        .await
        .unwrap_err();

    assert_eq!(err.as_sdk().unwrap().function, "rs2_query_devices");
    assert!(backend.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn absolute_file_prefix_is_rejected_before_recording() {
    let dir = tempdir().unwrap();
    let backend = SimulatedBackend::demo();
    let mut options = options(dir.path());
    options.file_prefix = dir.path().join("elsewhere").display().to_string();
    let mut reporter = Reporter::new(Vec::new());

    let err = record(&backend, &options, None, &mut reporter)
        .await
        .unwrap_err();

    assert!(err.as_sdk().is_none());
    assert!(backend.events().is_empty());
    assert!(!options.output_dir.exists());
    assert!(!dir.path().join("elsewhere-depth.bag").exists());
}
