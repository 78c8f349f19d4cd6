//! In-process camera subsystem
//!
//! Behaves like the real subsystem from the recorder's point of view:
//! devices are claimed exclusively, destination files are created on start
//! and finalized on stop. Faults can be injected per call.

use super::traits::{CameraBackend, CapturePipeline, DeviceInfo, StreamSelection};
use crate::recorder::state::DeviceConfiguration;
use crate::utils::error::SdkError;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;

/// Something a simulated pipeline did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Started {
        serial: String,
        path: PathBuf,
        streams: StreamSelection,
        at: Instant,
    },
    Stopped {
        serial: String,
        at: Instant,
    },
}

impl PipelineEvent {
    pub fn serial(&self) -> &str {
        match self {
            PipelineEvent::Started { serial, .. } | PipelineEvent::Stopped { serial, .. } => serial,
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    enumeration: Option<String>,
    start: HashSet<String>,
    stop: HashSet<String>,
}

#[derive(Debug, Default)]
struct Shared {
    faults: Faults,
    claimed: HashSet<String>,
    events: Vec<PipelineEvent>,
}

/// Fake camera subsystem backed by a fixed device list
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    devices: Vec<DeviceInfo>,
    shared: Arc<Mutex<Shared>>,
}

impl SimulatedBackend {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// One depth and one tracking camera
    pub fn demo() -> Self {
        Self::new(vec![
            DeviceInfo::new("Intel RealSense D435", "000000000001", "D400"),
            DeviceInfo::new("Intel RealSense T265", "000000000002", "T200"),
        ])
    }

    /// Make device enumeration fail with `message`
    pub fn fail_enumeration(&self, message: impl Into<String>) {
        self.shared.lock().faults.enumeration = Some(message.into());
    }

    /// Make starting a pipeline on `serial` fail
    pub fn fail_start(&self, serial: impl Into<String>) {
        self.shared.lock().faults.start.insert(serial.into());
    }

    /// Make stopping the pipeline on `serial` fail
    pub fn fail_stop(&self, serial: impl Into<String>) {
        self.shared.lock().faults.stop.insert(serial.into());
    }

    /// Every start/stop so far, in order
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.shared.lock().events.clone()
    }

    /// Serials of devices currently held by a running pipeline
    pub fn claimed_serials(&self) -> Vec<String> {
        let mut serials: Vec<String> = self.shared.lock().claimed.iter().cloned().collect();
        serials.sort();
        serials
    }
}

impl CameraBackend for SimulatedBackend {
    type Pipeline = SimulatedPipeline;

    fn query_devices(&self) -> Result<Vec<DeviceInfo>, SdkError> {
        if let Some(message) = &self.shared.lock().faults.enumeration {
            return Err(SdkError::new("rs2_query_devices", "context", message.clone()));
        }
        Ok(self.devices.clone())
    }

    fn create_pipeline(&self) -> Result<Self::Pipeline, SdkError> {
        Ok(SimulatedPipeline {
            devices: self.devices.clone(),
            shared: Arc::clone(&self.shared),
            running: None,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileHeader<'a> {
    device: &'a DeviceInfo,
    streams: StreamSelection,
    started_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileFooter {
    stopped_at: String,
}

struct Running {
    serial: String,
    file: File,
}

/// Pipeline of the simulated subsystem
pub struct SimulatedPipeline {
    devices: Vec<DeviceInfo>,
    shared: Arc<Mutex<Shared>>,
    running: Option<Running>,
}

impl SimulatedPipeline {
    fn start_args(config: &DeviceConfiguration) -> String {
        format!(
            "serial:{}, file:{}",
            config.serial_number(),
            config.output_path().display()
        )
    }
}

impl CapturePipeline for SimulatedPipeline {
    fn start(&mut self, config: &DeviceConfiguration) -> Result<(), SdkError> {
        let fail = |message: String| {
            SdkError::new("rs2_pipeline_start_with_config", Self::start_args(config), message)
        };

        if self.running.is_some() {
            return Err(fail("pipeline is already started".to_string()));
        }

        let serial = config.serial_number().to_string();
        let device = self
            .devices
            .iter()
            .find(|d| d.serial_number == serial)
            .ok_or_else(|| fail(format!("No device connected with serial {serial}")))?;

        let mut shared = self.shared.lock();
        if shared.faults.start.contains(&serial) {
            return Err(fail("Device or resource busy".to_string()));
        }
        if shared.claimed.contains(&serial) {
            return Err(fail(format!("Device {serial} is already in use")));
        }

        let mut file = File::create(config.output_path()).map_err(|e| fail(e.to_string()))?;
        let header = FileHeader {
            device,
            streams: config.streams(),
            started_at: Utc::now().to_rfc3339(),
        };
        serde_json::to_writer(&mut file, &header).map_err(|e| fail(e.to_string()))?;
        writeln!(file).map_err(|e| fail(e.to_string()))?;

        shared.claimed.insert(serial.clone());
        shared.events.push(PipelineEvent::Started {
            serial: serial.clone(),
            path: config.output_path().to_path_buf(),
            streams: config.streams(),
            at: Instant::now(),
        });
        drop(shared);

        self.running = Some(Running { serial, file });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SdkError> {
        let Some(mut running) = self.running.take() else {
            return Err(SdkError::new(
                "rs2_pipeline_stop",
                "pipe",
                "stop() cannot be called before start()",
            ));
        };
        let fail = |message: String| SdkError::new("rs2_pipeline_stop", "pipe", message);

        let mut shared = self.shared.lock();
        // The device is released even when finalizing fails.
        shared.claimed.remove(&running.serial);
        if shared.faults.stop.contains(&running.serial) {
            return Err(fail("Failed to finalize recording".to_string()));
        }

        let footer = FileFooter {
            stopped_at: Utc::now().to_rfc3339(),
        };
        serde_json::to_writer(&mut running.file, &footer).map_err(|e| fail(e.to_string()))?;
        writeln!(running.file).map_err(|e| fail(e.to_string()))?;
        running.file.sync_all().map_err(|e| fail(e.to_string()))?;

        shared.events.push(PipelineEvent::Stopped {
            serial: running.serial,
            at: Instant::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::traits::DeviceClass;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, device: &DeviceInfo) -> DeviceConfiguration {
        let class = device.class().unwrap();
        DeviceConfiguration::new(
            device.clone(),
            class,
            dir.join(format!("x-{}.bag", class.role_suffix())),
        )
    }

    #[test]
    fn test_start_and_stop_write_file() {
        let dir = tempdir().unwrap();
        let backend = SimulatedBackend::demo();
        let devices = backend.query_devices().unwrap();
        let config = config(dir.path(), &devices[0]);

        let mut pipeline = backend.create_pipeline().unwrap();
        pipeline.start(&config).unwrap();
        assert_eq!(backend.claimed_serials(), vec!["000000000001".to_string()]);
        pipeline.stop().unwrap();
        assert!(backend.claimed_serials().is_empty());

        let content = std::fs::read_to_string(config.output_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(header["device"]["serialNumber"], "000000000001");
        assert_eq!(header["streams"], "native");
        assert!(lines[1].contains("stoppedAt"));
    }

    #[test]
    fn test_device_cannot_be_claimed_twice() {
        let dir = tempdir().unwrap();
        let backend = SimulatedBackend::new(vec![DeviceInfo::new("Dx", "111", "D400")]);
        let config = config(dir.path(), &backend.query_devices().unwrap()[0]);

        let mut first = backend.create_pipeline().unwrap();
        let mut second = backend.create_pipeline().unwrap();
        first.start(&config).unwrap();
        let err = second.start(&config).unwrap_err();
        assert_eq!(err.function, "rs2_pipeline_start_with_config");
        assert!(err.message.contains("already in use"));
    }

    #[test]
    fn test_injected_faults() {
        let backend = SimulatedBackend::new(vec![DeviceInfo::new("Tx", "222", "T200")]);
        backend.fail_enumeration("No RealSense context");
        let err = backend.query_devices().unwrap_err();
        assert_eq!(err.function, "rs2_query_devices");

        let dir = tempdir().unwrap();
        let device = DeviceInfo::new("Tx", "222", "T200");
        let config = DeviceConfiguration::new(
            device,
            DeviceClass::Tracking,
            dir.path().join("x-pose.bag"),
        );
        backend.fail_start("222");
        let mut pipeline = backend.create_pipeline().unwrap();
        assert!(pipeline.start(&config).is_err());
        assert!(!config.output_path().exists());
    }

    #[test]
    fn test_stop_before_start_fails() {
        let backend = SimulatedBackend::demo();
        let mut pipeline = backend.create_pipeline().unwrap();
        let err = pipeline.stop().unwrap_err();
        assert_eq!(err.function, "rs2_pipeline_stop");
    }
}
