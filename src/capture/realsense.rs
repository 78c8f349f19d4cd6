//! Intel RealSense capture using realsense-rust
//!
//! Recording is done by librealsense itself: the pipeline config is pointed
//! at a destination file and the SDK's own threads write the `.bag` until
//! the pipeline is stopped.

use super::traits::{CameraBackend, CapturePipeline, DeviceInfo, StreamSelection};
use crate::recorder::state::DeviceConfiguration;
use crate::utils::error::SdkError;
use realsense_rust::{
    config::Config,
    context::Context,
    device::Device,
    kind::{Rs2CameraInfo, Rs2Format, Rs2StreamKind},
    pipeline::{ActivePipeline, InactivePipeline},
};
use std::collections::HashSet;
use std::ffi::CString;

/// Camera subsystem backed by a librealsense context
pub struct RealsenseBackend {
    context: Context,
}

impl RealsenseBackend {
    pub fn new() -> Result<Self, SdkError> {
        let context =
            Context::new().map_err(|e| SdkError::new("rs2_create_context", "", e.to_string()))?;
        Ok(Self { context })
    }
}

fn info(device: &Device, kind: Rs2CameraInfo) -> String {
    device
        .info(kind)
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl CameraBackend for RealsenseBackend {
    type Pipeline = RealsensePipeline;

    fn query_devices(&self) -> Result<Vec<DeviceInfo>, SdkError> {
        // An empty product line mask returns every connected device.
        let devices = self.context.query_devices(HashSet::new());
        Ok(devices
            .iter()
            .map(|device| DeviceInfo {
                name: info(device, Rs2CameraInfo::Name),
                serial_number: info(device, Rs2CameraInfo::SerialNumber),
                product_line: info(device, Rs2CameraInfo::ProductLine),
            })
            .collect())
    }

    fn create_pipeline(&self) -> Result<Self::Pipeline, SdkError> {
        let pipeline = InactivePipeline::try_from(&self.context)
            .map_err(|e| SdkError::new("rs2_create_pipeline", "context", e.to_string()))?;
        Ok(RealsensePipeline {
            state: PipelineState::Inactive(pipeline),
        })
    }
}

enum PipelineState {
    Inactive(InactivePipeline),
    Active(ActivePipeline),
    // Only seen while a transition is in flight or after a failed start.
    Consumed,
}

/// A librealsense pipeline recording one device
pub struct RealsensePipeline {
    state: PipelineState,
}

fn build_config(config: &DeviceConfiguration) -> Result<Config, SdkError> {
    let fail = |function: &str, args: String, e: &dyn std::fmt::Display| {
        SdkError::new(function, args, e.to_string())
    };
    let serial = config.serial_number();
    let path = config.output_path();

    let serial_c = CString::new(serial)
        .map_err(|e| fail("rs2_config_enable_device", serial.to_string(), &e))?;

    let mut rs_config = Config::new();
    rs_config
        .enable_record_to_file(path)
        .map_err(|e| fail("rs2_config_enable_record_to_file", path.display().to_string(), &e))?;
    rs_config
        .enable_device_from_serial(&serial_c)
        .map_err(|e| fail("rs2_config_enable_device", serial.to_string(), &e))?;

    if config.streams() == StreamSelection::PoseOnly {
        rs_config
            .enable_stream(Rs2StreamKind::Pose, None, 0, 0, Rs2Format::SixDof, 0)
            .map_err(|e| fail("rs2_config_enable_stream", "POSE, 6DOF".to_string(), &e))?;
    }

    Ok(rs_config)
}

impl CapturePipeline for RealsensePipeline {
    fn start(&mut self, config: &DeviceConfiguration) -> Result<(), SdkError> {
        let rs_config = build_config(config)?;

        let pipeline = match std::mem::replace(&mut self.state, PipelineState::Consumed) {
            PipelineState::Inactive(pipeline) => pipeline,
            other => {
                self.state = other;
                return Err(SdkError::new(
                    "rs2_pipeline_start_with_config",
                    config.serial_number(),
                    "pipeline is not idle",
                ));
            }
        };

        let active = pipeline.start(Some(rs_config)).map_err(|e| {
            SdkError::new(
                "rs2_pipeline_start_with_config",
                format!(
                    "serial:{}, file:{}",
                    config.serial_number(),
                    config.output_path().display()
                ),
                e.to_string(),
            )
        })?;

        tracing::info!(
            "Recording {} to {}",
            config.serial_number(),
            config.output_path().display()
        );
        self.state = PipelineState::Active(active);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SdkError> {
        match std::mem::replace(&mut self.state, PipelineState::Consumed) {
            PipelineState::Active(active) => {
                self.state = PipelineState::Inactive(active.stop());
                Ok(())
            }
            other => {
                self.state = other;
                Err(SdkError::new(
                    "rs2_pipeline_stop",
                    "pipe",
                    "pipeline is not started",
                ))
            }
        }
    }
}
