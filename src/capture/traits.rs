//! Capture trait definitions
//!
//! The contract the recorder needs from a camera subsystem: device
//! enumeration, and pipelines that record a configured device to a file.

use crate::recorder::state::DeviceConfiguration;
use crate::utils::error::SdkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product line string reported by depth cameras (D4xx family)
pub const PRODUCT_LINE_DEPTH: &str = "D400";

/// Product line string reported by tracking cameras (T2xx family)
pub const PRODUCT_LINE_TRACKING: &str = "T200";

/// Information about a connected camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Human-readable device name
    pub name: String,

    /// Serial number, unique per physical device
    pub serial_number: String,

    /// Product line as reported by the subsystem (e.g. "D400")
    pub product_line: String,
}

impl DeviceInfo {
    pub fn new(
        name: impl Into<String>,
        serial_number: impl Into<String>,
        product_line: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            serial_number: serial_number.into(),
            product_line: product_line.into(),
        }
    }

    /// Classification of this device, if it belongs to a known product line
    pub fn class(&self) -> Option<DeviceClass> {
        DeviceClass::classify(&self.product_line)
    }
}

/// Product-line classification of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Produces depth/color streams
    Depth,
    /// Produces a 6-DoF pose stream
    Tracking,
}

impl DeviceClass {
    /// Classify a product line string. Unknown lines yield `None`.
    pub fn classify(product_line: &str) -> Option<Self> {
        match product_line {
            PRODUCT_LINE_DEPTH => Some(DeviceClass::Depth),
            PRODUCT_LINE_TRACKING => Some(DeviceClass::Tracking),
            _ => None,
        }
    }

    /// Suffix appended to the common file path for this class
    pub fn role_suffix(&self) -> &'static str {
        match self {
            DeviceClass::Depth => "depth",
            DeviceClass::Tracking => "pose",
        }
    }

    /// Streams recorded for this class
    pub fn stream_selection(&self) -> StreamSelection {
        match self {
            DeviceClass::Depth => StreamSelection::Native,
            DeviceClass::Tracking => StreamSelection::PoseOnly,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Depth => write!(f, "depth"),
            DeviceClass::Tracking => write!(f, "tracking"),
        }
    }
}

/// Which streams a pipeline writes to its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamSelection {
    /// The device's default stream set
    Native,
    /// Only the 6-DoF pose stream
    PoseOnly,
}

/// A camera subsystem that can enumerate devices and create pipelines
pub trait CameraBackend {
    type Pipeline: CapturePipeline;

    /// Snapshot of the devices connected right now, in subsystem order
    fn query_devices(&self) -> Result<Vec<DeviceInfo>, SdkError>;

    /// Create an idle pipeline bound to this subsystem
    fn create_pipeline(&self) -> Result<Self::Pipeline, SdkError>;
}

/// A capture pipeline recording one device to one file
pub trait CapturePipeline {
    /// Claim the configured device and start writing to its destination file
    fn start(&mut self, config: &DeviceConfiguration) -> Result<(), SdkError>;

    /// Stop recording. Returns once the destination file is finalized.
    fn stop(&mut self) -> Result<(), SdkError>;
}
