//! Camera subsystem backends
//!
//! The recorder only talks to the traits in [`traits`]; each backend maps
//! them onto a concrete subsystem.

pub mod simulated;
pub mod traits;

#[cfg(feature = "realsense")]
pub mod realsense;

pub use simulated::SimulatedBackend;
pub use traits::{CameraBackend, CapturePipeline, DeviceClass, DeviceInfo, StreamSelection};

#[cfg(feature = "realsense")]
pub use realsense::RealsenseBackend;
