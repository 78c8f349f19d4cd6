//! Device listing

use crate::capture::traits::{CameraBackend, DeviceInfo};
use crate::reporter::Reporter;
use crate::utils::error::RecorderResult;
use std::io::Write;

/// Print every connected device and how it would be recorded
pub fn list_devices<B: CameraBackend, W: Write>(
    backend: &B,
    reporter: &mut Reporter<W>,
) -> RecorderResult<Vec<DeviceInfo>> {
    reporter.looking_for_devices()?;
    let devices = backend.query_devices()?;
    reporter.device_list(&devices)?;
    Ok(devices)
}
