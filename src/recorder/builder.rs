//! Per-device configuration
//!
//! Classifies each enumerated device and decides where and what it records.

use super::state::{DeviceConfiguration, RecordingOptions};
use crate::capture::traits::{DeviceClass, DeviceInfo};
use crate::reporter::Reporter;
use std::collections::HashSet;
use std::io::{self, Write};

/// Build one configuration per recordable device, in enumeration order.
///
/// Devices of an unknown product line are skipped with a warning. A serial
/// seen twice is only configured once. The first device of each class gets
/// `<prefix>-<role>.bag`; later devices of the same class get their serial
/// appended so no two configurations share a file.
pub fn build_configurations<W: Write>(
    devices: &[DeviceInfo],
    options: &RecordingOptions,
    reporter: &mut Reporter<W>,
) -> io::Result<Vec<DeviceConfiguration>> {
    let mut configurations = Vec::new();
    let mut claimed_serials = HashSet::new();
    let mut used_classes = HashSet::new();

    for device in devices {
        let Some(class) = device.class() else {
            tracing::warn!(
                "Skipping {} {}: unsupported product line {:?}",
                device.name,
                device.serial_number,
                device.product_line
            );
            continue;
        };

        if !claimed_serials.insert(device.serial_number.clone()) {
            tracing::warn!(
                "Skipping {} {}: device was enumerated twice",
                device.name,
                device.serial_number
            );
            continue;
        }

        let disambiguator = if used_classes.insert(class) {
            None
        } else {
            Some(device.serial_number.as_str())
        };

        reporter.enabling(device)?;
        let config = configure_device(device, class, options, disambiguator);
        reporter.done()?;

        tracing::debug!(
            "Configured {} {} -> {}",
            device.name,
            device.serial_number,
            config.output_path().display()
        );
        configurations.push(config);
    }

    Ok(configurations)
}

fn configure_device(
    device: &DeviceInfo,
    class: DeviceClass,
    options: &RecordingOptions,
    disambiguator: Option<&str>,
) -> DeviceConfiguration {
    let path = options.output_path(class, disambiguator);
    DeviceConfiguration::new(device.clone(), class, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::traits::StreamSelection;
    use std::path::PathBuf;

    fn options() -> RecordingOptions {
        RecordingOptions {
            output_dir: PathBuf::from("/data"),
            file_prefix: "run".to_string(),
            ..Default::default()
        }
    }

    fn build(devices: &[DeviceInfo]) -> (Vec<DeviceConfiguration>, String) {
        let mut reporter = Reporter::new(Vec::new());
        let configs = build_configurations(devices, &options(), &mut reporter).unwrap();
        (configs, String::from_utf8(reporter.into_inner()).unwrap())
    }

    #[test]
    fn test_depth_device() {
        let (configs, out) = build(&[DeviceInfo::new("Dx", "111", "D400")]);
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].output_path(), PathBuf::from("/data/run-depth.bag"));
        assert_eq!(configs[0].streams(), StreamSelection::Native);
        assert_eq!(out, "Enabling: Dx 111... done.\n");
    }

    #[test]
    fn test_tracking_device_records_pose_only() {
        let (configs, _) = build(&[DeviceInfo::new("Tx", "222", "T200")]);
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].output_path(), PathBuf::from("/data/run-pose.bag"));
        assert_eq!(configs[0].streams(), StreamSelection::PoseOnly);
    }

    #[test]
    fn test_depth_and_tracking_get_distinct_files() {
        let (configs, _) = build(&[
            DeviceInfo::new("Dx", "111", "D400"),
            DeviceInfo::new("Tx", "222", "T200"),
        ]);
        assert_eq!(configs.len(), 2);
        assert_ne!(configs[0].output_path(), configs[1].output_path());
        assert_eq!(configs[0].class(), DeviceClass::Depth);
        assert_eq!(configs[1].class(), DeviceClass::Tracking);
    }

    #[test]
    fn test_unknown_product_line_is_skipped_silently() {
        let (configs, out) = build(&[DeviceInfo::new("Lx", "333", "L500")]);
        assert!(configs.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_second_device_of_same_class_gets_serial_suffix() {
        let (configs, _) = build(&[
            DeviceInfo::new("D435", "111", "D400"),
            DeviceInfo::new("D455", "444", "D400"),
        ]);
        assert_eq!(configs[0].output_path(), PathBuf::from("/data/run-depth.bag"));
        assert_eq!(
            configs[1].output_path(),
            PathBuf::from("/data/run-depth-444.bag")
        );
    }

    #[test]
    fn test_duplicate_serial_is_configured_once() {
        let (configs, _) = build(&[
            DeviceInfo::new("Dx", "111", "D400"),
            DeviceInfo::new("Dx", "111", "D400"),
        ]);
        assert_eq!(configs.len(), 1);
    }
}
