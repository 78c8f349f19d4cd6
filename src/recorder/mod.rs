//! Recording system module
//!
//! - builder: one DeviceConfiguration per recordable device
//! - coordinator: starts, times and stops the capture pipelines
//! - state: options, configurations and run summaries

pub mod builder;
pub mod coordinator;
pub mod state;

pub use builder::build_configurations;
pub use coordinator::RecordingCoordinator;
pub use state::{DeviceConfiguration, RecordingOptions, RecordingState, RecordingSummary};
