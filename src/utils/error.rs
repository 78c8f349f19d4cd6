//! Error types and handling
//!
//! Common error types used across the recorder.

use thiserror::Error;

/// Error raised by the camera subsystem, naming the call that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("RealSense error calling {function}({args}):\n    {message}")]
pub struct SdkError {
    /// Name of the failing subsystem call
    pub function: String,

    /// Arguments the call was made with, rendered for humans
    pub args: String,

    /// Message reported by the subsystem
    pub message: String,
}

impl SdkError {
    pub fn new(
        function: impl Into<String>,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            function: function.into(),
            args: args.into(),
            message: message.into(),
        }
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Device {serial} is already claimed by another pipeline")]
    DeviceClaimed { serial: String },

    #[error("Recording error: {0}")]
    Recording(String),
}

impl RecorderError {
    /// The subsystem error behind this failure, if there is one
    pub fn as_sdk(&self) -> Option<&SdkError> {
        match self {
            RecorderError::Sdk(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_names_the_failing_call() {
        let err = SdkError::new("rs2_pipeline_start_with_config", "pipe:0x1, config:0x2", "Device busy");
        assert_eq!(
            err.to_string(),
            "RealSense error calling rs2_pipeline_start_with_config(pipe:0x1, config:0x2):\n    Device busy"
        );

        let wrapped = RecorderError::from(err.clone());
        assert_eq!(wrapped.as_sdk(), Some(&err));
        assert_eq!(wrapped.to_string(), err.to_string());
    }

    #[test]
    fn test_generic_errors_are_not_sdk_errors() {
        let err = RecorderError::Recording("nothing configured".to_string());
        assert!(err.as_sdk().is_none());
        assert_eq!(err.to_string(), "Recording error: nothing configured");
    }
}
