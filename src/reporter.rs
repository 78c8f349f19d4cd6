//! Console feedback
//!
//! Progress text for the person running a capture. This is not the log:
//! diagnostics go through `tracing` on stderr.

use crate::capture::traits::DeviceInfo;
use crate::recorder::state::RecordingSummary;
use crate::utils::error::RecorderError;
use std::io::{self, Write};
use std::time::Duration;

/// Writes stage progress to a console stream
pub struct Reporter<W: Write = io::Stdout> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the reporter, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    // Partial lines are flushed so they show up before the slow part runs.
    fn partial(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn looking_for_devices(&mut self) -> io::Result<()> {
        self.line("Looking for devices...")
    }

    pub fn enabling(&mut self, device: &DeviceInfo) -> io::Result<()> {
        self.partial(&format!(
            "Enabling: {} {}... ",
            device.name, device.serial_number
        ))
    }

    pub fn done(&mut self) -> io::Result<()> {
        self.line("done.")
    }

    pub fn starting_pipelines(&mut self) -> io::Result<()> {
        self.partial("Starting pipelines... ")
    }

    pub fn logging_for(&mut self, duration: Duration) -> io::Result<()> {
        self.partial(&format!("Logging for {}s.\n  ", duration.as_secs()))
    }

    pub fn tick(&mut self) -> io::Result<()> {
        self.partial(".")
    }

    pub fn logging_done(&mut self) -> io::Result<()> {
        self.line(" done.")
    }

    pub fn stopping_pipelines(&mut self) -> io::Result<()> {
        self.partial("Stopping pipelines... ")
    }

    pub fn nothing_to_record(&mut self) -> io::Result<()> {
        self.line("No depth or tracking cameras found, nothing to record.")
    }

    pub fn saved_files(&mut self, summary: &RecordingSummary) -> io::Result<()> {
        self.line(&format!("Saved files to: {}", summary.output_pattern))?;
        for path in summary.output_files() {
            self.line(&format!("  {}", path.display()))?;
        }
        Ok(())
    }

    pub fn summary_written(&mut self, path: &std::path::Path) -> io::Result<()> {
        self.line(&format!("Wrote summary to: {}", path.display()))
    }

    /// Table of connected devices and how each would be recorded
    pub fn device_list(&mut self, devices: &[DeviceInfo]) -> io::Result<()> {
        if devices.is_empty() {
            return self.line("No devices connected.");
        }
        for device in devices {
            let class = device
                .class()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unsupported".to_string());
            self.line(&format!(
                "{:<28} {:<16} {:<8} {}",
                device.name, device.serial_number, device.product_line, class
            ))?;
        }
        Ok(())
    }
}

/// Print a terminal diagnostic for `error`
///
/// Subsystem errors name the failing call and its arguments; anything else
/// prints its message only.
pub fn report_failure<E: Write>(error: &RecorderError, err: &mut E) -> io::Result<()> {
    writeln!(err, "{error}")
}
