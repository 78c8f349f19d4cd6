//! Recording coordinator
//!
//! Starts one pipeline per device configuration, keeps them running for the
//! recording window and stops them again.
//!
//! Pipelines are started one after another, so start times across devices
//! are only as close as sequential calls make them. Nothing aligns their
//! timestamps. A pipeline's file is only finalized by `stop`; if the process
//! dies during the window the files it was writing may be truncated.

use super::state::{
    DeviceConfiguration, RecordedDevice, RecordingOptions, RecordingState, RecordingSummary,
};
use crate::capture::traits::{CameraBackend, CapturePipeline};
use crate::reporter::Reporter;
use crate::utils::error::{RecorderError, RecorderResult};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;
use tokio::time::Instant;

/// Cadence of the progress dots while recording
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

fn deadline_after(duration: Duration) -> RecorderResult<Instant> {
    Instant::now().checked_add(duration).ok_or_else(|| {
        RecorderError::Recording(format!(
            "recording window of {}s is too long",
            duration.as_secs()
        ))
    })
}

/// A started pipeline and the configuration it was started with
struct ActivePipeline<P> {
    config: DeviceConfiguration,
    pipeline: P,
}

/// Runs the capture pipelines of one recording
pub struct RecordingCoordinator<'a, B: CameraBackend> {
    backend: &'a B,

    options: RecordingOptions,

    state: RecordingState,

    /// Running pipelines, in start order
    pipelines: Vec<ActivePipeline<B::Pipeline>>,

    /// Wall-clock time recording started
    started_at: Option<DateTime<Utc>>,

    /// Monotonic time recording started
    start_time: Option<Instant>,
}

impl<'a, B: CameraBackend> RecordingCoordinator<'a, B> {
    pub fn new(backend: &'a B, options: RecordingOptions) -> Self {
        Self {
            backend,
            options,
            state: RecordingState::Idle,
            pipelines: Vec::new(),
            started_at: None,
            start_time: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Number of pipelines currently running
    pub fn active_pipelines(&self) -> usize {
        self.pipelines.len()
    }

    /// Start a pipeline for every configuration, in order.
    ///
    /// If any start fails, the pipelines already started are stopped again
    /// (best effort) before the error is returned.
    pub fn start_all<W: Write>(
        &mut self,
        configs: Vec<DeviceConfiguration>,
        reporter: &mut Reporter<W>,
    ) -> RecorderResult<()> {
        if self.state != RecordingState::Idle {
            return Err(RecorderError::Recording(
                "recording was already started".to_string(),
            ));
        }

        // Checked before any device is claimed.
        deadline_after(self.options.record_for)?;

        tracing::info!("Starting {} pipeline(s)", configs.len());
        self.started_at = Some(Utc::now());
        self.start_time = Some(Instant::now());
        self.state = RecordingState::Recording;

        if let Err(e) = self.start_pipelines(configs, reporter) {
            self.abort();
            return Err(e);
        }
        Ok(())
    }

    fn start_pipelines<W: Write>(
        &mut self,
        configs: Vec<DeviceConfiguration>,
        reporter: &mut Reporter<W>,
    ) -> RecorderResult<()> {
        reporter.starting_pipelines()?;

        let mut claimed = HashSet::new();
        for config in configs {
            if !claimed.insert(config.serial_number().to_string()) {
                return Err(RecorderError::DeviceClaimed {
                    serial: config.serial_number().to_string(),
                });
            }

            let mut pipeline = self.backend.create_pipeline()?;
            pipeline.start(&config)?;
            tracing::info!(
                "Started pipeline for {} -> {}",
                config.serial_number(),
                config.output_path().display()
            );
            self.pipelines.push(ActivePipeline { config, pipeline });
        }

        reporter.done()?;
        Ok(())
    }

    /// Stop whatever was started and go back to idle
    fn abort(&mut self) {
        for mut active in self.pipelines.drain(..) {
            match active.pipeline.stop() {
                Ok(()) => tracing::info!(
                    "Stopped pipeline for {} after failed start",
                    active.config.serial_number()
                ),
                Err(e) => tracing::warn!(
                    "Could not stop pipeline for {}: {}",
                    active.config.serial_number(),
                    e
                ),
            }
        }
        self.state = RecordingState::Idle;
        self.started_at = None;
        self.start_time = None;
    }

    /// Block for `duration`, printing a dot every tick.
    ///
    /// Returns no earlier than `duration` after it was called. The window
    /// cannot be shortened or interrupted.
    pub async fn record_for<W: Write>(
        &self,
        duration: Duration,
        reporter: &mut Reporter<W>,
    ) -> RecorderResult<()> {
        if self.state != RecordingState::Recording {
            return Err(RecorderError::Recording("not recording".to_string()));
        }

        let deadline = deadline_after(duration)?;
        reporter.logging_for(duration)?;
        while Instant::now() < deadline {
            tokio::time::sleep(TICK_INTERVAL).await;
            reporter.tick()?;
        }
        reporter.logging_done()?;
        Ok(())
    }

    /// Stop every pipeline in start order.
    ///
    /// All pipelines are stopped even if one of them fails; the first
    /// failure is returned afterwards.
    pub fn stop_all<W: Write>(
        &mut self,
        reporter: &mut Reporter<W>,
    ) -> RecorderResult<RecordingSummary> {
        if self.state != RecordingState::Recording {
            return Err(RecorderError::Recording("not recording".to_string()));
        }

        let announced = reporter.stopping_pipelines();

        let mut first_error = None;
        let mut devices = Vec::with_capacity(self.pipelines.len());
        for mut active in self.pipelines.drain(..) {
            match active.pipeline.stop() {
                Ok(()) => tracing::info!(
                    "Stopped pipeline for {}",
                    active.config.serial_number()
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to stop pipeline for {}: {}",
                        active.config.serial_number(),
                        e
                    );
                    first_error.get_or_insert(e);
                }
            }
            devices.push(RecordedDevice::from(&active.config));
        }
        self.state = RecordingState::Complete;

        if let Some(e) = first_error {
            return Err(e.into());
        }
        announced?;
        reporter.done()?;

        let stopped_at = Utc::now();
        let duration_ms = self
            .start_time
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);

        tracing::info!("Recording stopped. Duration: {}ms", duration_ms);
        Ok(RecordingSummary {
            output_pattern: self.options.output_pattern(),
            devices,
            started_at: self.started_at.unwrap_or(stopped_at),
            stopped_at,
            duration_ms,
        })
    }

    /// Start every configuration, record for the configured window, stop.
    pub async fn run<W: Write>(
        &mut self,
        configs: Vec<DeviceConfiguration>,
        reporter: &mut Reporter<W>,
    ) -> RecorderResult<RecordingSummary> {
        self.start_all(configs, reporter)?;
        let waited = self.record_for(self.options.record_for, reporter).await;
        let summary = self.stop_all(reporter);
        waited?;
        summary
    }
}
