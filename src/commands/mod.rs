//! Command handlers
//!
//! Picks the camera backend named on the command line and runs the
//! requested flow against it.

pub mod recording;
pub mod system;

use crate::capture::simulated::SimulatedBackend;
use crate::capture::traits::CameraBackend;
use crate::cli::{Args, BackendKind};
use crate::reporter::Reporter;
use crate::utils::error::RecorderResult;

/// Run the flow selected by `args`
pub async fn execute(args: Args) -> RecorderResult<()> {
    match args.backend {
        BackendKind::Simulated => dispatch(&SimulatedBackend::demo(), &args).await,
        BackendKind::Realsense => realsense(&args).await,
    }
}

#[cfg(feature = "realsense")]
async fn realsense(args: &Args) -> RecorderResult<()> {
    let backend = crate::capture::realsense::RealsenseBackend::new()?;
    dispatch(&backend, args).await
}

#[cfg(not(feature = "realsense"))]
async fn realsense(_args: &Args) -> RecorderResult<()> {
    Err(crate::utils::error::RecorderError::Recording(
        "built without RealSense support; rebuild with `--features realsense`".to_string(),
    ))
}

async fn dispatch<B: CameraBackend>(backend: &B, args: &Args) -> RecorderResult<()> {
    let mut reporter = Reporter::stdout();
    if args.list_devices {
        system::list_devices(backend, &mut reporter)?;
        return Ok(());
    }

    recording::record(
        backend,
        &args.recording_options(),
        args.summary.as_deref(),
        &mut reporter,
    )
    .await?;
    Ok(())
}
