use anyhow::{bail, Result};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::backend::{
    CaptureBackend, CaptureError, Clip, ClipRecorder, MediaConstraints, MediaStream,
};

/// Deterministic capture backend for tests and demos
///
/// Produces a synthetic webm-tagged clip whose size is proportional to the
/// recorded duration, and can be configured to fail acquisition the way a
/// real device would (permission denied / no device).
#[derive(Debug, Clone)]
pub struct SimulatedCapture {
    bytes_per_second: usize,
    failure: Option<SimulatedFailure>,
}

#[derive(Debug, Clone, Copy)]
enum SimulatedFailure {
    PermissionDenied,
    NoDevice,
}

impl SimulatedCapture {
    pub fn new() -> Self {
        Self {
            bytes_per_second: 16_000,
            failure: None,
        }
    }

    /// Backend that refuses acquisition with a permission error
    pub fn denied() -> Self {
        Self {
            failure: Some(SimulatedFailure::PermissionDenied),
            ..Self::new()
        }
    }

    /// Backend that reports no capture device
    pub fn unavailable() -> Self {
        Self {
            failure: Some(SimulatedFailure::NoDevice),
            ..Self::new()
        }
    }

    pub fn with_bytes_per_second(mut self, bytes_per_second: usize) -> Self {
        self.bytes_per_second = bytes_per_second;
        self
    }
}

impl Default for SimulatedCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SimulatedCapture {
    async fn open(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<(MediaStream, Box<dyn ClipRecorder>), CaptureError> {
        match self.failure {
            Some(SimulatedFailure::PermissionDenied) => return Err(CaptureError::PermissionDenied),
            Some(SimulatedFailure::NoDevice) => return Err(CaptureError::NoDevice),
            None => {}
        }

        let stream = MediaStream {
            id: Uuid::new_v4(),
            has_video: constraints.video,
            has_audio: constraints.audio,
        };

        info!(stream = %stream.id, "simulated stream acquired");

        let recorder = SimulatedRecorder {
            bytes_per_second: self.bytes_per_second,
            started_at: None,
            finished: None,
        };

        Ok((stream, Box::new(recorder)))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Recorder produced by [`SimulatedCapture`]
pub struct SimulatedRecorder {
    bytes_per_second: usize,
    started_at: Option<Instant>,
    finished: Option<Clip>,
}

#[async_trait::async_trait]
impl ClipRecorder for SimulatedRecorder {
    fn start_recording(&mut self) -> Result<()> {
        // A new take discards the previous buffer, like MediaRecorder restart
        self.finished = None;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    async fn stop_recording(&mut self) -> Result<()> {
        let Some(started_at) = self.started_at.take() else {
            bail!("recorder was not started");
        };

        let recorded_ms = started_at.elapsed().as_millis() as usize;
        let len = (recorded_ms * self.bytes_per_second / 1000).max(1);
        self.finished = Some(Clip::webm(vec![0xA3; len]));

        Ok(())
    }

    async fn get_blob(&self) -> Result<Clip> {
        match &self.finished {
            Some(clip) => Ok(clip.clone()),
            None => bail!("no finished take to retrieve"),
        }
    }
}
