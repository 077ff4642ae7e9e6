use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Content type of encoded clips.
pub const WEBM: &str = "video/webm";

/// Constraints passed to the device when acquiring a stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConstraints {
    /// Request a video track
    pub video: bool,
    /// Request an audio track
    pub audio: bool,
    /// Enable acoustic echo cancellation on the audio track
    pub echo_cancellation: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            echo_cancellation: true,
        }
    }
}

/// Handle to a live device stream
///
/// The stream stays open for live preview as long as the handle is held;
/// dropping it releases the underlying tracks.
#[derive(Debug, Clone)]
pub struct MediaStream {
    /// Opaque stream identifier
    pub id: Uuid,
    /// Whether the stream carries a video track
    pub has_video: bool,
    /// Whether the stream carries an audio track
    pub has_audio: bool,
}

/// An encoded clip retrieved from the recorder
#[derive(Debug, Clone)]
pub struct Clip {
    /// Encoded media bytes
    pub data: Vec<u8>,
    /// MIME type of the encoding (normally `video/webm`)
    pub content_type: String,
}

impl Clip {
    pub fn webm(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: WEBM.to_string(),
        }
    }
}

/// Stream acquisition failure
///
/// Acquisition failures are terminal for the session: there is no retry
/// path, the widget stays unusable until it is recreated.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("permission to use the capture device was denied")]
    PermissionDenied,
    #[error("no capture device available")]
    NoDevice,
    #[error("capture backend failed: {0}")]
    Backend(String),
}

/// Device capture backend
///
/// Implementations wrap whatever the host platform provides (a browser's
/// getUserMedia + MediaRecorder, a native capture stack, or the simulated
/// backend used in tests).
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire a live stream and a recorder bound to it
    ///
    /// Resolves once the device permission has been granted and the stream
    /// is flowing.
    async fn open(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<(MediaStream, Box<dyn ClipRecorder>), CaptureError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Recording engine bound to one stream
///
/// A recorder supports repeated takes: calling `start_recording` after a
/// finished take begins a fresh capture and discards the previous buffer.
#[async_trait::async_trait]
pub trait ClipRecorder: Send {
    /// Begin capturing the bound stream
    fn start_recording(&mut self) -> Result<()>;

    /// Stop capturing and flush the encoder
    async fn stop_recording(&mut self) -> Result<()>;

    /// Retrieve the encoded clip of the last finished take
    async fn get_blob(&self) -> Result<Clip>;
}
