use serde::Serialize;
use tracing::warn;

use crate::clip::ClipUrl;

/// Phase of one recording attempt
///
/// `Finalizing` covers the gap between a stop request and the flushed clip
/// becoming addressable; the session is never simultaneously live and
/// holding a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initializing,
    Live,
    Recording,
    Finalizing,
    Reviewing,
    Uploading,
    Failed,
}

/// One-shot user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    ClipSent,
}

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StreamReady,
    CaptureFailed(String),
    RecordPressed,
    StopPressed,
    /// Stopwatch moved to this elapsed-seconds value
    Tick(u64),
    ClipReady(ClipUrl),
    FinalizeFailed(String),
    DiscardPressed,
    SendPressed,
    UploadProgress {
        bytes_transferred: u64,
        total_bytes: u64,
    },
    UploadFailed(String),
    UploadSucceeded,
    NoticeAcknowledged,
}

/// Side effect requested by a transition, executed by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartStopwatch,
    /// Must complete before the recorder flush is awaited
    HaltAndClearStopwatch,
    /// Stop the recorder, fetch the blob, mint a clip URL
    FinalizeClip,
    ReleaseClip(ClipUrl),
    /// Fetch the blob again and hand it to the upload sink
    BeginUpload,
}

/// Aggregate state of one recording attempt
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub max_record_secs: u64,
    pub elapsed_seconds: u64,
    pub clip_url: Option<ClipUrl>,
    pub is_uploading: bool,
    /// Meaningful only while `is_uploading`
    pub upload_progress: f64,
    pub notice: Option<Notice>,
    pub failure: Option<String>,
}

/// Observable snapshot published to the UI after every event
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub elapsed_seconds: u64,
    pub is_running: bool,
    pub is_uploading: bool,
    pub upload_progress: f64,
    pub recording_progress: f64,
    pub clip_url: Option<String>,
    pub notice: Option<Notice>,
    pub failure: Option<String>,
}

impl SessionState {
    pub fn new(max_record_secs: u64) -> Self {
        Self {
            phase: Phase::Initializing,
            max_record_secs,
            elapsed_seconds: 0,
            clip_url: None,
            is_uploading: false,
            upload_progress: 0.0,
            notice: None,
            failure: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Recording
    }

    /// Progress of the in-flight recording toward the configured maximum,
    /// in percent. Unclamped: may exceed 100 transiently before auto-stop
    /// fires.
    pub fn recording_progress(&self) -> f64 {
        if self.max_record_secs == 0 {
            return 0.0;
        }
        100.0 * self.elapsed_seconds as f64 / self.max_record_secs as f64
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            elapsed_seconds: self.elapsed_seconds,
            is_running: self.is_running(),
            is_uploading: self.is_uploading,
            upload_progress: self.upload_progress,
            recording_progress: self.recording_progress(),
            clip_url: self.clip_url.as_ref().map(|u| u.to_string()),
            notice: self.notice,
            failure: self.failure.clone(),
        }
    }

    /// Pure per-event transition: mutates the state, performs no I/O, and
    /// returns the effects the driver must execute
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        use SessionEvent::*;

        match (self.phase, event) {
            (Phase::Initializing, StreamReady) => {
                self.phase = Phase::Live;
                vec![]
            }
            (Phase::Initializing, CaptureFailed(reason)) => {
                // Terminal for this session, no retry path
                self.phase = Phase::Failed;
                self.failure = Some(reason);
                vec![]
            }
            (Phase::Live, RecordPressed) => {
                self.phase = Phase::Recording;
                self.elapsed_seconds = 0;
                vec![Effect::StartStopwatch]
            }
            (Phase::Recording, Tick(seconds)) => {
                self.elapsed_seconds = seconds;
                // Strictly greater than the maximum: the effective cap is
                // max + 1 seconds at one-second granularity. Intentional.
                if seconds > self.max_record_secs {
                    self.stop_capture()
                } else {
                    vec![]
                }
            }
            (Phase::Recording, StopPressed) => self.stop_capture(),
            (Phase::Finalizing, ClipReady(url)) => {
                self.phase = Phase::Reviewing;
                self.clip_url = Some(url);
                vec![]
            }
            (Phase::Finalizing, FinalizeFailed(reason)) => {
                warn!("clip finalization failed, returning to live preview: {reason}");
                self.phase = Phase::Live;
                vec![]
            }
            (Phase::Reviewing, DiscardPressed) => {
                self.phase = Phase::Live;
                match self.clip_url.take() {
                    Some(url) => vec![Effect::ReleaseClip(url)],
                    None => vec![],
                }
            }
            (Phase::Reviewing, SendPressed) => {
                self.phase = Phase::Uploading;
                self.is_uploading = true;
                self.upload_progress = 0.0;
                vec![Effect::BeginUpload]
            }
            (
                Phase::Uploading,
                UploadProgress {
                    bytes_transferred,
                    total_bytes,
                },
            ) => {
                self.upload_progress = if total_bytes == 0 {
                    0.0
                } else {
                    bytes_transferred as f64 / total_bytes as f64 * 100.0
                };
                vec![]
            }
            (Phase::Uploading, UploadFailed(reason)) => {
                // Recoverable: back to review, clip kept for a retry
                warn!("upload failed: {reason}");
                self.upload_progress = 0.0;
                self.is_uploading = false;
                self.phase = Phase::Reviewing;
                vec![]
            }
            (Phase::Uploading, UploadSucceeded) => {
                self.upload_progress = 0.0;
                self.is_uploading = false;
                self.notice = Some(Notice::ClipSent);
                self.phase = Phase::Live;
                match self.clip_url.take() {
                    Some(url) => vec![Effect::ReleaseClip(url)],
                    None => vec![],
                }
            }
            (_, NoticeAcknowledged) => {
                self.notice = None;
                vec![]
            }
            (_, Tick(seconds)) => {
                // Counter mirror outside Recording (e.g. the clear after a
                // halt); never triggers auto-stop
                self.elapsed_seconds = seconds;
                vec![]
            }
            (phase, event) => {
                warn!(?phase, ?event, "ignoring event in this phase");
                vec![]
            }
        }
    }

    fn stop_capture(&mut self) -> Vec<Effect> {
        self.phase = Phase::Finalizing;
        self.elapsed_seconds = 0;
        vec![Effect::HaltAndClearStopwatch, Effect::FinalizeClip]
    }
}
