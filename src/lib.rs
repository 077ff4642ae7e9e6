pub mod capture;
pub mod clip;
pub mod config;
pub mod session;
pub mod stopwatch;
pub mod upload;

pub use capture::{
    CaptureBackend, CaptureError, Clip, ClipRecorder, MediaConstraints, MediaStream,
    SimulatedCapture, WEBM,
};
pub use clip::{ClipStore, ClipUrl};
pub use config::Config;
pub use session::{
    Notice, Phase, RecordingSession, SessionConfig, SessionEvent, SessionSnapshot, SessionState,
};
pub use stopwatch::Stopwatch;
pub use upload::{HttpSink, MemorySink, UploadEvent, UploadSink};
