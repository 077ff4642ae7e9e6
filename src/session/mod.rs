//! Recording session management
//!
//! This module provides the `RecordingSession` abstraction that manages:
//! - Device stream acquisition (terminal on failure, no retry)
//! - Recording start/stop with a bounded duration and auto-stop
//! - Clip materialization and local preview references
//! - Hand-off to the upload sink with progress feedback
//! - Observable session state for the UI layer

mod config;
mod session;
mod state;

pub use config::SessionConfig;
pub use session::RecordingSession;
pub use state::{Effect, Notice, Phase, SessionEvent, SessionSnapshot, SessionState};
