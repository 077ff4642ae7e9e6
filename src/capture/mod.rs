//! Media capture collaborators
//!
//! This module provides the seams between the session core and the host
//! platform's media machinery:
//! - `CaptureBackend`: acquires a live A/V stream and a recorder bound to it
//! - `ClipRecorder`: start/stop capture and retrieve the encoded clip
//! - `SimulatedCapture`: deterministic backend for tests and demos

mod backend;
mod simulated;

pub use backend::{
    CaptureBackend, CaptureError, Clip, ClipRecorder, MediaConstraints, MediaStream, WEBM,
};
pub use simulated::{SimulatedCapture, SimulatedRecorder};
