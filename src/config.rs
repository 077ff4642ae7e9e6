use anyhow::Result;
use serde::Deserialize;

use crate::capture::MediaConstraints;
use crate::session::SessionConfig;

/// Environment variable overriding the auto-stop threshold.
pub const RECORD_SECONDS_ENV: &str = "RECORD_SECONDS";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recording: RecordingConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Auto-stop threshold in seconds
    pub max_record_secs: u64,
    pub video: bool,
    pub audio: bool,
    pub echo_cancellation: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_record_secs: 30,
            video: true,
            audio: true,
            echo_cancellation: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Base URL of the HTTP object store; in-memory sink when unset
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from an optional file, with the `RECORD_SECONDS`
    /// environment variable taking precedence for the auto-stop threshold
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Ok(seconds) = std::env::var(RECORD_SECONDS_ENV) {
            builder = builder.set_override("recording.max_record_secs", seconds)?;
        }

        let settings = builder.build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn constraints(&self) -> MediaConstraints {
        MediaConstraints {
            video: self.recording.video,
            audio: self.recording.audio,
            echo_cancellation: self.recording.echo_cancellation,
        }
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            max_record_secs: self.recording.max_record_secs,
            constraints: self.constraints(),
        }
    }
}
