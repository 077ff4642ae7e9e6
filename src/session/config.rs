use serde::{Deserialize, Serialize};

use crate::capture::MediaConstraints;

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Auto-stop threshold in seconds; recording is force-stopped once the
    /// stopwatch passes this value
    pub max_record_secs: u64,

    /// Constraints used when acquiring the device stream
    pub constraints: MediaConstraints,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_record_secs: 30,
            constraints: MediaConstraints::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_max_record_secs(mut self, max_record_secs: u64) -> Self {
        self.max_record_secs = max_record_secs;
        self
    }
}
