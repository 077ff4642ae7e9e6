//! Local clip references
//!
//! A finished clip is exposed to the UI through a locally addressable
//! `blob:` URL, the way a browser hands out object URLs. The store owns the
//! underlying bytes; every minted URL must be revoked on discard, after a
//! successful upload, or at teardown, or the buffer leaks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::capture::Clip;

/// Locally addressable reference to a finished clip
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClipUrl(String);

impl ClipUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live clip references
#[derive(Debug, Clone, Default)]
pub struct ClipStore {
    objects: Arc<Mutex<HashMap<ClipUrl, Clip>>>,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a URL for a clip, taking ownership of its bytes
    pub fn create(&self, clip: Clip) -> ClipUrl {
        let url = ClipUrl(format!("blob:{}", Uuid::new_v4()));
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.insert(url.clone(), clip);
        url
    }

    /// Fetch the clip behind a URL, if it is still live
    pub fn get(&self, url: &ClipUrl) -> Option<Clip> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.get(url).cloned()
    }

    /// Release a URL and free the underlying buffer
    pub fn revoke(&self, url: &ClipUrl) {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        if objects.remove(url).is_none() {
            warn!(%url, "revoked a clip URL that was not live");
        }
    }

    /// Number of URLs that have not been revoked yet
    pub fn outstanding(&self) -> usize {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.len()
    }
}
