use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::info;

use super::sink::{UploadEvent, UploadSink};

/// An object held by [`MemorySink`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-process upload sink for tests and demos
///
/// Stores objects in a shared map and reports chunked transfer progress.
/// `fail_next` scripts a terminal error for the next `put`, after which the
/// object is not stored.
#[derive(Clone)]
pub struct MemorySink {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_next: Arc<Mutex<Option<String>>>,
    chunk_size: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_next: Arc::new(Mutex::new(None)),
            chunk_size: 64 * 1024,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Make the next `put` fail with the given message
    pub fn fail_next(&self, message: impl Into<String>) {
        let mut fail = self.fail_next.lock().unwrap_or_else(|e| e.into_inner());
        *fail = Some(message.into());
    }

    pub fn object(&self, name: &str) -> Option<StoredObject> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.get(name).cloned()
    }

    pub fn object_names(&self) -> Vec<String> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSink for MemorySink {
    fn put(
        &self,
        object_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> BoxStream<'static, UploadEvent> {
        let objects = Arc::clone(&self.objects);
        let object_name = object_name.to_string();
        let content_type = content_type.to_string();
        let chunk_size = self.chunk_size;

        let scripted_failure = {
            let mut fail = self.fail_next.lock().unwrap_or_else(|e| e.into_inner());
            fail.take()
        };

        async_stream::stream! {
            let total_bytes = data.len() as u64;
            let mut bytes_transferred = 0u64;

            for chunk in data.chunks(chunk_size) {
                bytes_transferred += chunk.len() as u64;
                yield UploadEvent::Progress {
                    bytes_transferred,
                    total_bytes,
                };
            }

            if let Some(message) = scripted_failure {
                yield UploadEvent::Error(message);
                return;
            }

            info!(object = %object_name, bytes = total_bytes, "stored object in memory sink");
            {
                let mut objects = objects.lock().unwrap_or_else(|e| e.into_inner());
                objects.insert(object_name, StoredObject { data, content_type });
            }

            yield UploadEvent::Success;
        }
        .boxed()
    }
}
