use futures::stream::BoxStream;

/// Event emitted by an in-flight upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Transfer progress; sinks may emit zero, one, or many of these
    Progress {
        bytes_transferred: u64,
        total_bytes: u64,
    },
    /// Terminal failure; the object was not stored
    Error(String),
    /// Terminal success; the object is durably stored
    Success,
}

/// Object-storage sink accepting finished clips
///
/// `put` starts the transfer immediately and returns its event stream; the
/// stream ends after the terminal event.
pub trait UploadSink: Send + Sync {
    fn put(
        &self,
        object_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> BoxStream<'static, UploadEvent>;
}

/// Object name for a clip uploaded now: current epoch milliseconds + `.webm`
pub fn object_name_now() -> String {
    format!("{}.webm", chrono::Utc::now().timestamp_millis())
}
