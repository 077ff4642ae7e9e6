//! Upload sink collaborators
//!
//! The finished clip is handed to an object-storage sink which reports back
//! through an asynchronous event stream: zero or more progress events
//! followed by exactly one terminal success or error event. One subscriber
//! consumes the stream per upload attempt.

mod http;
mod memory;
mod sink;

pub use http::HttpSink;
pub use memory::{MemorySink, StoredObject};
pub use sink::{object_name_now, UploadEvent, UploadSink};
