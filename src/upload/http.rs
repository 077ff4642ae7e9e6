use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::sink::{UploadEvent, UploadSink};

/// Upload sink backed by an HTTP object store
///
/// Objects are PUT to `{base_url}/{object_name}`. The request body is
/// streamed in chunks and each chunk handed to the transport produces a
/// progress event; a 2xx response is the terminal success.
pub struct HttpSink {
    client: reqwest::Client,
    base_url: String,
    chunk_size: usize,
}

impl HttpSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            chunk_size: 64 * 1024,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl UploadSink for HttpSink {
    fn put(
        &self,
        object_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> BoxStream<'static, UploadEvent> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), object_name);
        let client = self.client.clone();
        let content_type = content_type.to_string();
        let chunk_size = self.chunk_size;

        let (event_tx, mut event_rx) = mpsc::channel::<UploadEvent>(16);

        tokio::spawn(async move {
            let total_bytes = data.len() as u64;
            let chunks: Vec<Vec<u8>> = data.chunks(chunk_size).map(|c| c.to_vec()).collect();

            let progress_tx = event_tx.clone();
            let body = async_stream::stream! {
                let mut bytes_transferred = 0u64;
                for chunk in chunks {
                    bytes_transferred += chunk.len() as u64;
                    let _ = progress_tx
                        .send(UploadEvent::Progress {
                            bytes_transferred,
                            total_bytes,
                        })
                        .await;
                    yield Ok::<_, std::io::Error>(chunk);
                }
            };

            info!(%url, bytes = total_bytes, "uploading object");

            let result = client
                .put(&url)
                .header(CONTENT_TYPE, content_type)
                .body(reqwest::Body::wrap_stream(body))
                .send()
                .await;

            let terminal = match result {
                Ok(response) if response.status().is_success() => UploadEvent::Success,
                Ok(response) => {
                    error!(%url, status = %response.status(), "upload rejected");
                    UploadEvent::Error(format!("upload rejected: {}", response.status()))
                }
                Err(e) => {
                    error!(%url, "upload failed: {e}");
                    UploadEvent::Error(e.to_string())
                }
            };

            let _ = event_tx.send(terminal).await;
        });

        async_stream::stream! {
            while let Some(event) = event_rx.recv().await {
                yield event;
            }
        }
        .boxed()
    }
}
