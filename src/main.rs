use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use clipbooth::{
    ClipStore, Config, HttpSink, MemorySink, Notice, Phase, RecordingSession, SimulatedCapture,
    UploadSink,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "clipbooth", about = "Bounded-duration clip recording core")]
struct Args {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/clipbooth")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("clipbooth v0.1.0");
    info!(
        "auto-stop threshold: {} seconds",
        cfg.recording.max_record_secs
    );

    let sink: Arc<dyn UploadSink> = match &cfg.upload.endpoint {
        Some(endpoint) => {
            info!("uploading to {}", endpoint);
            Arc::new(HttpSink::new(endpoint.clone()))
        }
        None => {
            info!("no upload endpoint configured, using the in-memory sink");
            Arc::new(MemorySink::new())
        }
    };

    // Smoke pass with the simulated backend: one two-second take,
    // reviewed and sent
    let store = ClipStore::new();
    let session = RecordingSession::new(
        cfg.session(),
        Arc::new(SimulatedCapture::new()),
        store.clone(),
        sink,
    )
    .await?;

    let mut watch = session.watch();

    session.start_recording();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    session.stop_recording();

    watch.wait_for(|s| s.phase == Phase::Reviewing).await?;
    info!("clip ready: {:?}", session.snapshot().clip_url);

    session.send_clip();
    watch.wait_for(|s| s.notice == Some(Notice::ClipSent)).await?;
    info!("clip sent, {} clip references outstanding", store.outstanding());

    session.acknowledge_notice();
    info!(
        "final state: {}",
        serde_json::to_string(&session.snapshot())?
    );
    session.close().await;

    Ok(())
}
