//! Records a take that runs into the auto-stop deadline, reviews the clip,
//! and sends it to the in-memory sink.
//!
//! Run with: cargo run --example record_and_send

use std::sync::Arc;

use anyhow::Result;
use clipbooth::{
    ClipStore, MemorySink, Notice, Phase, RecordingSession, SessionConfig, SimulatedCapture,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = SessionConfig::default().with_max_record_secs(5);
    let store = ClipStore::new();
    let sink = MemorySink::new();

    let session = RecordingSession::new(
        config,
        Arc::new(SimulatedCapture::new()),
        store.clone(),
        Arc::new(sink.clone()),
    )
    .await?;

    let mut watch = session.watch();

    info!("recording with a 5 second cap; no stop button will be pressed");
    session.start_recording();

    // Print every observable state until the deadline forces the review
    loop {
        watch.changed().await?;
        let snapshot = watch.borrow_and_update().clone();
        println!("{}", serde_json::to_string(&snapshot)?);
        if snapshot.phase == Phase::Reviewing {
            break;
        }
    }

    info!("deadline hit, clip is under review; sending it");
    session.send_clip();
    watch
        .wait_for(|s| s.notice == Some(Notice::ClipSent))
        .await?;

    for name in sink.object_names() {
        info!("sink now holds {}", name);
    }
    info!("outstanding clip references: {}", store.outstanding());

    session.close().await;

    Ok(())
}
