// Integration tests for the recording session controller.
//
// The simulated capture backend and paused tokio time make the whole
// record → review → send/discard cycle deterministic: the stopwatch ticks
// virtually and scripted sinks pace their events with short virtual sleeps
// so every published snapshot can be observed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::time::Instant;

use clipbooth::{
    CaptureError, ClipStore, MemorySink, Notice, Phase, RecordingSession, SessionConfig,
    SimulatedCapture, UploadEvent, UploadSink,
};

/// Sink that replays fixed scripts, one per upload attempt in order, pacing
/// events 50 virtual milliseconds apart so every snapshot is observable
#[derive(Clone)]
struct ScriptedSink {
    scripts: Arc<Mutex<VecDeque<Vec<UploadEvent>>>>,
}

impl ScriptedSink {
    fn new(events: Vec<UploadEvent>) -> Self {
        Self::with_scripts(vec![events])
    }

    fn with_scripts(scripts: Vec<Vec<UploadEvent>>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into_iter().collect())),
        }
    }
}

impl UploadSink for ScriptedSink {
    fn put(
        &self,
        _object_name: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> BoxStream<'static, UploadEvent> {
        let events = {
            let mut scripts = self.scripts.lock().expect("sink lock");
            scripts.pop_front().expect("a script for every attempt")
        };
        async_stream::stream! {
            for event in events {
                tokio::time::sleep(Duration::from_millis(50)).await;
                yield event;
            }
        }
        .boxed()
    }
}

async fn session_with_sink(
    max_record_secs: u64,
    store: &ClipStore,
    sink: Arc<dyn UploadSink>,
) -> Result<RecordingSession> {
    let config = SessionConfig::default().with_max_record_secs(max_record_secs);
    let session = RecordingSession::new(
        config,
        Arc::new(SimulatedCapture::new()),
        store.clone(),
        sink,
    )
    .await?;
    Ok(session)
}

/// Drive a session to the review screen with a short manual take
async fn record_to_review(session: &RecordingSession) -> Result<()> {
    session.start_recording();
    tokio::time::sleep(Duration::from_millis(1200)).await;
    session.stop_recording();
    session
        .watch()
        .wait_for(|s| s.phase == Phase::Reviewing)
        .await?;
    Ok(())
}

#[tokio::test]
async fn denied_permission_is_terminal() {
    let result = RecordingSession::new(
        SessionConfig::default(),
        Arc::new(SimulatedCapture::denied()),
        ClipStore::new(),
        Arc::new(MemorySink::new()),
    )
    .await;

    assert!(matches!(result, Err(CaptureError::PermissionDenied)));
}

#[tokio::test]
async fn missing_device_is_terminal() {
    let result = RecordingSession::new(
        SessionConfig::default(),
        Arc::new(SimulatedCapture::unavailable()),
        ClipStore::new(),
        Arc::new(MemorySink::new()),
    )
    .await;

    assert!(matches!(result, Err(CaptureError::NoDevice)));
}

#[tokio::test(start_paused = true)]
async fn deadline_forces_the_review_after_max_plus_one_seconds() -> Result<()> {
    let store = ClipStore::new();
    let session = session_with_sink(5, &store, Arc::new(MemorySink::new())).await?;

    let started = Instant::now();
    session.start_recording();

    let mut watch = session.watch();
    watch.wait_for(|s| s.phase == Phase::Reviewing).await?;

    // The comparator is strictly-greater-than, so the take runs a full
    // six seconds before the force-stop fires
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert!(started.elapsed() < Duration::from_secs(7));

    let snapshot = session.snapshot();
    assert!(snapshot.clip_url.is_some());
    assert_eq!(snapshot.elapsed_seconds, 0, "stopwatch cleared on stop");
    assert!(!snapshot.is_running);
    assert_eq!(store.outstanding(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn manual_stop_materializes_a_clip() -> Result<()> {
    let store = ClipStore::new();
    let session = session_with_sink(30, &store, Arc::new(MemorySink::new())).await?;

    record_to_review(&session).await?;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Reviewing);
    assert!(snapshot.clip_url.is_some());
    assert_eq!(snapshot.elapsed_seconds, 0);
    assert_eq!(snapshot.recording_progress, 0.0);
    assert_eq!(store.outstanding(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn discard_releases_the_clip_and_allows_another_take() -> Result<()> {
    let store = ClipStore::new();
    let session = session_with_sink(30, &store, Arc::new(MemorySink::new())).await?;

    record_to_review(&session).await?;
    assert_eq!(store.outstanding(), 1);

    session.discard_clip();
    let mut watch = session.watch();
    watch
        .wait_for(|s| s.phase == Phase::Live && s.clip_url.is_none())
        .await?;
    assert_eq!(store.outstanding(), 0, "discarded reference must be freed");

    // A fresh take works after the discard
    record_to_review(&session).await?;
    assert!(session.snapshot().clip_url.is_some());
    assert_eq!(store.outstanding(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn upload_failure_returns_to_review_with_the_clip_kept() -> Result<()> {
    let store = ClipStore::new();
    let sink = ScriptedSink::new(vec![
        UploadEvent::Progress {
            bytes_transferred: 50,
            total_bytes: 100,
        },
        UploadEvent::Error("network".into()),
    ]);
    let session = session_with_sink(30, &store, Arc::new(sink)).await?;

    record_to_review(&session).await?;
    let clip_url = session.snapshot().clip_url;

    session.send_clip();

    let mut watch = session.watch();
    watch
        .wait_for(|s| s.is_uploading && s.upload_progress == 50.0)
        .await?;

    watch.wait_for(|s| !s.is_uploading).await?;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Reviewing);
    assert_eq!(snapshot.upload_progress, 0.0);
    assert_eq!(snapshot.clip_url, clip_url, "clip kept for a retry");
    assert_eq!(store.outstanding(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn upload_success_without_progress_events() -> Result<()> {
    let store = ClipStore::new();
    let sink = ScriptedSink::new(vec![UploadEvent::Success]);
    let session = session_with_sink(30, &store, Arc::new(sink)).await?;

    record_to_review(&session).await?;
    session.send_clip();

    let mut watch = session.watch();
    watch
        .wait_for(|s| s.notice == Some(Notice::ClipSent))
        .await?;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Live);
    assert!(!snapshot.is_uploading);
    assert_eq!(snapshot.upload_progress, 0.0);
    assert!(snapshot.clip_url.is_none());
    assert_eq!(store.outstanding(), 0, "sent reference must be freed");

    session.acknowledge_notice();
    watch.wait_for(|s| s.notice.is_none()).await?;

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn retry_after_failure_succeeds() -> Result<()> {
    let store = ClipStore::new();
    let sink = ScriptedSink::with_scripts(vec![
        vec![
            UploadEvent::Progress {
                bytes_transferred: 10,
                total_bytes: 100,
            },
            UploadEvent::Error("object store hiccup".into()),
        ],
        vec![UploadEvent::Success],
    ]);
    let session = session_with_sink(30, &store, Arc::new(sink)).await?;

    record_to_review(&session).await?;

    let mut watch = session.watch();
    session.send_clip();
    watch.wait_for(|s| s.is_uploading).await?;
    watch
        .wait_for(|s| !s.is_uploading && s.phase == Phase::Reviewing)
        .await?;
    assert_eq!(store.outstanding(), 1, "clip survives the failed attempt");

    // Send again; this attempt succeeds and releases the clip
    session.send_clip();
    watch
        .wait_for(|s| s.notice == Some(Notice::ClipSent))
        .await?;
    assert_eq!(store.outstanding(), 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn sent_object_lands_in_the_store_under_a_timestamp_name() -> Result<()> {
    let store = ClipStore::new();
    let sink = MemorySink::new();
    let session = session_with_sink(30, &store, Arc::new(sink.clone())).await?;

    record_to_review(&session).await?;
    session.send_clip();

    let mut watch = session.watch();
    watch
        .wait_for(|s| s.notice == Some(Notice::ClipSent))
        .await?;

    assert_eq!(sink.len(), 1);
    let name = sink.object_names().pop().expect("one object");
    let stem = name.strip_suffix(".webm").expect("webm suffix");
    assert!(stem.parse::<i64>().is_ok(), "epoch-millis object name");

    let object = sink.object(&name).expect("stored object");
    assert_eq!(object.content_type, "video/webm");
    assert!(!object.data.is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn teardown_releases_an_unsent_clip() -> Result<()> {
    let store = ClipStore::new();
    let session = session_with_sink(30, &store, Arc::new(MemorySink::new())).await?;

    record_to_review(&session).await?;
    assert_eq!(store.outstanding(), 1);

    session.close().await;
    assert_eq!(store.outstanding(), 0, "teardown must free the reference");

    Ok(())
}
