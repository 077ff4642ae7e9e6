use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Context;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::state::{Effect, SessionEvent, SessionSnapshot, SessionState};
use crate::capture::{CaptureBackend, CaptureError, ClipRecorder, MediaStream};
use crate::clip::{ClipStore, ClipUrl};
use crate::stopwatch::Stopwatch;
use crate::upload::{object_name_now, UploadEvent, UploadSink};

/// UI actions accepted by a live session
#[derive(Debug)]
enum Command {
    Record,
    Stop,
    Discard,
    Send,
    AcknowledgeNotice,
}

/// One record → review → send/discard attempt
///
/// Acquires the device stream on construction; a permission or availability
/// failure there is terminal. All later activity runs on a driver task fed
/// by UI commands, stopwatch ticks, and upload events; observable state is
/// published through a watch channel after every event.
pub struct RecordingSession {
    cmd_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    driver: JoinHandle<()>,
}

impl RecordingSession {
    /// Acquire the stream and recorder, then start the driver
    pub async fn new(
        config: SessionConfig,
        backend: Arc<dyn CaptureBackend>,
        clip_store: ClipStore,
        sink: Arc<dyn UploadSink>,
    ) -> Result<Self, CaptureError> {
        info!(
            backend = backend.name(),
            max_record_secs = config.max_record_secs,
            "acquiring media stream"
        );

        let (stream, recorder) = backend.open(&config.constraints).await?;
        info!(stream = %stream.id, "media stream acquired");

        let mut state = SessionState::new(config.max_record_secs);
        state.apply(SessionEvent::StreamReady);

        let stopwatch = Stopwatch::new();
        let tick_rx = stopwatch.subscribe();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            state,
            stopwatch,
            tick_rx,
            _stream: stream,
            recorder,
            clip_store,
            sink,
            snapshot_tx,
            cmd_rx,
            upload_events: None,
        };

        let driver = tokio::spawn(driver.run());

        Ok(Self {
            cmd_tx,
            snapshot_rx,
            driver,
        })
    }

    /// Begin a take
    pub fn start_recording(&self) {
        self.send(Command::Record);
    }

    /// Stop the current take and materialize the clip
    pub fn stop_recording(&self) {
        self.send(Command::Stop);
    }

    /// Drop the reviewed clip and return to live preview
    pub fn discard_clip(&self) {
        self.send(Command::Discard);
    }

    /// Hand the reviewed clip to the upload sink
    pub fn send_clip(&self) {
        self.send(Command::Send);
    }

    /// Dismiss the one-shot "clip sent" confirmation
    pub fn acknowledge_notice(&self) {
        self.send(Command::AcknowledgeNotice);
    }

    /// Observe session state; notified after every event
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Tear the session down, releasing any live clip reference
    pub async fn close(self) {
        let Self {
            cmd_tx,
            snapshot_rx,
            driver,
        } = self;
        drop(cmd_tx);
        drop(snapshot_rx);
        if let Err(e) = driver.await {
            error!("session driver panicked: {e}");
        }
    }

    fn send(&self, command: Command) {
        if self.cmd_tx.send(command).is_err() {
            warn!("session driver is gone, command dropped");
        }
    }
}

/// Owns the collaborators and runs the event loop
struct Driver {
    state: SessionState,
    stopwatch: Stopwatch,
    tick_rx: watch::Receiver<u64>,
    /// Held so the device stream stays open for live preview
    _stream: MediaStream,
    recorder: Box<dyn ClipRecorder>,
    clip_store: ClipStore,
    sink: Arc<dyn UploadSink>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    /// Subscription of the in-flight upload, if any
    upload_events: Option<BoxStream<'static, UploadEvent>>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Record) => SessionEvent::RecordPressed,
                    Some(Command::Stop) => SessionEvent::StopPressed,
                    Some(Command::Discard) => SessionEvent::DiscardPressed,
                    Some(Command::Send) => SessionEvent::SendPressed,
                    Some(Command::AcknowledgeNotice) => SessionEvent::NoticeAcknowledged,
                    // Session handle dropped: tear down
                    None => break,
                },
                changed = self.tick_rx.changed() => match changed {
                    Ok(()) => SessionEvent::Tick(*self.tick_rx.borrow_and_update()),
                    Err(_) => break,
                },
                upload = next_upload_event(&mut self.upload_events) => {
                    match upload {
                        Some(UploadEvent::Progress { bytes_transferred, total_bytes }) => {
                            SessionEvent::UploadProgress { bytes_transferred, total_bytes }
                        }
                        Some(UploadEvent::Error(reason)) => {
                            self.upload_events = None;
                            SessionEvent::UploadFailed(reason)
                        }
                        Some(UploadEvent::Success) => {
                            self.upload_events = None;
                            SessionEvent::UploadSucceeded
                        }
                        None => {
                            self.upload_events = None;
                            SessionEvent::UploadFailed("upload ended without a terminal event".into())
                        }
                    }
                }
            };

            self.dispatch(event).await;
        }

        self.shutdown();
    }

    /// Apply an event, publish the new state, and execute the requested
    /// effects; effects may feed follow-up events back into the queue
    async fn dispatch(&mut self, event: SessionEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let effects = self.state.apply(event);
            self.publish();

            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }

        self.publish();
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::StartStopwatch => {
                self.stopwatch.start();
                None
            }
            Effect::HaltAndClearStopwatch => {
                // Synchronous, so the stopwatch is settled before any
                // recorder flush below is awaited
                self.stopwatch.stop();
                self.stopwatch.clear();
                None
            }
            Effect::FinalizeClip => match self.finalize_clip().await {
                Ok(url) => Some(SessionEvent::ClipReady(url)),
                Err(e) => {
                    error!("failed to finalize clip: {e:#}");
                    Some(SessionEvent::FinalizeFailed(e.to_string()))
                }
            },
            Effect::ReleaseClip(url) => {
                self.clip_store.revoke(&url);
                None
            }
            Effect::BeginUpload => match self.recorder.get_blob().await {
                Ok(clip) => {
                    let object_name = object_name_now();
                    info!(
                        object = %object_name,
                        bytes = clip.data.len(),
                        "handing clip to upload sink"
                    );
                    self.upload_events =
                        Some(self.sink.put(&object_name, clip.data, &clip.content_type));
                    None
                }
                Err(e) => {
                    error!("failed to retrieve clip for upload: {e:#}");
                    Some(SessionEvent::UploadFailed(e.to_string()))
                }
            },
        }
    }

    async fn finalize_clip(&mut self) -> anyhow::Result<ClipUrl> {
        self.recorder
            .stop_recording()
            .await
            .context("failed to stop recorder")?;

        let clip = self
            .recorder
            .get_blob()
            .await
            .context("failed to retrieve encoded clip")?;

        Ok(self.clip_store.create(clip))
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.snapshot());
    }

    fn shutdown(mut self) {
        self.stopwatch.stop();
        if let Some(url) = self.state.clip_url.take() {
            self.clip_store.revoke(&url);
        }
        info!("session closed");
    }
}

/// Next event of the in-flight upload; pends forever when none is in flight
async fn next_upload_event(
    upload: &mut Option<BoxStream<'static, UploadEvent>>,
) -> Option<UploadEvent> {
    match upload {
        Some(events) => events.next().await,
        None => std::future::pending().await,
    }
}
