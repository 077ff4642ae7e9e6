//! Whole-second stopwatch
//!
//! The session's timing source: an integer elapsed-seconds counter that
//! advances by one every 1000 ms while running. `stop` halts advancement
//! without resetting the count, `clear` resets the count to zero. At most
//! one tick task runs per instance; repeated `start` calls are no-ops
//! while already running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Stopwatch {
    elapsed: Arc<watch::Sender<u64>>,
    running: Arc<AtomicBool>,
    tick_task: Option<JoinHandle<()>>,
}

impl Stopwatch {
    pub fn new() -> Self {
        let (elapsed, _) = watch::channel(0);
        Self {
            elapsed: Arc::new(elapsed),
            running: Arc::new(AtomicBool::new(false)),
            tick_task: None,
        }
    }

    /// Begin advancing the counter; no-op while already running
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let elapsed = Arc::clone(&self.elapsed);
        let running = Arc::clone(&self.running);

        self.tick_task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                elapsed.send_modify(|t| *t += 1);
            }
        }));
    }

    /// Halt advancement; the count keeps its value until `clear`
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }

    /// Reset the count to zero without affecting the running state
    pub fn clear(&self) {
        self.elapsed.send_replace(0);
    }

    /// Current elapsed whole seconds
    pub fn time(&self) -> u64 {
        *self.elapsed.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Observe the counter; the receiver is notified on every tick and on
    /// `clear`
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        self.stop();
    }
}
