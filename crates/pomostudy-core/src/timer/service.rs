//! Repeating tick source driving a [`SessionEngine`].
//!
//! The service owns the engine behind a single mutex and a spawned tokio
//! task that fires `tick()` once per second. Every operation serializes
//! through the same lock, so a tick runs to completion without
//! interleaving with skip, reset, or a settings change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

use super::chunk::TimeChunk;
use super::engine::{SessionEngine, TickOutcome};
use crate::error::EngineError;

/// Drives a [`SessionEngine`] with a repeating one-second tick.
///
/// Ready = no tick task, freshly built queue. Running = tick task armed.
/// Paused = no tick task, queue frozen at the last tick. `reset()` returns
/// to Ready from anywhere.
pub struct TimerService {
    engine: Arc<Mutex<SessionEngine>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerService {
    pub fn new(engine: SessionEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Begin (or restart) the repeating tick.
    ///
    /// Any existing tick task is aborted and replaced, so calling this
    /// twice never double-schedules. Chunk state is untouched.
    pub async fn start(&self) {
        let mut ticker = self.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let engine = self.engine.clone();
        let tick_interval = self.tick_interval;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first interval tick completes immediately; consume it so
            // the first decrement lands a full period after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                let outcome = engine.lock().await.tick();
                match outcome {
                    Ok(TickOutcome::SessionComplete) => break,
                    Ok(_) => {}
                    Err(e) => {
                        log::error!("tick failed, stopping timer: {e}");
                        break;
                    }
                }
            }
        });
        *ticker = Some(handle);
    }

    /// Cancel the repeating tick without mutating chunk state.
    ///
    /// Safe to call when not running. After this returns, no further tick
    /// fires: the task is aborted, and taking the engine lock flushes any
    /// tick already in flight.
    pub async fn stop(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
        drop(self.engine.lock().await);
    }

    /// Whether the tick task is currently armed.
    pub async fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Block until the current session completes and the tick task exits.
    pub async fn wait(&self) {
        let handle = self.ticker.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Skip the current chunk. The timer keeps running against the new
    /// front chunk, unless the skip emptied the queue and completed the
    /// session, which stops the tick like any other completion.
    pub async fn skip(&self) -> Result<(), EngineError> {
        let outcome = self.engine.lock().await.skip()?;
        if outcome == TickOutcome::SessionComplete {
            self.stop().await;
        }
        Ok(())
    }

    /// Stop the timer and rebuild a fresh session, persisting partial
    /// progress on the interrupted chunk.
    pub async fn reset(&self) -> Result<(), EngineError> {
        self.stop().await;
        self.engine.lock().await.reset()
    }

    /// Re-map the remaining chunks after a settings write. The timer keeps
    /// running if it was running.
    pub async fn settings_changed(&self) -> Result<(), EngineError> {
        self.engine.lock().await.settings_changed()
    }

    /// Snapshot of the chunk currently at the front of the queue.
    pub async fn current_chunk(&self) -> Result<TimeChunk, EngineError> {
        self.engine.lock().await.current_chunk().cloned()
    }
}
