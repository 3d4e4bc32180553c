//! Session engine implementation.
//!
//! The engine is a synchronous state machine over an ordered chunk queue.
//! It does not own a clock - the caller (normally [`TimerService`]) invokes
//! `tick()` once per elapsed second and serializes all operations behind a
//! single lock.
//!
//! ## State transitions
//!
//! ```text
//! Ready/Paused -> Running   start() on the driving service
//! Running      -> Paused    stop() on the driving service
//! any          -> Ready     reset() (rebuilds the session)
//! ```
//!
//! `skip()` is a same-state transition that replaces the queue head.
//!
//! [`TimerService`]: super::service::TimerService

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::chunk::TimeChunk;
use super::session::{Session, SessionPlan};
use crate::error::{CoreError, EngineError};

/// Receives timer-tick and lifecycle notifications.
///
/// The engine calls outward through this capability set only; a display
/// layer implements it to stay in sync with the countdown.
pub trait SessionListener: Send + Sync {
    /// Fired every second with the just-decremented current chunk.
    fn on_tick(&self, chunk: &TimeChunk);

    /// Fired whenever the displayed chunk changes discontinuously (skip,
    /// reset, settings change) and the display must re-synchronize to a
    /// fresh chunk's full length.
    fn on_chunk_reset(&self, chunk: &TimeChunk);

    /// Fired when the session sequence empties and has just been rebuilt.
    fn on_session_complete(&self);

    /// Fired when a chunk finishes by natural countdown, as opposed to
    /// being skipped. Used to trigger an audible notification.
    fn on_chunk_complete(&self);
}

/// Supplies the configured durations and the currently selected subject.
pub trait SettingsProvider: Send + Sync {
    fn work_secs(&self) -> u64;
    fn short_break_secs(&self) -> u64;
    fn long_break_secs(&self) -> u64;
    fn pair_count(&self) -> u32;
    fn selected_subject(&self) -> Option<String>;
}

impl SessionPlan {
    /// Snapshot the four session-building values from a settings provider.
    pub fn from_settings(settings: &dyn SettingsProvider) -> Self {
        Self {
            work_secs: settings.work_secs(),
            short_break_secs: settings.short_break_secs(),
            long_break_secs: settings.long_break_secs(),
            pair_count: settings.pair_count(),
        }
    }
}

/// Records study progress for a subject.
///
/// The store resolves the subject by name (creating it if needed) and
/// commits one record per call.
pub trait ProgressStore: Send + Sync {
    fn record_progress(
        &self,
        subject: &str,
        seconds: u64,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), CoreError>;
}

/// What a queue-mutating operation did, so the driving service knows
/// whether the tick source should keep firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The current chunk is still counting down.
    Running,
    /// The front chunk finished and was popped; the next chunk is up.
    ChunkComplete,
    /// The queue emptied and a fresh session was rebuilt; the tick source
    /// must stop.
    SessionComplete,
}

/// Drives one work/break cycle over an ordered chunk queue.
///
/// Collaborators are injected at construction so tests can substitute
/// in-memory fakes for settings, persistence, and presentation.
pub struct SessionEngine {
    session: Session,
    settings: Arc<dyn SettingsProvider>,
    store: Arc<dyn ProgressStore>,
    listener: Arc<dyn SessionListener>,
}

impl SessionEngine {
    /// Build an engine with a fresh session from the current settings.
    ///
    /// # Errors
    /// Returns an error if the configured plan is degenerate (pair count
    /// zero or any duration zero).
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        store: Arc<dyn ProgressStore>,
        listener: Arc<dyn SessionListener>,
    ) -> Result<Self, EngineError> {
        let session = Session::build(&SessionPlan::from_settings(&*settings))?;
        Ok(Self {
            session,
            settings,
            store,
            listener,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The chunk currently being counted down.
    ///
    /// # Errors
    /// Returns `EmptySession` if the queue is empty, which would mean a
    /// completed session was not rebuilt - an internal consistency fault.
    pub fn current_chunk(&self) -> Result<&TimeChunk, EngineError> {
        self.session.front().ok_or(EngineError::EmptySession)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the countdown by one second.
    ///
    /// Decrements the front chunk, notifies the listener, and on chunk
    /// expiry persists progress, pops the chunk, and fires the completion
    /// notification. Emptying the queue rebuilds the session and reports
    /// [`TickOutcome::SessionComplete`].
    ///
    /// # Errors
    /// Returns `EmptySession` on an invariant violation (see
    /// [`current_chunk`](Self::current_chunk)).
    pub fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        let chunk = self.session.front_mut().ok_or(EngineError::EmptySession)?;
        chunk.tick();
        let snapshot = chunk.clone();
        self.listener.on_tick(&snapshot);

        if !snapshot.is_done() {
            return Ok(TickOutcome::Running);
        }

        self.save_progress(&snapshot);
        self.session.pop_front();
        self.listener.on_chunk_complete();

        if self.session.is_empty() {
            self.complete_session()?;
            return Ok(TickOutcome::SessionComplete);
        }
        Ok(TickOutcome::ChunkComplete)
    }

    /// Skip the current chunk, persisting the time actually spent on it.
    ///
    /// Pops the front chunk unconditionally, even with time remaining, and
    /// snaps the display to the next chunk's full length. Skipping the last
    /// chunk completes the session. The running timer is not stopped unless
    /// the session completed.
    ///
    /// # Errors
    /// Returns `EmptySession` on an invariant violation.
    pub fn skip(&mut self) -> Result<TickOutcome, EngineError> {
        let chunk = self
            .session
            .front()
            .ok_or(EngineError::EmptySession)?
            .clone();
        self.save_progress(&chunk);
        self.session.pop_front();

        if self.session.is_empty() {
            self.complete_session()?;
            return Ok(TickOutcome::SessionComplete);
        }

        let front = self.current_chunk()?.clone();
        self.listener.on_chunk_reset(&front);
        Ok(TickOutcome::Running)
    }

    /// Terminate the session early: persist partial progress on the current
    /// chunk and rebuild a brand-new session from current settings.
    ///
    /// The driving service stops the tick source before calling this.
    ///
    /// # Errors
    /// Returns `EmptySession` on an invariant violation, or an invalid-plan
    /// error if current settings cannot build a session.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        let chunk = self
            .session
            .front()
            .ok_or(EngineError::EmptySession)?
            .clone();
        self.save_progress(&chunk);
        self.complete_session()
    }

    /// Re-map every remaining chunk to the new kind-matched length from
    /// current settings, preserving queue order and position. Progress on
    /// the current chunk is discarded, not rescaled.
    ///
    /// # Errors
    /// Returns an invalid-plan error if the new settings are degenerate;
    /// the queue is left untouched in that case.
    pub fn settings_changed(&mut self) -> Result<(), EngineError> {
        let plan = SessionPlan::from_settings(&*self.settings);
        self.session.remap(&plan)?;
        let front = self.current_chunk()?.clone();
        self.listener.on_chunk_reset(&front);
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Rebuild a fresh session from current settings and notify the
    /// listener: first the display snap to the new front chunk, then the
    /// session-complete notification.
    fn complete_session(&mut self) -> Result<(), EngineError> {
        self.session = Session::build(&SessionPlan::from_settings(&*self.settings))?;
        let front = self.current_chunk()?.clone();
        self.listener.on_chunk_reset(&front);
        self.listener.on_session_complete();
        Ok(())
    }

    /// Persist progress for a chunk. Only Work chunks are recorded; a chunk
    /// that finished naturally records its full length, an interrupted one
    /// records the time actually spent.
    ///
    /// The record is attributed to whichever subject is selected right now,
    /// and a store failure is logged rather than allowed to disturb the
    /// queue or the tick cadence.
    fn save_progress(&self, chunk: &TimeChunk) {
        if !chunk.kind.is_work() {
            return;
        }
        let seconds = if chunk.is_done() {
            chunk.total_secs()
        } else {
            chunk.elapsed_secs()
        };
        let Some(subject) = self.settings.selected_subject() else {
            log::warn!("no subject selected; dropping {seconds}s work record");
            return;
        };
        if let Err(e) = self.store.record_progress(&subject, seconds, Utc::now()) {
            log::warn!("failed to record {seconds}s for '{subject}': {e}");
        }
    }
}
