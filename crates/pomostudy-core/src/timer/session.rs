use std::collections::VecDeque;

use serde::Serialize;

use super::chunk::{ChunkKind, TimeChunk};
use crate::error::EngineError;

/// The four configured values a session is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionPlan {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    pub pair_count: u32,
}

impl SessionPlan {
    /// Reject degenerate plans before any chunk is built.
    ///
    /// # Errors
    /// Returns an error if the pair count is zero or any duration is zero.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.pair_count < 1 {
            return Err(EngineError::InvalidPairCount(self.pair_count));
        }
        if self.work_secs == 0 {
            return Err(EngineError::InvalidDuration { kind: "work" });
        }
        if self.short_break_secs == 0 {
            return Err(EngineError::InvalidDuration { kind: "short break" });
        }
        if self.long_break_secs == 0 {
            return Err(EngineError::InvalidDuration { kind: "long break" });
        }
        Ok(())
    }

    fn secs_for(&self, kind: ChunkKind) -> u64 {
        match kind {
            ChunkKind::Work => self.work_secs,
            ChunkKind::ShortBreak => self.short_break_secs,
            ChunkKind::LongBreak => self.long_break_secs,
        }
    }
}

/// An ordered sequence of chunks making up one full work/break cycle.
///
/// For a plan with N pairs the layout is
/// `[Work, ShortBreak] * (N-1) ++ [Work, LongBreak]`, 2N chunks total.
/// The queue is only ever consumed from the front; an empty queue is the
/// "session complete" condition and is resolved by rebuilding wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    chunks: VecDeque<TimeChunk>,
}

impl Session {
    /// Build a fresh session from a plan.
    ///
    /// # Errors
    /// Returns an error if the plan does not validate.
    pub fn build(plan: &SessionPlan) -> Result<Self, EngineError> {
        plan.validate()?;
        let pairs = plan.pair_count as usize;
        let mut chunks = VecDeque::with_capacity(pairs * 2);
        for i in 1..=pairs {
            chunks.push_back(TimeChunk::new(ChunkKind::Work, plan.work_secs));
            let break_kind = if i < pairs {
                ChunkKind::ShortBreak
            } else {
                ChunkKind::LongBreak
            };
            chunks.push_back(TimeChunk::new(break_kind, plan.secs_for(break_kind)));
        }
        Ok(Self { chunks })
    }

    pub fn front(&self) -> Option<&TimeChunk> {
        self.chunks.front()
    }

    pub(crate) fn front_mut(&mut self) -> Option<&mut TimeChunk> {
        self.chunks.front_mut()
    }

    pub(crate) fn pop_front(&mut self) -> Option<TimeChunk> {
        self.chunks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TimeChunk> {
        self.chunks.iter()
    }

    /// Re-map every remaining chunk to its kind-matched length from a new
    /// plan, preserving order and position. Each remapped chunk restarts at
    /// its full new length; partial progress on the front chunk is
    /// discarded, not rescaled.
    ///
    /// # Errors
    /// Returns an error if the new plan does not validate. The queue is
    /// left untouched in that case.
    pub(crate) fn remap(&mut self, plan: &SessionPlan) -> Result<(), EngineError> {
        plan.validate()?;
        for chunk in self.chunks.iter_mut() {
            *chunk = TimeChunk::new(chunk.kind, plan.secs_for(chunk.kind));
        }
        Ok(())
    }
}
