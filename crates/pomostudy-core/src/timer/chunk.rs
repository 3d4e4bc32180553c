use serde::Serialize;

/// The kind of a countdown interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl ChunkKind {
    pub fn is_work(self) -> bool {
        self == ChunkKind::Work
    }

    pub fn label(self) -> &'static str {
        match self {
            ChunkKind::Work => "Work",
            ChunkKind::ShortBreak => "Short Break",
            ChunkKind::LongBreak => "Long Break",
        }
    }
}

/// One countdown interval in a session.
///
/// `total_secs` is fixed when the chunk is created; `remaining_secs` counts
/// down one second per tick and is clamped at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeChunk {
    pub kind: ChunkKind,
    total_secs: u64,
    remaining_secs: u64,
}

impl TimeChunk {
    pub fn new(kind: ChunkKind, total_secs: u64) -> Self {
        Self {
            kind,
            total_secs,
            remaining_secs: total_secs,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Seconds actually spent on this chunk so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs - self.remaining_secs
    }

    pub fn is_done(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Decrement the countdown by one second, clamped at zero.
    ///
    /// The clamp keeps a delayed or duplicate tick from driving the
    /// countdown negative while completion handling is still in flight.
    pub(crate) fn tick(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_starts_full() {
        let chunk = TimeChunk::new(ChunkKind::Work, 1500);
        assert_eq!(chunk.total_secs(), 1500);
        assert_eq!(chunk.remaining_secs(), 1500);
        assert_eq!(chunk.elapsed_secs(), 0);
        assert!(!chunk.is_done());
    }

    #[test]
    fn tick_decrements_by_one() {
        let mut chunk = TimeChunk::new(ChunkKind::ShortBreak, 300);
        chunk.tick();
        assert_eq!(chunk.remaining_secs(), 299);
        assert_eq!(chunk.elapsed_secs(), 1);
    }

    #[test]
    fn tick_clamps_at_zero() {
        let mut chunk = TimeChunk::new(ChunkKind::Work, 1);
        chunk.tick();
        assert!(chunk.is_done());
        chunk.tick();
        assert_eq!(chunk.remaining_secs(), 0);
        assert_eq!(chunk.elapsed_secs(), 1);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ChunkKind::Work.label(), "Work");
        assert_eq!(ChunkKind::ShortBreak.label(), "Short Break");
        assert_eq!(ChunkKind::LongBreak.label(), "Long Break");
        assert!(ChunkKind::Work.is_work());
        assert!(!ChunkKind::LongBreak.is_work());
    }
}
