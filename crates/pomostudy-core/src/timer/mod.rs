mod chunk;
mod engine;
mod service;
mod session;

pub use chunk::{ChunkKind, TimeChunk};
pub use engine::{
    ProgressStore, SessionEngine, SessionListener, SettingsProvider, TickOutcome,
};
pub use service::TimerService;
pub use session::{Session, SessionPlan};
