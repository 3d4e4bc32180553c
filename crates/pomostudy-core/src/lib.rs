//! # Pomostudy Core Library
//!
//! Core business logic for Pomostudy, a Pomodoro-style study timer that
//! attributes work time to named subjects. All operations are available
//! through a standalone CLI binary built on this library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a synchronous state machine over an ordered chunk
//!   queue; a tokio-backed [`TimerService`] drives it with a repeating
//!   one-second tick
//! - **Storage**: SQLite-backed subject and study-record storage plus
//!   TOML-based configuration
//! - **Statistics**: per-subject and per-day study-time aggregation
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: core timer state machine
//! - [`TimerService`]: tick scheduling, start/stop lifecycle
//! - [`Database`]: subject and study-record persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, EngineError};
pub use storage::{Config, Database, DailyTotal, SettingsHandle, StudyRecord, Subject, SubjectTotal};
pub use timer::{
    ChunkKind, ProgressStore, Session, SessionEngine, SessionListener, SessionPlan,
    SettingsProvider, TickOutcome, TimeChunk, TimerService,
};
