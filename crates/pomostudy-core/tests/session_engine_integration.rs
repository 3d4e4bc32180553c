//! Integration tests for the session engine.
//!
//! Exercises the full workflow from ticking through a session to committed
//! study records, using the real SQLite store and the shared settings
//! handle instead of per-module fakes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pomostudy_core::storage::{Config, Database, SettingsHandle};
use pomostudy_core::{ChunkKind, SessionEngine, SessionListener, TickOutcome, TimeChunk};

#[derive(Default)]
struct CountingListener {
    ticks: AtomicUsize,
    resets: AtomicUsize,
    chunk_completes: AtomicUsize,
    session_completes: AtomicUsize,
}

impl SessionListener for CountingListener {
    fn on_tick(&self, _chunk: &TimeChunk) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
    fn on_chunk_reset(&self, _chunk: &TimeChunk) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
    fn on_session_complete(&self) {
        self.session_completes.fetch_add(1, Ordering::SeqCst);
    }
    fn on_chunk_complete(&self) {
        self.chunk_completes.fetch_add(1, Ordering::SeqCst);
    }
}

fn test_settings(work_min: u64, short_min: u64, long_min: u64, pairs: u32) -> Arc<SettingsHandle> {
    let mut config = Config::default();
    config.timer.work_minutes = work_min;
    config.timer.short_break_minutes = short_min;
    config.timer.long_break_minutes = long_min;
    config.timer.pair_count = pairs;
    config.selected_subject = Some("maths".into());
    Arc::new(SettingsHandle::new(config))
}

struct World {
    settings: Arc<SettingsHandle>,
    store: Arc<Mutex<Database>>,
    listener: Arc<CountingListener>,
    engine: SessionEngine,
}

fn world(work_min: u64, short_min: u64, long_min: u64, pairs: u32) -> World {
    let settings = test_settings(work_min, short_min, long_min, pairs);
    let store = Arc::new(Mutex::new(Database::open_memory().unwrap()));
    let listener = Arc::new(CountingListener::default());
    let engine =
        SessionEngine::new(settings.clone(), store.clone(), listener.clone()).unwrap();
    World {
        settings,
        store,
        listener,
        engine,
    }
}

#[test]
fn default_plan_builds_standard_pomodoro_session() {
    let w = world(25, 5, 15, 4);
    let kinds: Vec<ChunkKind> = w.engine.session().chunks().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChunkKind::Work,
            ChunkKind::ShortBreak,
            ChunkKind::Work,
            ChunkKind::ShortBreak,
            ChunkKind::Work,
            ChunkKind::ShortBreak,
            ChunkKind::Work,
            ChunkKind::LongBreak,
        ]
    );
    assert_eq!(w.engine.current_chunk().unwrap().total_secs(), 25 * 60);
}

#[test]
fn full_session_commits_one_record_per_work_chunk() {
    // 1-minute chunks keep the tick counts manageable: [W60, S60, W60, L60].
    let mut w = world(1, 1, 1, 2);
    let mut session_completes = 0;
    for _ in 0..240 {
        if w.engine.tick().unwrap() == TickOutcome::SessionComplete {
            session_completes += 1;
        }
    }

    assert_eq!(session_completes, 1);
    assert_eq!(w.listener.session_completes.load(Ordering::SeqCst), 1);
    assert_eq!(w.listener.chunk_completes.load(Ordering::SeqCst), 4);
    assert_eq!(w.listener.ticks.load(Ordering::SeqCst), 240);

    let db = w.store.lock().unwrap();
    assert_eq!(db.total_study_secs().unwrap(), 120);
    let records = db.records_for_subject("maths").unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.seconds == 60));
}

#[test]
fn skip_commits_partial_time_and_breaks_commit_nothing() {
    let mut w = world(25, 5, 15, 4);
    for _ in 0..90 {
        w.engine.tick().unwrap();
    }
    w.engine.skip().unwrap(); // 90s of work committed
    w.engine.skip().unwrap(); // short break, nothing committed

    let db = w.store.lock().unwrap();
    assert_eq!(db.total_study_secs().unwrap(), 90);
    assert_eq!(db.records_for_subject("maths").unwrap().len(), 1);
}

#[test]
fn reset_commits_partial_time_and_rebuilds_from_settings() {
    let mut w = world(25, 5, 15, 4);
    for _ in 0..60 {
        w.engine.tick().unwrap();
    }
    w.engine.reset().unwrap();

    assert_eq!(w.engine.session().len(), 8);
    assert_eq!(w.engine.current_chunk().unwrap().remaining_secs(), 25 * 60);
    let db = w.store.lock().unwrap();
    assert_eq!(db.total_study_secs().unwrap(), 60);
}

#[test]
fn settings_change_mid_session_remaps_remaining_chunks() {
    let mut w = world(25, 5, 15, 4);
    for _ in 0..120 {
        w.engine.tick().unwrap();
    }

    w.settings.update(|cfg| cfg.timer.work_minutes = 30);
    w.engine.settings_changed().unwrap();

    let front = w.engine.current_chunk().unwrap();
    assert_eq!(front.kind, ChunkKind::Work);
    assert_eq!(front.total_secs(), 30 * 60);
    assert_eq!(front.remaining_secs(), 30 * 60);
    for chunk in w.engine.session().chunks() {
        if chunk.kind == ChunkKind::Work {
            assert_eq!(chunk.total_secs(), 30 * 60);
        }
    }
    assert_eq!(w.listener.resets.load(Ordering::SeqCst), 1);
}

#[test]
fn subject_switch_mid_session_attributes_to_current_selection() {
    let mut w = world(1, 1, 1, 2);
    for _ in 0..60 {
        w.engine.tick().unwrap(); // first work chunk -> maths
    }
    w.settings.update(|cfg| cfg.selected_subject = Some("physics".into()));
    for _ in 0..120 {
        w.engine.tick().unwrap(); // break + second work chunk -> physics
    }

    let db = w.store.lock().unwrap();
    assert_eq!(db.records_for_subject("maths").unwrap().len(), 1);
    assert_eq!(db.records_for_subject("physics").unwrap().len(), 1);
    let totals = db.subject_totals().unwrap();
    assert_eq!(totals.len(), 2);
}

#[test]
fn recorded_progress_feeds_daily_stats() {
    let mut w = world(1, 1, 1, 1);
    for _ in 0..60 {
        w.engine.tick().unwrap();
    }

    let db = w.store.lock().unwrap();
    let week = db.daily_totals(7).unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week[6].seconds, 60);
    assert_eq!(week.iter().take(6).map(|d| d.seconds).sum::<u64>(), 0);
}
