use std::io::Write;
use std::sync::{Arc, Mutex};

use clap::Subcommand;
use pomostudy_core::storage::{Config, Database, SettingsHandle};
use pomostudy_core::{
    Session, SessionEngine, SessionListener, SessionPlan, TimeChunk, TimerService,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run one full session in the foreground
    Run {
        /// Subject to attribute work time to (persisted as the selection)
        #[arg(long)]
        subject: Option<String>,
    },
    /// Print the session the current config would build, as JSON
    Plan,
}

/// Prints the countdown in place and rings the terminal bell when a chunk
/// completes on its own.
struct ConsoleListener {
    bell: bool,
}

impl SessionListener for ConsoleListener {
    fn on_tick(&self, chunk: &TimeChunk) {
        print!(
            "\r{:<12} {} remaining ",
            chunk.kind.label(),
            format_clock(chunk.remaining_secs())
        );
        let _ = std::io::stdout().flush();
    }

    fn on_chunk_reset(&self, chunk: &TimeChunk) {
        println!(
            "\nup next: {} ({})",
            chunk.kind.label(),
            format_clock(chunk.total_secs())
        );
    }

    fn on_session_complete(&self) {
        println!("session complete");
    }

    fn on_chunk_complete(&self) {
        if self.bell {
            print!("\x07");
        }
        println!("\nchunk complete");
    }
}

fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run { subject } => run_session(subject),
        TimerAction::Plan => print_plan(),
    }
}

fn print_plan() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let settings = SettingsHandle::new(config);
    let session = Session::build(&SessionPlan::from_settings(&settings))?;
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

fn run_session(subject: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(name) = subject {
        config.selected_subject = Some(name);
        config.save()?;
    }
    let Some(selected) = config.selected_subject.clone() else {
        return Err("no subject selected; pass --subject or set selected_subject".into());
    };
    let bell = config.notifications.enabled && config.notifications.terminal_bell;

    let settings = Arc::new(SettingsHandle::new(config));
    let store = Arc::new(Mutex::new(Database::open()?));
    let listener = Arc::new(ConsoleListener { bell });
    let engine = SessionEngine::new(settings, store, listener)?;
    let service = TimerService::new(engine);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let first = service.current_chunk().await?;
        println!(
            "studying '{selected}' since {} -- first chunk: {} ({})",
            chrono::Local::now().format("%H:%M:%S"),
            first.kind.label(),
            format_clock(first.total_secs())
        );
        service.start().await;
        service.wait().await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
