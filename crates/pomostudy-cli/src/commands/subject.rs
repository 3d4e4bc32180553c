use clap::Subcommand;
use pomostudy_core::storage::{Config, Database};

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject to study
    Add {
        /// Subject name
        name: String,
    },
    /// List all subjects
    List,
    /// Rename a subject, keeping its records
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },
    /// Remove a subject and all of its records
    Remove {
        /// Subject name
        name: String,
    },
    /// Select the subject new work time is attributed to
    Select {
        /// Subject name
        name: String,
    },
    /// List recorded study sessions for a subject
    Records {
        /// Subject name
        name: String,
    },
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SubjectAction::Add { name } => {
            let subject = db.add_subject(&name)?;
            println!("subject added: {}", subject.name);
        }
        SubjectAction::List => {
            let subjects = db.list_subjects()?;
            println!("{}", serde_json::to_string_pretty(&subjects)?);
        }
        SubjectAction::Rename { old, new } => {
            db.rename_subject(&old, &new)?;
            println!("subject renamed: {old} -> {new}");
        }
        SubjectAction::Remove { name } => {
            db.delete_subject(&name)?;
            println!("subject removed: {name}");
        }
        SubjectAction::Select { name } => {
            // Resolve get-or-create so selecting a fresh name just works.
            let subject = db.fetch_subject(&name)?;
            let mut config = Config::load()?;
            config.selected_subject = Some(subject.name.clone());
            config.save()?;
            println!("selected subject: {}", subject.name);
        }
        SubjectAction::Records { name } => {
            let records = db.records_for_subject(&name)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
