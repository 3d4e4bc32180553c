use clap::Subcommand;
use pomostudy_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// All-time study total
    Total,
    /// Per-subject totals, most-studied first
    Subjects,
    /// Daily totals for the trailing seven days
    Week,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Total => {
            let total = db.total_study_secs()?;
            let json = serde_json::json!({ "total_study_secs": total });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        StatsAction::Subjects => {
            let totals = db.subject_totals()?;
            println!("{}", serde_json::to_string_pretty(&totals)?);
        }
        StatsAction::Week => {
            let totals = db.daily_totals(7)?;
            println!("{}", serde_json::to_string_pretty(&totals)?);
        }
    }
    Ok(())
}
