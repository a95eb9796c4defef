use crate::cli::MetadataArgs;
use crate::error::{CliError, Result};
use crate::prompt::TerminalPrompter;
use amsdb::db::sqlite::SqliteDatabase;
use amsdb::metadata::prompt::{Prompter, ScriptedPrompter};
use amsdb::metadata::reconcile::reconcile;
use colored::Colorize;
use tracing::info;

pub fn run(args: MetadataArgs) -> Result<()> {
    if !args.db.exists() {
        return Err(CliError::Argument(format!(
            "database '{}' does not exist",
            args.db.display()
        )));
    }
    let db = SqliteDatabase::open(&args.db)?;

    let mut prompter: Box<dyn Prompter> = match &args.answers {
        Some(path) => {
            info!("Reading metadata answers from {:?}", path);
            let text = std::fs::read_to_string(path)?;
            Box::new(ScriptedPrompter::from_lines(&text))
        }
        None => Box::new(TerminalPrompter),
    };

    let summary = reconcile(&db, prompter.as_mut())?;
    if summary.is_unchanged() {
        println!("{} Metadata already describes every value", "✓".green());
    } else {
        for (key, values) in &summary.added {
            println!(
                "{} Described {} new value(s) of `{}`: {}",
                "✓".green(),
                values.len(),
                key,
                values.join(", ")
            );
        }
    }
    println!("  Rows: {}", summary.rows);
    Ok(())
}
