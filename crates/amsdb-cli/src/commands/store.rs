use crate::cli::StoreArgs;
use crate::config::build_store_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use amsdb::db::sqlite::SqliteDatabase;
use amsdb::engine::progress::ProgressReporter;
use amsdb::workflows::store::store_jobs;
use colored::Colorize;
use std::path::Path;
use tracing::info;

pub fn run(args: StoreArgs, config_path: Option<&Path>) -> Result<()> {
    let config = build_store_config(&args, config_path)?;
    info!("Opening atoms database at {:?}", &args.db);
    let mut db = SqliteDatabase::open(&args.db)?;

    let progress_handler = CliProgressHandler::new(args.jobs.len() > 1, config.report);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Storing {} job(s)...", args.jobs.len());
    let outcomes = store_jobs(
        &mut db,
        &args.jobs,
        &config.request,
        &config.parser,
        &reporter,
    )?;

    let rows: usize = outcomes
        .iter()
        .map(|o| 1 + usize::from(o.initial_configuration.is_some()))
        .sum();
    println!(
        "{} Stored {} row(s) from {} job(s) in {}",
        "✓".green(),
        rows,
        outcomes.len(),
        args.db.display()
    );
    Ok(())
}
