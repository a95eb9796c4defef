use crate::cli::ShowArgs;
use crate::error::{CliError, Result};
use amsdb::db::AtomsDatabase;
use amsdb::db::report::row_info;
use amsdb::db::sqlite::SqliteDatabase;
use tracing::info;

pub fn run(args: ShowArgs) -> Result<()> {
    if !args.db.exists() {
        return Err(CliError::Argument(format!(
            "database '{}' does not exist",
            args.db.display()
        )));
    }
    let db = SqliteDatabase::open(&args.db)?;
    let id = match args.id {
        Some(id) => id,
        None => db
            .last_id()?
            .ok_or_else(|| CliError::Argument("the database has no rows".to_string()))?,
    };
    info!("Showing row {} of {:?}", id, &args.db);
    println!("{}", row_info(&db.get(id)?));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_database_has_no_row_to_show() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("empty.db");
        SqliteDatabase::open(&db_path).unwrap();
        let result = run(ShowArgs {
            db: db_path,
            id: None,
        });
        assert!(matches!(result, Err(CliError::Argument(msg)) if msg.contains("no rows")));
    }

    #[test]
    fn unknown_id_is_reported() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("empty.db");
        SqliteDatabase::open(&db_path).unwrap();
        let result = run(ShowArgs {
            db: db_path,
            id: Some(3),
        });
        assert!(matches!(result, Err(CliError::Database(_))));
    }
}
