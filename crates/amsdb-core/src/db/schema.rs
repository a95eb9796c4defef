//! SQLite schema of the atoms database.

use super::DbError;
use rusqlite::{Connection, params};

pub const SCHEMA_VERSION: i64 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), DbError> {
    // One row per stored structure
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS systems (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            unique_id TEXT UNIQUE NOT NULL,
            ctime REAL NOT NULL,
            user TEXT NOT NULL,
            natoms INTEGER NOT NULL,
            formula TEXT NOT NULL,
            atoms TEXT NOT NULL,            -- JSON
            calculator TEXT,
            calculator_parameters TEXT,     -- JSON
            energy REAL,
            forces TEXT,                    -- JSON
            stress TEXT,                    -- JSON
            charges TEXT,                   -- JSON
            key_value_pairs TEXT NOT NULL,  -- JSON
            data TEXT NOT NULL              -- JSON
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS keys (
            key TEXT NOT NULL,
            id INTEGER NOT NULL,
            FOREIGN KEY(id) REFERENCES systems(id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS text_key_values (
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            id INTEGER NOT NULL,
            FOREIGN KEY(id) REFERENCES systems(id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS number_key_values (
            key TEXT NOT NULL,
            value REAL NOT NULL,
            id INTEGER NOT NULL,
            FOREIGN KEY(id) REFERENCES systems(id)
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS information (name TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO information (name, value) VALUES ('version', ?1)",
        params![SCHEMA_VERSION.to_string()],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_systems_user ON systems(user)",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_keys ON keys(key)", [])?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_text_key_values ON text_key_values(key, value)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_number_key_values ON number_key_values(key, value)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in ["systems", "keys", "text_key_values", "number_key_values"] {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        assert!(init_schema(&conn).is_ok());

        let version: String = conn
            .query_row(
                "SELECT value FROM information WHERE name = 'version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, "1");
    }
}
