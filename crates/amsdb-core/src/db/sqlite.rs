use super::row::{AtomsRow, KeyValue, RESERVED_KEYS};
use super::{AtomsDatabase, DbError, schema};
use crate::core::models::atoms::Atoms;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Atoms database stored in a single SQLite file.
pub struct SqliteDatabase {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteDatabase {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DbError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let conn = Connection::open(path)?;
        schema::init_schema(&conn)?;
        debug!("Opened atoms database at {:?}", path);
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }
}

struct StoredRow {
    id: i64,
    unique_id: String,
    ctime: f64,
    user: String,
    atoms: String,
    calculator: Option<String>,
    calculator_parameters: Option<String>,
    energy: Option<f64>,
    forces: Option<String>,
    stress: Option<String>,
    charges: Option<String>,
    key_value_pairs: String,
    data: String,
}

fn to_json_opt<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>, DbError> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(DbError::from)
}

fn from_json_opt<T: serde::de::DeserializeOwned>(
    text: Option<String>,
) -> Result<Option<T>, DbError> {
    text.map(|t| serde_json::from_str(&t))
        .transpose()
        .map_err(DbError::from)
}

impl StoredRow {
    fn into_row(self) -> Result<AtomsRow, DbError> {
        let atoms: Atoms = serde_json::from_str(&self.atoms)?;
        let key_value_pairs: BTreeMap<String, KeyValue> =
            serde_json::from_str(&self.key_value_pairs)?;
        let data: Map<String, Value> = serde_json::from_str(&self.data)?;
        Ok(AtomsRow {
            id: Some(self.id),
            unique_id: self.unique_id,
            ctime: self.ctime,
            user: self.user,
            atoms,
            calculator: self.calculator,
            calculator_parameters: from_json_opt(self.calculator_parameters)?,
            energy: self.energy,
            forces: from_json_opt(self.forces)?,
            stress: from_json_opt(self.stress)?,
            charges: from_json_opt(self.charges)?,
            key_value_pairs,
            data,
        })
    }
}

impl AtomsDatabase for SqliteDatabase {
    fn write(&mut self, row: AtomsRow) -> Result<i64, DbError> {
        if let Some(key) = row
            .key_value_pairs
            .keys()
            .find(|k| RESERVED_KEYS.contains(&k.as_str()))
        {
            return Err(DbError::ReservedKey(key.clone()));
        }

        let atoms = serde_json::to_string(&row.atoms)?;
        let key_value_pairs = serde_json::to_string(&row.key_value_pairs)?;
        let data = serde_json::to_string(&row.data)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO systems (
                unique_id, ctime, user, natoms, formula, atoms, calculator,
                calculator_parameters, energy, forces, stress, charges,
                key_value_pairs, data
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                row.unique_id,
                row.ctime,
                row.user,
                row.natoms() as i64,
                row.formula(),
                atoms,
                row.calculator,
                to_json_opt(&row.calculator_parameters)?,
                row.energy,
                to_json_opt(&row.forces)?,
                to_json_opt(&row.stress)?,
                to_json_opt(&row.charges)?,
                key_value_pairs,
                data,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (key, value) in &row.key_value_pairs {
            tx.execute(
                "INSERT INTO keys (key, id) VALUES (?1, ?2)",
                params![key, id],
            )?;
            match value {
                KeyValue::Text(text) => {
                    tx.execute(
                        "INSERT INTO text_key_values (key, value, id) VALUES (?1, ?2, ?3)",
                        params![key, text, id],
                    )?;
                }
                other => {
                    if let Some(number) = other.as_number() {
                        tx.execute(
                            "INSERT INTO number_key_values (key, value, id) VALUES (?1, ?2, ?3)",
                            params![key, number, id],
                        )?;
                    }
                }
            }
        }
        tx.commit()?;

        info!("Wrote row {} ({})", id, row.formula());
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<AtomsRow, DbError> {
        let stored = self
            .conn
            .query_row(
                r#"
                SELECT id, unique_id, ctime, user, atoms, calculator,
                       calculator_parameters, energy, forces, stress, charges,
                       key_value_pairs, data
                FROM systems WHERE id = ?1
                "#,
                params![id],
                |r| {
                    Ok(StoredRow {
                        id: r.get(0)?,
                        unique_id: r.get(1)?,
                        ctime: r.get(2)?,
                        user: r.get(3)?,
                        atoms: r.get(4)?,
                        calculator: r.get(5)?,
                        calculator_parameters: r.get(6)?,
                        energy: r.get(7)?,
                        forces: r.get(8)?,
                        stress: r.get(9)?,
                        charges: r.get(10)?,
                        key_value_pairs: r.get(11)?,
                        data: r.get(12)?,
                    })
                },
            )
            .optional()?
            .ok_or(DbError::NotFound(id))?;
        stored.into_row()
    }

    fn count(&self) -> Result<usize, DbError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM systems", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    fn last_id(&self) -> Result<Option<i64>, DbError> {
        let id: Option<i64> = self
            .conn
            .query_row("SELECT MAX(id) FROM systems", [], |r| r.get(0))?;
        Ok(id)
    }

    fn distinct_values(&self, key: &str) -> Result<Vec<String>, DbError> {
        let mut values: Vec<String> = match key {
            "user" | "calculator" | "formula" => {
                let sql = format!(
                    "SELECT DISTINCT {key} FROM systems WHERE {key} IS NOT NULL",
                    key = key
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let values = stmt
                    .query_map([], |r| r.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                values
            }
            _ => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT DISTINCT value FROM text_key_values WHERE key = ?1")?;
                let mut values = stmt
                    .query_map(params![key], |r| r.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut stmt = self
                    .conn
                    .prepare("SELECT DISTINCT value FROM number_key_values WHERE key = ?1")?;
                let numbers = stmt
                    .query_map(params![key], |r| r.get::<_, f64>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                values.extend(numbers.into_iter().map(|n| n.to_string()));
                values
            }
        };
        values.sort();
        values.dedup();
        Ok(values)
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Point3};
    use serde_json::json;
    use tempfile::tempdir;

    fn lif_row(user: &str, task: &str) -> AtomsRow {
        let atoms = Atoms::new(
            vec!["Li".into(), "F".into(), "Li".into(), "F".into()],
            vec![
                Point3::origin(),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
            ],
        )
        .unwrap()
        .with_cell(Matrix3::identity() * 4.0, [true; 3]);
        let mut row = AtomsRow::new(atoms, user, 23.0);
        row.set("task", task);
        row.set("success", true);
        row.set("band_gap", 8.7);
        row
    }

    #[test]
    fn ids_are_monotonic_and_rows_round_trip() {
        let mut db = SqliteDatabase::in_memory().unwrap();
        assert_eq!(db.last_id().unwrap(), None);

        let mut first = lif_row("alice", "single point");
        first.energy = Some(-19.2);
        first.stress = Some([1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        first.calculator = Some("ams/band".into());
        first.calculator_parameters = Some(json!({"input": {"ams": {"Task": "SinglePoint"}}}));
        first
            .data
            .insert("DOS".into(), json!({"Energy [eV]": [0.0, 1.0]}));
        let id1 = db.write(first.clone()).unwrap();
        let id2 = db.write(lif_row("bob", "optimization")).unwrap();

        assert!(id2 > id1);
        assert_eq!(db.count().unwrap(), 2);
        assert_eq!(db.last_id().unwrap(), Some(id2));

        let back = db.get(id1).unwrap();
        assert_eq!(back.id, Some(id1));
        assert_eq!(back.formula(), "Li2F2");
        assert_eq!(back.atoms, first.atoms);
        assert_eq!(back.energy, Some(-19.2));
        assert_eq!(back.stress, first.stress);
        assert_eq!(back.calculator_parameters, first.calculator_parameters);
        assert_eq!(back.get("success"), Some(&KeyValue::Bool(true)));
        assert_eq!(back.get("band_gap"), Some(&KeyValue::Float(8.7)));
        assert_eq!(back.data["DOS"]["Energy [eV]"], json!([0.0, 1.0]));
    }

    #[test]
    fn missing_row_is_not_found() {
        let db = SqliteDatabase::in_memory().unwrap();
        assert!(matches!(db.get(42), Err(DbError::NotFound(42))));
    }

    #[test]
    fn reserved_keys_are_rejected_without_writing() {
        let mut db = SqliteDatabase::in_memory().unwrap();
        let mut row = lif_row("alice", "sp");
        row.set("energy", 1.0);
        assert!(matches!(db.write(row), Err(DbError::ReservedKey(k)) if k == "energy"));
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn distinct_values_cover_columns_and_attributes() {
        let mut db = SqliteDatabase::in_memory().unwrap();
        db.write(lif_row("bob", "optimization")).unwrap();
        db.write(lif_row("alice", "single point")).unwrap();
        db.write(lif_row("alice", "optimization")).unwrap();

        assert_eq!(db.distinct_values("user").unwrap(), vec!["alice", "bob"]);
        assert_eq!(
            db.distinct_values("task").unwrap(),
            vec!["optimization", "single point"]
        );
        assert_eq!(db.distinct_values("band_gap").unwrap(), vec!["8.7"]);
        assert!(db.distinct_values("used_in").unwrap().is_empty());
    }

    #[test]
    fn file_database_persists_between_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("LiF.db");
        {
            let mut db = SqliteDatabase::open(&path).unwrap();
            db.write(lif_row("alice", "sp")).unwrap();
            assert_eq!(db.path(), Some(path.as_path()));
        }
        let db = SqliteDatabase::open(&path).unwrap();
        assert_eq!(db.count().unwrap(), 1);
        assert_eq!(db.get(1).unwrap().user, "alice");
    }
}
