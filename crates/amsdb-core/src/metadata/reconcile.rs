use super::MetadataError;
use super::document::{MetadataDocument, sidecar_paths};
use super::prompt::Prompter;
use crate::db::AtomsDatabase;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Keys whose values must all be described in the metadata document.
pub const RECONCILED_KEYS: [&str; 4] = ["user", "subset_name", "task", "used_in"];

pub const USER_FIELDS: [&str; 5] = ["name", "surname", "email", "institution", "country"];

/// Values added to the document, per key, in reconciliation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: BTreeMap<String, Vec<String>>,
    pub rows: usize,
}

impl ReconcileSummary {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

/// Values of `key` that the document does not describe yet.
pub fn new_values(doc: &MetadataDocument, key: &str, values: &[String]) -> Vec<String> {
    let known = doc.values(key);
    values
        .iter()
        .filter(|v| !known.is_some_and(|k| k.contains_key(v.as_str())))
        .cloned()
        .collect()
}

fn description(
    prompter: &mut dyn Prompter,
    key: &str,
    value: &str,
    mandatory: bool,
) -> Result<Value, MetadataError> {
    let label = if mandatory {
        format!("`{}` description", value)
    } else {
        format!("`{}` description [None]", value)
    };
    match prompter.ask(&label, mandatory)? {
        Some(text) => Ok(Value::String(text)),
        None if mandatory => Err(MetadataError::MandatoryDescription {
            key: key.to_string(),
            value: value.to_string(),
        }),
        None => Ok(Value::Null),
    }
}

/// Asks the prompter to describe each of `values` and records the answers.
///
/// Users get a profile of five optional fields, tasks an optional description,
/// subsets and dataset usages a mandatory one. The document is left untouched
/// when a question fails.
pub fn add_new_values(
    doc: &mut MetadataDocument,
    key: &str,
    values: &[String],
    prompter: &mut dyn Prompter,
) -> Result<(), MetadataError> {
    let (intro, mandatory) = match key {
        "user" => ("", false),
        "subset_name" => ("Please add the description of the new subset of simulation", true),
        "task" => ("Please add the description of the new task of simulation", false),
        "used_in" => ("Please add the description of the new subset in `used_in`", true),
        other => return Err(MetadataError::UnsupportedKey(other.to_string())),
    };

    let mut updated = doc.clone();
    let entries = updated.values_mut(key)?;
    prompter.message(&format!(
        "{:=<80}",
        format!("== Updating the metadata for the new values in key `{}` ", key)
    ));
    for value in values {
        let entry = if key == "user" {
            let mut profile = Map::new();
            for field in USER_FIELDS {
                prompter.message(&format!("Please add the {} of `{}`", field, value));
                let answer = prompter.ask(&format!("`{}` {} [None]", value, field), false)?;
                profile.insert(
                    field.to_string(),
                    answer.map(Value::String).unwrap_or(Value::Null),
                );
            }
            Value::Object(profile)
        } else {
            prompter.message(intro);
            description(prompter, key, value, mandatory)?
        };
        entries.insert(value.clone(), entry);
    }
    prompter.message(&format!("{:-<80}", "-- Thanks for your input! "));

    *doc = updated;
    Ok(())
}

/// Brings the sidecar documents of `db` in line with its content.
///
/// Every distinct value of the [`RECONCILED_KEYS`] ends up described in the
/// document. Both sidecars are rewritten after each key that gained values,
/// and once more at the end with the current row count.
#[instrument(skip_all)]
pub fn reconcile(
    db: &dyn AtomsDatabase,
    prompter: &mut dyn Prompter,
) -> Result<ReconcileSummary, MetadataError> {
    let db_path = db.path().ok_or(MetadataError::NoDatabasePath)?;
    let (json_path, yaml_path) = sidecar_paths(db_path);

    let mut doc = if json_path.exists() {
        MetadataDocument::read_json(&json_path)?
    } else {
        info!("No metadata at {:?}, starting a new document", json_path);
        MetadataDocument::new()
    };
    info!("Metadata loaded");

    let mut summary = ReconcileSummary::default();
    for key in RECONCILED_KEYS {
        let values = db.distinct_values(key)?;
        let new = new_values(&doc, key, &values);
        if new.is_empty() {
            info!("No new values in key '{}'", key);
            continue;
        }
        info!("New values in key '{}': {:?}", key, new);
        add_new_values(&mut doc, key, &new, prompter)?;
        doc.write_both(&json_path, &yaml_path)?;
        summary.added.insert(key.to_string(), new);
    }

    summary.rows = db.count()?;
    doc.set_rows(summary.rows);
    doc.write_both(&json_path, &yaml_path)?;
    info!("Metadata saved for {} rows", summary.rows);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atoms::Atoms;
    use crate::db::row::AtomsRow;
    use crate::db::sqlite::SqliteDatabase;
    use crate::metadata::prompt::ScriptedPrompter;
    use nalgebra::Point3;
    use serde_json::json;
    use tempfile::tempdir;

    fn row(user: &str, subset: &str, task: &str, used_in: &str) -> AtomsRow {
        let atoms = Atoms::new(
            vec!["Li".into(), "F".into()],
            vec![Point3::origin(), Point3::new(1.6, 0.0, 0.0)],
        )
        .unwrap();
        let mut row = AtomsRow::new(atoms, user, 0.0);
        row.set("subset_name", subset);
        row.set("task", task);
        row.set("used_in", used_in);
        row
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn new_values_skips_described_ones() {
        let doc = MetadataDocument::from_value(json!({
            "keys": {"task": {"values": {"single point": null}}}
        }))
        .unwrap();
        assert_eq!(
            new_values(&doc, "task", &strings(&["single point", "optimization"])),
            vec!["optimization"]
        );
        assert_eq!(new_values(&doc, "used_in", &strings(&["none"])), vec!["none"]);
    }

    #[test]
    fn user_profile_fields_are_optional() {
        let mut doc = MetadataDocument::new();
        let mut prompter = ScriptedPrompter::new(["Ada", "", "ada@example.org", "", "UK"]);
        add_new_values(&mut doc, "user", &strings(&["ada"]), &mut prompter).unwrap();
        assert_eq!(
            doc.values("user").unwrap()["ada"],
            json!({
                "name": "Ada",
                "surname": null,
                "email": "ada@example.org",
                "institution": null,
                "country": "UK"
            })
        );
    }

    #[test]
    fn blank_mandatory_description_aborts_without_changes() {
        let mut doc = MetadataDocument::new();
        let mut prompter = ScriptedPrompter::new(["bulk cells", ""]);
        let err = add_new_values(
            &mut doc,
            "subset_name",
            &strings(&["bulk", "slab"]),
            &mut prompter,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::MandatoryDescription { ref value, .. } if value == "slab"
        ));
        assert!(doc.values("subset_name").is_none());
    }

    #[test]
    fn blank_task_description_is_null() {
        let mut doc = MetadataDocument::new();
        let mut prompter = ScriptedPrompter::new([""]);
        add_new_values(&mut doc, "task", &strings(&["md"]), &mut prompter).unwrap();
        assert_eq!(doc.values("task").unwrap()["md"], Value::Null);
    }

    #[test]
    fn unsupported_key_is_rejected_before_prompting() {
        let mut doc = MetadataDocument::new();
        let mut prompter = ScriptedPrompter::default();
        let err = add_new_values(&mut doc, "formula", &strings(&["LiF"]), &mut prompter)
            .unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedKey(k) if k == "formula"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn reconcile_describes_every_value_and_writes_both_sidecars() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("LiF.db");
        let mut db = SqliteDatabase::open(&db_path).unwrap();
        db.write(row("ada", "bulk", "single point", "training")).unwrap();
        db.write(row("ada", "bulk", "initial configuration", "none")).unwrap();

        let existing = MetadataDocument::from_value(json!({
            "title": "LiF",
            "keys": {
                "user": {"values": {"ada": {"name": "Ada"}}},
                "task": {"values": {"single point": "energy only"}}
            },
            "rows": 0
        }))
        .unwrap();
        existing.write_json(&dir.path().join("LiF.json")).unwrap();

        // subset_name: bulk; task: initial configuration; used_in: none, training
        let mut prompter = ScriptedPrompter::new([
            "bulk LiF cells",
            "",
            "not used for fitting",
            "fitting set",
        ]);
        let summary = reconcile(&db, &mut prompter).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.added["subset_name"], vec!["bulk"]);
        assert_eq!(summary.added["task"], vec!["initial configuration"]);
        assert_eq!(summary.added["used_in"], vec!["none", "training"]);
        assert!(!summary.added.contains_key("user"));
        assert_eq!(prompter.remaining(), 0);

        let json_doc = MetadataDocument::read_json(&dir.path().join("LiF.json")).unwrap();
        let yaml_doc = MetadataDocument::read_yaml(&dir.path().join("LiF.yaml")).unwrap();
        assert_eq!(json_doc, yaml_doc);
        assert_eq!(json_doc.rows(), Some(2));
        assert_eq!(json_doc.as_map()["title"], json!("LiF"));
        for key in RECONCILED_KEYS {
            for value in db.distinct_values(key).unwrap() {
                assert!(
                    json_doc.values(key).unwrap().contains_key(&value),
                    "{}={} not described",
                    key,
                    value
                );
            }
        }
    }

    #[test]
    fn reconcile_without_new_values_only_updates_rows() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("empty.db");
        let db = SqliteDatabase::open(&db_path).unwrap();
        let mut prompter = ScriptedPrompter::default();

        let summary = reconcile(&db, &mut prompter).unwrap();
        assert!(summary.is_unchanged());
        let doc = MetadataDocument::read_yaml(&dir.path().join("empty.yaml")).unwrap();
        assert_eq!(doc.rows(), Some(0));
    }

    #[test]
    fn reconcile_needs_a_file_database() {
        let db = SqliteDatabase::in_memory().unwrap();
        let err = reconcile(&db, &mut ScriptedPrompter::default()).unwrap_err();
        assert!(matches!(err, MetadataError::NoDatabasePath));
    }
}
