use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested key-value configuration of a job, e.g. `input.ams.Properties.Gradients = "Yes"`.
///
/// Keys are matched case-insensitively, the way the engine input reads them,
/// but stored with the spelling they were first given. Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

fn find_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a String> {
    map.keys().find(|k| k.eq_ignore_ascii_case(key))
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value. Anything other than an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(find_key(&self.0, first)?)?;
        for segment in rest {
            let map = current.as_object()?;
            current = map.get(find_key(map, segment)?)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    /// Sets a value, creating intermediate tables as needed. A non-table value
    /// found on the way is replaced by a table.
    pub fn set(&mut self, path: &[&str], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut map = &mut self.0;
        for segment in parents {
            let key = find_key(map, segment)
                .cloned()
                .unwrap_or_else(|| segment.to_string());
            let entry = map
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            map = match entry {
                Value::Object(inner) => inner,
                _ => unreachable!("entry was just made an object"),
            };
        }
        let key = find_key(map, last)
            .cloned()
            .unwrap_or_else(|| last.to_string());
        map.insert(key, value);
    }

    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut map = &mut self.0;
        for segment in parents {
            let key = find_key(map, segment)?.clone();
            map = map.get_mut(&key)?.as_object_mut()?;
        }
        let key = find_key(map, last)?.clone();
        map.shift_remove(&key)
    }
}

/// Whether an engine flag is switched on: boolean `true`, or `yes` / `true` in any case.
pub fn is_enabled(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim().to_ascii_lowercase();
            s == "yes" || s == "true"
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Settings {
        Settings::from_value(json!({
            "input": {
                "ams": { "Task": "GeometryOptimization", "Properties": { "Gradients": "Yes" } },
                "band": { "XC": { "GGA": "PBE" } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn get_matches_keys_case_insensitively() {
        let s = sample();
        assert_eq!(
            s.get(&["input", "AMS", "properties", "gradients"]),
            Some(&json!("Yes"))
        );
        assert_eq!(s.get(&["input", "band", "xc", "gga"]), Some(&json!("PBE")));
        assert_eq!(s.get(&["input", "ams", "missing"]), None);
    }

    #[test]
    fn set_reuses_existing_spelling_and_creates_tables() {
        let mut s = sample();
        s.set(&["input", "ams", "properties", "StressTensor"], json!("Yes"));
        s.set(&["input", "ams", "System", "Charge"], json!(0));

        let props = s.get(&["input", "ams", "Properties"]).unwrap();
        assert_eq!(props["StressTensor"], json!("Yes"));
        assert_eq!(props["Gradients"], json!("Yes"));
        assert_eq!(s.get(&["input", "ams", "system", "charge"]), Some(&json!(0)));
    }

    #[test]
    fn set_replaces_scalar_on_the_way() {
        let mut s = Settings::new();
        s.set(&["a"], json!(1));
        s.set(&["a", "b"], json!(2));
        assert_eq!(s.get(&["a", "b"]), Some(&json!(2)));
    }

    #[test]
    fn remove_deletes_nested_entries() {
        let mut s = sample();
        assert_eq!(s.remove(&["input", "ams", "task"]), Some(json!("GeometryOptimization")));
        assert!(!s.contains(&["input", "ams", "Task"]));
        assert_eq!(s.remove(&["input", "nothing", "here"]), None);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(Settings::from_value(json!([1, 2])).is_none());
    }

    #[test]
    fn is_enabled_accepts_yes_true_and_booleans() {
        assert!(is_enabled(Some(&json!("Yes"))));
        assert!(is_enabled(Some(&json!(" TRUE "))));
        assert!(is_enabled(Some(&json!(true))));
        assert!(!is_enabled(Some(&json!("No"))));
        assert!(!is_enabled(Some(&json!(false))));
        assert!(!is_enabled(Some(&json!(1))));
        assert!(!is_enabled(None));
    }
}
