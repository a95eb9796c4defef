use crate::core::settings::Settings;
use serde_json::Value;

/// Job name without its leading `-`-separated field (the run prefix).
pub fn display_name(job_name: &str) -> String {
    job_name
        .split_once('-')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default()
}

/// Exchange-correlation functional of the first engine, as `type/name` pairs.
///
/// `None` when the engine input carries no `xc` block.
pub fn functional(settings: &Settings, engine: &str) -> Option<String> {
    let xc = settings.get(&["input", engine, "xc"])?.as_object()?;
    if xc.is_empty() {
        return None;
    }
    let parts: Vec<String> = xc
        .iter()
        .map(|(kind, name)| match name {
            Value::String(s) => format!("{}/{}", kind, s),
            other => format!("{}/{}", kind, other),
        })
        .collect();
    Some(parts.join(", "))
}

pub fn calculator_label(engines: &[String]) -> String {
    std::iter::once("ams")
        .chain(engines.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_drops_first_field() {
        assert_eq!(
            display_name("GO-1.0-2-LiF_Pm-3m_-2.89_2x1x1"),
            "1.0-2-LiF_Pm-3m_-2.89_2x1x1"
        );
        assert_eq!(display_name("single"), "");
        assert_eq!(display_name("a-"), "");
    }

    #[test]
    fn functional_joins_xc_entries_in_order() {
        let settings = Settings::from_value(json!({
            "input": {"BAND": {"XC": {"GGA": "PBE", "Dispersion": "Grimme3"}}}
        }))
        .unwrap();
        assert_eq!(
            functional(&settings, "band").as_deref(),
            Some("GGA/PBE, Dispersion/Grimme3")
        );
    }

    #[test]
    fn functional_is_none_without_xc_block() {
        let settings = Settings::from_value(json!({"input": {"band": {}}})).unwrap();
        assert_eq!(functional(&settings, "band"), None);
        assert_eq!(functional(&Settings::new(), "dftb"), None);
    }

    #[test]
    fn calculator_label_prefixes_driver() {
        assert_eq!(calculator_label(&["band".to_string()]), "ams/band");
        assert_eq!(calculator_label(&[]), "ams");
    }
}
