use super::row::{AtomsRow, KeyValue};

pub const ROW_INFO_HEADER: &str = "\t  id |      user      |       name       |       task       | formula |  energy  | success |  used_in  ";

/// Keeps at most `width` characters, marking a cut with `*` in the last kept place.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut kept: String = text.chars().take(width.saturating_sub(1)).collect();
    kept.push('*');
    kept
}

/// Two-line fixed-width summary of a row: the column header and the row itself,
/// both indented by a tab.
///
/// ```text
///   id |      user      |       name       |       task       | formula |  energy  | success |  used_in
///    4 | Paolo De Ange* | 1-LiF_P6_3mc_-3* | single point     | Li2F2   |  -19.209 |    True |      none
/// ```
pub fn row_info(row: &AtomsRow) -> String {
    let user = truncate(&row.user, 14);
    let name = truncate(row.get_str("name").unwrap_or(""), 16);
    let task = truncate(row.get_str("task").unwrap_or(""), 16);
    let energy = row
        .energy
        .map(|e| format!("{:>8.3}", e))
        .unwrap_or_default();
    let success = match row.get("success").and_then(KeyValue::as_bool) {
        Some(true) => "True",
        Some(false) => "False",
        None => "",
    };
    let used_in = row.get("used_in").map(|u| u.to_string()).unwrap_or_default();

    let data = format!(
        "\t {:>3} | {:<14} | {:<16} | {:<16} | {:<7} | {:>8} | {:>7} | {:>9} ",
        row.id.unwrap_or_default(),
        user,
        name,
        task,
        row.formula(),
        energy,
        success,
        used_in
    );
    format!("{}\n{}", ROW_INFO_HEADER, data)
}
