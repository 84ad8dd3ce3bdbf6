use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campus {
    pub id: String,
    pub label: String,
    pub spreadsheet_id: String,
    /// Numeric tab id (`gid`); `None` selects the first tab.
    #[serde(default)]
    pub sheet_id: Option<i64>,
}

impl Campus {
    pub fn new(id: &str, label: &str, spreadsheet_id: &str, sheet_id: Option<i64>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_id,
        }
    }
}

/// Campuses in display order. Built once at start-up and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampusRegistry {
    campuses: Vec<Campus>,
}

impl CampusRegistry {
    pub fn new(campuses: Vec<Campus>) -> Self {
        Self { campuses }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Campus::new(
                "san-leandro",
                "San Leandro",
                "1hFgXyLssTPX8rMjl5IzrhmFJGWBI1WlRAwCb8PLBvMI",
                Some(178023513),
            ),
            Campus::new(
                "milpitas",
                "Milpitas",
                "1xyx-LMVYVdZQyX64w9YRzKrMNJ7oWR2tbmedlY81ZwQ",
                None,
            ),
            Campus::new(
                "peninsula",
                "Peninsula",
                "11Kuu6sG4UKMXdZBDFLoBbf_hCDU6en0eh8KVtII7MZg",
                None,
            ),
            Campus::new(
                "tracy",
                "Tracy",
                "14QNh7Y3YPLoeIkw-GYtEemLjc7pQuKN-86SVYxievI0",
                Some(2068867284),
            ),
            Campus::new(
                "pleasanton",
                "Pleasanton",
                "1xsnUELFKcPxLFItnqqykv39oRLbpm_4VdOQ3o5LefXE",
                None,
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Campus> {
        self.campuses.iter().find(|campus| campus.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Campus> {
        self.campuses.iter()
    }

    pub fn len(&self) -> usize {
        self.campuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campuses.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// 1-based physical row in the tab; the header is row 1.
    pub row_index: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<RowRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecencyEntry {
    pub row_index: usize,
    pub values: Vec<String>,
    pub sort_key: f64,
}

impl RecencyEntry {
    /// The second column, shown as the date label in the picker.
    pub fn label(&self) -> &str {
        self.values.get(1).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub campus: Option<String>,
    pub row: Option<String>,
}

/// Fields of a POSTed edit form. `values` is `None` when no `v[i]` field arrived at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSubmission {
    pub campus: Option<String>,
    pub last_row_index: Option<usize>,
    pub values: Option<BTreeMap<usize, String>>,
}

impl EditSubmission {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut submission = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "campus" => submission.campus = Some(value),
                "last_row_index" => submission.last_row_index = Some(parse_row_param(&value)),
                field if field == "v" || field.starts_with("v[") => {
                    let values = submission.values.get_or_insert_with(BTreeMap::new);
                    if let Some(index) = value_field_index(field) {
                        values.insert(index, value);
                    }
                }
                _ => {}
            }
        }
        submission
    }
}

/// `v[3]` -> `Some(3)`; the bare `v` key counts as a values field with no index.
fn value_field_index(key: &str) -> Option<usize> {
    let inner = key.strip_prefix("v[")?.strip_suffix(']')?;
    inner.trim().parse().ok()
}

/// Integer coercion for row parameters: leading digits are read, anything else is 0.
pub fn parse_row_param(raw: &str) -> usize {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_display_order() {
        let registry = CampusRegistry::builtin();
        let ids: Vec<_> = registry.iter().map(|campus| campus.id.as_str()).collect();
        assert_eq!(
            ids,
            ["san-leandro", "milpitas", "peninsula", "tracy", "pleasanton"]
        );
        assert_eq!(registry.get("tracy").unwrap().sheet_id, Some(2068867284));
        assert!(registry.get("oakland").is_none());
    }

    #[test]
    fn submission_collects_indexed_values() {
        let submission = EditSubmission::from_pairs(vec![
            ("campus".into(), "milpitas".into()),
            ("last_row_index".into(), "7".into()),
            ("v[2]".into(), "135".into()),
            ("v[0]".into(), "ts".into()),
        ]);
        assert_eq!(submission.campus.as_deref(), Some("milpitas"));
        assert_eq!(submission.last_row_index, Some(7));
        let values = submission.values.unwrap();
        assert_eq!(values.get(&0).map(String::as_str), Some("ts"));
        assert_eq!(values.get(&2).map(String::as_str), Some("135"));
        assert!(!values.contains_key(&1));
    }

    #[test]
    fn submission_without_values_has_none() {
        let submission = EditSubmission::from_pairs(vec![("campus".into(), "tracy".into())]);
        assert!(submission.values.is_none());
    }

    #[test]
    fn row_param_coercion() {
        assert_eq!(parse_row_param("12"), 12);
        assert_eq!(parse_row_param(" 4abc"), 4);
        assert_eq!(parse_row_param("abc"), 0);
    }
}
