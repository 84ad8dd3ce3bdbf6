use crate::errors::AttendanceError;
use crate::google::{SheetsApi, ValueInputOption};
use crate::models::{EditSubmission, RowRecord, SheetSnapshot};
use crate::sheet::row_range;
use std::collections::BTreeMap;
use tracing::info;

/// How a column behaves on the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Hidden; always written back unchanged.
    Timestamp,
    /// Shown read-only; always written back unchanged.
    ServiceDate,
    Editable,
}

impl ColumnKind {
    pub fn of(header: &str) -> Self {
        let normalized = header.trim().to_lowercase();
        match normalized.as_str() {
            "timestamp" => Self::Timestamp,
            "service date" | "sunday date" => Self::ServiceDate,
            _ => Self::Editable,
        }
    }

    pub fn is_locked(self) -> bool {
        !matches!(self, Self::Editable)
    }
}

pub fn load_for_edit(snapshot: &SheetSnapshot, row_index: usize) -> Result<RowRecord, AttendanceError> {
    snapshot.row(row_index).ok_or(AttendanceError::RowNotFound)
}

/// Full-width replacement row. Missing submissions become "", locked columns keep the
/// original cell whatever was posted.
pub fn apply_edit(
    original: &RowRecord,
    submitted: &BTreeMap<usize, String>,
    headers: &[String],
) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            if ColumnKind::of(header).is_locked() {
                original.values.get(i).cloned().unwrap_or_default()
            } else {
                submitted.get(&i).cloned().unwrap_or_default()
            }
        })
        .collect()
}

/// True when a POST carries the full form and names the same campus and row the request
/// resolved to. Anything else is dropped without an error.
pub fn guard_allows(
    submission: &EditSubmission,
    campus_id: &str,
    row_index: usize,
) -> bool {
    submission.values.is_some()
        && submission.campus.as_deref() == Some(campus_id)
        && submission.last_row_index == Some(row_index)
}

/// Last writer wins: there is no version check against the remote row.
pub async fn commit(
    sheets: &dyn SheetsApi,
    spreadsheet_id: &str,
    sheet_title: &str,
    row_index: usize,
    new_row: Vec<String>,
) -> Result<(), AttendanceError> {
    let range = row_range(sheet_title, row_index, new_row.len());
    sheets
        .update_values(
            spreadsheet_id,
            &range,
            vec![new_row],
            ValueInputOption::UserEntered,
        )
        .await
        .map_err(AttendanceError::SaveFailed)?;
    info!("saved row {row_index} to {range}");
    Ok(())
}
