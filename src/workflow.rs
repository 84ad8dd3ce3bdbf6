//! One request, start to finish: resolve the campus, authenticate, read the tab, then pick
//! dates, show a row, or save it.

use crate::editor::{apply_edit, commit, guard_allows, load_for_edit};
use crate::errors::AttendanceError;
use crate::google::{Backend, SheetsApi};
use crate::models::{
    parse_row_param, Campus, CampusRegistry, EditSubmission, PageQuery, RecencyEntry, RowRecord,
    SheetSnapshot,
};
use crate::recency::select_recent;
use crate::sheet::read_range;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub campus: Option<String>,
    pub row: Option<usize>,
    /// Present only for POST requests.
    pub submission: Option<EditSubmission>,
}

impl PageRequest {
    /// Query parameters win over form fields.
    pub fn new(query: PageQuery, submission: Option<EditSubmission>) -> Self {
        let campus = query
            .campus
            .or_else(|| submission.as_ref().and_then(|form| form.campus.clone()));
        let row = query
            .row
            .as_deref()
            .map(parse_row_param)
            .or_else(|| submission.as_ref().and_then(|form| form.last_row_index));
        Self {
            campus,
            row,
            submission,
        }
    }

    fn is_post(&self) -> bool {
        self.submission.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    CampusPicker,
    /// Empty when the tab has no data rows.
    DatePicker(Vec<RecencyEntry>),
    EditForm {
        headers: Vec<String>,
        row: RowRecord,
    },
    Saved,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub campus: Option<Campus>,
    pub sheet_title: Option<String>,
    pub content: PageContent,
}

impl Page {
    fn campus_picker() -> Self {
        Self {
            campus: None,
            sheet_title: None,
            content: PageContent::CampusPicker,
        }
    }
}

pub async fn build_page(
    registry: &CampusRegistry,
    backend: &dyn Backend,
    request: &PageRequest,
) -> Page {
    // Unknown campus ids are treated as no selection.
    let campus = request
        .campus
        .as_deref()
        .and_then(|id| registry.get(id))
        .cloned();
    let Some(campus) = campus else {
        if request.is_post() || request.row.is_some() {
            debug!("no valid campus in request; showing picker");
        }
        return Page::campus_picker();
    };

    let mut sheet_title = None;
    let content = match campus_content(&campus, backend, request, &mut sheet_title).await {
        Ok(content) => content,
        Err(err) => {
            warn!("campus {}: {err}", campus.id);
            PageContent::Error(err.to_string())
        }
    };

    Page {
        campus: Some(campus),
        sheet_title,
        content,
    }
}

async fn campus_content(
    campus: &Campus,
    backend: &dyn Backend,
    request: &PageRequest,
    sheet_title: &mut Option<String>,
) -> Result<PageContent, AttendanceError> {
    let sheets = backend.sheets().await?;
    let title = resolve_sheet_title(sheets.as_ref(), campus).await?;
    *sheet_title = Some(title.clone());

    let grid = sheets
        .get_values(&campus.spreadsheet_id, &read_range(&title))
        .await?;
    let snapshot = SheetSnapshot::from_grid(grid);
    if !snapshot.has_data() {
        return Err(AttendanceError::NoData);
    }

    let Some(row_index) = request.row else {
        return Ok(PageContent::DatePicker(select_recent(&snapshot.rows)));
    };

    let row = load_for_edit(&snapshot, row_index)?;
    if let Some(submission) = &request.submission {
        if guard_allows(submission, &campus.id, row_index) {
            let submitted = submission.values.clone().unwrap_or_default();
            let new_row = apply_edit(&row, &submitted, &snapshot.headers);
            commit(
                sheets.as_ref(),
                &campus.spreadsheet_id,
                &title,
                row_index,
                new_row,
            )
            .await?;
            return Ok(PageContent::Saved);
        }
        debug!(
            "ignoring stale submission for campus {} row {row_index}",
            campus.id
        );
    }

    Ok(PageContent::EditForm {
        headers: snapshot.headers,
        row,
    })
}

/// The tab whose id matches the campus, or the first tab when the campus names none.
async fn resolve_sheet_title(
    sheets: &dyn SheetsApi,
    campus: &Campus,
) -> Result<String, AttendanceError> {
    let tabs = sheets.list_sheets(&campus.spreadsheet_id).await?;
    tabs.into_iter()
        .find(|tab| campus.sheet_id.is_none_or(|id| id == tab.sheet_id))
        .map(|tab| tab.title)
        .ok_or(AttendanceError::SheetNotFound)
}

#[cfg(test)]
pub(crate) mod fakes {
    use crate::errors::AttendanceError;
    use crate::google::{ApiError, Backend, SheetProperties, SheetsApi, ValueInputOption};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedWrite {
        pub spreadsheet_id: String,
        pub range: String,
        pub values: Vec<Vec<String>>,
        pub option: ValueInputOption,
    }

    #[derive(Default)]
    pub struct FakeSheet {
        pub tabs: Vec<SheetProperties>,
        pub grid: Vec<Vec<String>>,
        pub fail_reads: bool,
        pub fail_writes: bool,
        pub writes: Mutex<Vec<RecordedWrite>>,
    }

    impl FakeSheet {
        pub fn attendance(rows: usize) -> Self {
            let mut grid = vec![vec![
                "Timestamp".to_string(),
                "Service Date".to_string(),
                "Attendance".to_string(),
            ]];
            for week in 0..rows {
                grid.push(vec![
                    format!("ts-{week}"),
                    format!("2024-01-{:02}", week + 1),
                    "120".to_string(),
                ]);
            }
            Self {
                tabs: vec![
                    SheetProperties {
                        sheet_id: 0,
                        title: "Summary".into(),
                    },
                    SheetProperties {
                        sheet_id: 42,
                        title: "Form Responses 1".into(),
                    },
                ],
                grid,
                ..Self::default()
            }
        }

        pub fn writes(&self) -> Vec<RecordedWrite> {
            self.writes.lock().unwrap().clone()
        }
    }

    fn forbidden() -> ApiError {
        ApiError::Status {
            status: 403,
            message: "The caller does not have permission".into(),
        }
    }

    #[async_trait]
    impl SheetsApi for Arc<FakeSheet> {
        async fn list_sheets(&self, _id: &str) -> Result<Vec<SheetProperties>, ApiError> {
            Ok(self.tabs.clone())
        }

        async fn get_values(&self, _id: &str, _range: &str) -> Result<Vec<Vec<String>>, ApiError> {
            if self.fail_reads {
                return Err(forbidden());
            }
            Ok(self.grid.clone())
        }

        async fn update_values(
            &self,
            spreadsheet_id: &str,
            range: &str,
            values: Vec<Vec<String>>,
            option: ValueInputOption,
        ) -> Result<(), ApiError> {
            if self.fail_writes {
                return Err(forbidden());
            }
            self.writes.lock().unwrap().push(RecordedWrite {
                spreadsheet_id: spreadsheet_id.to_string(),
                range: range.to_string(),
                values,
                option,
            });
            Ok(())
        }
    }

    pub struct FakeBackend {
        pub sheet: Arc<FakeSheet>,
        pub credentials_missing: bool,
    }

    impl FakeBackend {
        pub fn new(sheet: FakeSheet) -> Self {
            Self {
                sheet: Arc::new(sheet),
                credentials_missing: false,
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn sheets(&self) -> Result<Box<dyn SheetsApi>, AttendanceError> {
            if self.credentials_missing {
                return Err(AttendanceError::CredentialsMissing);
            }
            Ok(Box::new(Arc::clone(&self.sheet)))
        }
    }
}
