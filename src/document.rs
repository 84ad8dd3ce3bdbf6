use crate::google::{ApiError, DocsApi};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// One block of the body: a paragraph, a table, or something without text (section
/// breaks, tables of contents) that extraction skips.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuralElement {
    #[serde(default)]
    pub paragraph: Option<Paragraph>,
    #[serde(default)]
    pub table: Option<Table>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    #[serde(default)]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// A single `batchUpdate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocsRequest {
    InsertText(InsertTextRequest),
    ReplaceAllText(ReplaceAllTextRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub text: String,
    pub end_of_segment_location: EndOfSegmentLocation,
}

/// An empty segment id addresses the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOfSegmentLocation {
    pub segment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllTextRequest {
    pub contains_text: SubstringMatchCriteria,
    pub replace_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatchCriteria {
    pub text: String,
    pub match_case: bool,
}

impl DocsRequest {
    pub fn append_to_body(text: impl Into<String>) -> Self {
        Self::InsertText(InsertTextRequest {
            text: text.into(),
            end_of_segment_location: EndOfSegmentLocation {
                segment_id: String::new(),
            },
        })
    }

    pub fn remove_all(text: impl Into<String>) -> Self {
        Self::ReplaceAllText(ReplaceAllTextRequest {
            contains_text: SubstringMatchCriteria {
                text: text.into(),
                match_case: true,
            },
            replace_text: String::new(),
        })
    }
}

/// All text-run content in document order, table cells included.
pub fn extract_text(document: &Document) -> String {
    let mut text = String::new();
    if let Some(body) = &document.body {
        collect_blocks(&body.content, &mut text);
    }
    text
}

fn collect_blocks(blocks: &[StructuralElement], out: &mut String) {
    for block in blocks {
        if let Some(paragraph) = &block.paragraph {
            for run in paragraph.elements.iter().filter_map(|el| el.text_run.as_ref()) {
                if let Some(content) = &run.content {
                    out.push_str(content);
                }
            }
        }
        if let Some(table) = &block.table {
            for cell in table.table_rows.iter().flat_map(|row| &row.table_cells) {
                collect_blocks(&cell.content, out);
            }
        }
    }
}

/// Outcome of a write round trip whose insert succeeded.
#[derive(Debug)]
pub enum WriteCheck {
    Restored,
    /// The marker could not be removed and is still in the document.
    MarkerLeft { marker: String, error: ApiError },
}

/// `[Write test 2026-10-19T09:42:00+00:00]`
pub fn write_test_marker<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("[Write test {}]", now.format("%Y-%m-%dT%H:%M:%S%:z"))
}

/// Appends a marker line to the body, then removes exactly that text again. An insert
/// failure is returned as `Err`; a failed removal is reported through
/// [`WriteCheck::MarkerLeft`].
pub async fn verify_write(
    docs: &dyn DocsApi,
    document_id: &str,
    marker: &str,
) -> Result<WriteCheck, ApiError> {
    let inserted = format!("\n{marker}\n");

    docs.batch_update(document_id, vec![DocsRequest::append_to_body(inserted.clone())])
        .await?;
    info!("inserted write marker into {document_id}");

    match docs
        .batch_update(document_id, vec![DocsRequest::remove_all(inserted)])
        .await
    {
        Ok(()) => Ok(WriteCheck::Restored),
        Err(error) => {
            warn!("write marker left in {document_id}: {error}");
            Ok(WriteCheck::MarkerLeft {
                marker: marker.to_string(),
                error,
            })
        }
    }
}
