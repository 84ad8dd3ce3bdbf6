use crate::models::{RowRecord, SheetSnapshot};

/// Right-hand bound of the read range; columns past `ZZ` are never fetched.
pub const READ_LAST_COLUMN: &str = "ZZ";

/// 0-based column index to spreadsheet letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut index = index as i64;
    while index >= 0 {
        letters.push(b'A' + (index % 26) as u8);
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Sheet titles are always quoted; embedded quotes are doubled.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

pub fn read_range(title: &str) -> String {
    format!("{}!A1:{READ_LAST_COLUMN}", quote_sheet_title(title))
}

/// `'<title>'!A<row>:<last><row>` covering `width` columns.
pub fn row_range(title: &str, row_index: usize, width: usize) -> String {
    let last = column_letter(width.saturating_sub(1));
    format!("{}!A{row_index}:{last}{row_index}", quote_sheet_title(title))
}

pub fn pad_row(mut values: Vec<String>, width: usize) -> Vec<String> {
    values.resize(width, String::new());
    values
}

impl SheetSnapshot {
    /// The first grid row becomes the header; every other row is numbered by its physical
    /// position and fitted to the header width.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut rows = grid.into_iter();
        let Some(headers) = rows.next() else {
            return Self::default();
        };
        let width = headers.len();
        let rows = rows
            .enumerate()
            .map(|(offset, values)| RowRecord {
                row_index: offset + 2,
                values: pad_row(values, width),
            })
            .collect();
        Self { headers, rows }
    }

    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Physical row lookup. Row 1 is the header row itself.
    pub fn row(&self, row_index: usize) -> Option<RowRecord> {
        if row_index == 1 {
            return Some(RowRecord {
                row_index,
                values: self.headers.clone(),
            });
        }
        self.rows
            .iter()
            .find(|row| row.row_index == row_index)
            .cloned()
    }
}
