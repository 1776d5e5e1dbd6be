//! Full-sheet scan: one [`WorkRow`] per store row, in row-number order.

use crate::dispatch::WorkRow;
use crate::error::RelayError;
use crate::sheets::{col_index, RowStore, SheetsError};

/// Which columns of the work sheet hold what, 1-based.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub watch: usize,
    pub status: usize,
    pub email: Option<usize>,
}

impl ColumnMap {
    /// Builds the map from configured column letters.
    pub fn new(watch: &str, status: &str, email: Option<&str>) -> Result<Self, RelayError> {
        Ok(Self {
            watch: parse_column(watch)?,
            status: parse_column(status)?,
            email: email.map(parse_column).transpose()?,
        })
    }
}

/// Maps a configured column letter to its 1-based index.
pub fn parse_column(letter: &str) -> Result<usize, RelayError> {
    col_index(letter)
        .ok_or_else(|| RelayError::Config(format!("invalid column letter '{letter}'")))
}

/// Reads the full row set once and projects it through the column map.
///
/// Blank rows are kept so row numbers stay aligned with store positions;
/// rows shorter than a configured column read that cell as empty. Pure read,
/// no writes.
pub async fn scan<S: RowStore>(store: &S, cols: &ColumnMap) -> Result<Vec<WorkRow>, SheetsError> {
    let rows = store.get_all_rows().await?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, cells)| WorkRow {
            number: i + 1,
            text: cell_text(&cells, cols.watch),
            status: cell_text(&cells, cols.status),
            submitter: cols
                .email
                .map(|c| cell_text(&cells, c))
                .filter(|s| !s.is_empty()),
        })
        .collect())
}

fn cell_text(cells: &[String], col: usize) -> String {
    cells.get(col - 1).map(|s| s.trim().to_string()).unwrap_or_default()
}
