//! Per-submitter send quotas, backed by a second worksheet.
//!
//! Each ledger row maps a submitter identity to an allowed count (set by the
//! operators) and a used count (mutated only by this process). Remaining
//! allowance may compute to zero or below; that is the exhaustion signal,
//! not an error.

use crate::sheets::{RowStore, SheetsError};

/// Column layout of the quota worksheet, 1-based.
#[derive(Debug, Clone, Copy)]
pub struct QuotaColumns {
    pub submitter: usize,
    pub allowed: usize,
    pub used: usize,
}

/// One ledger entry, pinned to its worksheet row so usage can be written
/// back to the right cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    pub row: usize,
    pub submitter: String,
    pub allowed: i64,
    pub used: i64,
}

impl QuotaRecord {
    pub fn remaining(&self) -> i64 {
        self.allowed - self.used
    }
}

pub struct QuotaLedger<S> {
    pub(crate) store: S,
    cols: QuotaColumns,
}

impl<S: RowStore> QuotaLedger<S> {
    pub fn new(store: S, cols: QuotaColumns) -> Self {
        Self { store, cols }
    }

    /// Finds the ledger entry for `submitter`, matching the key column
    /// case-insensitively. A missing or unparsable used cell reads as 0;
    /// an unparsable allowed cell reads as 0 (no allowance).
    pub async fn lookup(&self, submitter: &str) -> Result<Option<QuotaRecord>, SheetsError> {
        let wanted = submitter.trim();
        let rows = self.store.get_all_rows().await?;
        for (i, cells) in rows.iter().enumerate() {
            let key = cell(cells, self.cols.submitter);
            if !key.is_empty() && key.eq_ignore_ascii_case(wanted) {
                return Ok(Some(QuotaRecord {
                    row: i + 1,
                    submitter: key.to_string(),
                    allowed: parse_count(cell(cells, self.cols.allowed)),
                    used: parse_count(cell(cells, self.cols.used)),
                }));
            }
        }
        Ok(None)
    }

    /// Accumulates `sent` onto the record's used cell.
    pub async fn record_usage(&self, record: &QuotaRecord, sent: i64) -> Result<(), SheetsError> {
        let updated = record.used + sent;
        self.store
            .write_cell(record.row, self.cols.used, &updated.to_string())
            .await
    }
}

fn cell(cells: &[String], col: usize) -> &str {
    cells.get(col - 1).map(|s| s.trim()).unwrap_or_default()
}

fn parse_count(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}
