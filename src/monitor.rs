use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::dispatch::{Dispatch, RowOutcome, RowStatus, SentInfo, SkipReason, WorkRow};
use crate::scanner::{self, ColumnMap};
use crate::sheets::{col_letter, RowStore, SheetsError};
use crate::ui::WatchProgress;

/// What one poll cycle did, for the cycle summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub scanned: usize,
    pub sent: usize,
    pub errored: usize,
    pub limited: usize,
    pub abandoned: usize,
    pub skipped: usize,
    pub store_failures: usize,
}

impl CycleStats {
    fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Skipped(_) => self.skipped += 1,
            RowOutcome::Sent(_) => self.sent += 1,
            RowOutcome::SendFailed { .. } | RowOutcome::RecordFailed { .. } => self.errored += 1,
            RowOutcome::LimitReached => self.limited += 1,
            RowOutcome::ClaimLost => self.abandoned += 1,
            RowOutcome::StoreFailed { .. } => self.store_failures += 1,
        }
    }

    /// True when the cycle did anything beyond skipping.
    pub fn had_activity(&self) -> bool {
        self.sent + self.errored + self.limited + self.abandoned + self.store_failures > 0
    }
}

/// Drives scan → dispatch → sleep forever. One dispatcher instance serves
/// both variants through the [`Dispatch`] seam.
///
/// Failure isolation is layered: a bad row folds into its [`RowOutcome`] and
/// never touches its neighbors; a failed scan aborts only the current cycle
/// and is retried after a longer backoff.
pub struct Monitor<S, D> {
    store: Arc<S>,
    dispatcher: D,
    cols: ColumnMap,
    poll_interval: Duration,
    error_backoff: Duration,
    progress: WatchProgress,
    verbose: bool,
}

impl<S: RowStore, D: Dispatch> Monitor<S, D> {
    pub fn new(
        store: Arc<S>,
        dispatcher: D,
        cols: ColumnMap,
        poll_interval: Duration,
        error_backoff: Duration,
        progress: WatchProgress,
        verbose: bool,
    ) -> Self {
        Self {
            store,
            dispatcher,
            cols,
            poll_interval,
            error_backoff,
            progress,
            verbose,
        }
    }

    /// One poll pass over the sheet, rows visited in increasing row order.
    pub async fn cycle(&self) -> Result<CycleStats, SheetsError> {
        let rows = scanner::scan(self.store.as_ref(), &self.cols).await?;
        let mut stats = CycleStats {
            scanned: rows.len(),
            ..CycleStats::default()
        };
        for work_row in &rows {
            let outcome = self.dispatcher.dispatch(work_row).await;
            stats.record(&outcome);
            self.report(work_row, &outcome);
        }
        Ok(stats)
    }

    /// Runs until the process is terminated externally.
    pub async fn run(&self) {
        loop {
            match self.cycle().await {
                Ok(stats) => {
                    if stats.had_activity() || self.verbose {
                        self.progress.cycle_summary(&stats);
                    }
                    self.progress
                        .set_status(format!("watching ({} rows)", stats.scanned));
                    sleep(self.poll_interval).await;
                }
                Err(e) => {
                    self.progress
                        .cycle_error(e.to_string(), self.error_backoff.as_secs());
                    sleep(self.error_backoff).await;
                }
            }
        }
    }

    fn cell_ref(&self, work_row: &WorkRow) -> String {
        format!("{}{}", col_letter(self.cols.watch), work_row.number)
    }

    fn report(&self, work_row: &WorkRow, outcome: &RowOutcome) {
        let at = self.cell_ref(work_row);
        match outcome {
            RowOutcome::Sent(SentInfo::Single { message_id }) => {
                self.progress.sent(format!("[SENT] {at} (msgid:{message_id})"));
            }
            RowOutcome::Sent(SentInfo::Batch { sent, allowed }) => {
                self.progress.sent(format!("[SENT] {at} ({sent}/{allowed} links)"));
            }
            RowOutcome::SendFailed { error } => {
                self.progress.error(format!("[ERROR] {at}: {error}"));
            }
            RowOutcome::RecordFailed { intended, error } => {
                self.progress.error(format!(
                    "[ERROR] {at}: sent, but writing '{intended}' failed: {error}"
                ));
            }
            RowOutcome::LimitReached => {
                self.progress.warn(format!("[LIMIT] {at}"));
            }
            RowOutcome::ClaimLost => {
                self.progress.warn(format!("[SKIP] {at}: claim lost to another writer"));
            }
            RowOutcome::StoreFailed { error } => {
                self.progress.warn(format!("[RETRY] {at}: {error}"));
            }
            // Unknown submitters are diagnosed every cycle; routine skips
            // only show up in verbose mode.
            RowOutcome::Skipped(reason @ SkipReason::UnknownSubmitter(_)) => {
                self.progress.warn(format!("[SKIP] {at}: {reason}"));
            }
            RowOutcome::Skipped(reason) => {
                if self.verbose {
                    self.progress.note(format!("[skip] {at}: {reason}"));
                }
            }
        }
    }
}

/// One-shot classification of the sheet for the `scan` subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub rows: usize,
    pub pending: usize,
    pub claimed: usize,
    pub sent: usize,
    pub errored: usize,
    pub limited: usize,
    pub blank: usize,
}

impl ScanSummary {
    pub fn from_rows(rows: &[WorkRow]) -> Self {
        let mut summary = ScanSummary {
            rows: rows.len(),
            ..ScanSummary::default()
        };
        for row in rows {
            match RowStatus::parse(&row.status) {
                RowStatus::Claimed => summary.claimed += 1,
                RowStatus::Sent => summary.sent += 1,
                RowStatus::Error => summary.errored += 1,
                RowStatus::LimitReached => summary.limited += 1,
                RowStatus::Empty => {
                    if crate::extract::first_link(&row.text).is_some() {
                        summary.pending += 1;
                    } else {
                        summary.blank += 1;
                    }
                }
            }
        }
        summary
    }
}
