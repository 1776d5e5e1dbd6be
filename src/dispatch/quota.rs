use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::time::{sleep, timeout};

use super::row::{self, RowStatus, WorkRow};
use super::{claim, Claim, Dispatch, RowOutcome, SentInfo, SkipReason};
use crate::extract;
use crate::ledger::QuotaLedger;
use crate::sheets::RowStore;
use crate::telegram::{LinkSender, SendOptions, TelegramError};

/// Quota decision: skip anything with a recognized status marker, then take
/// every link in the watch cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Dispatch { links: Vec<String> },
}

pub fn decide(text: &str, status: &str) -> Decision {
    if text.trim().is_empty() {
        return Decision::Skip(SkipReason::EmptyText);
    }
    let parsed = RowStatus::parse(status);
    if parsed.is_terminal() || parsed == RowStatus::Claimed {
        return Decision::Skip(SkipReason::AlreadyHandled);
    }
    let links = extract::all_links(text);
    if links.is_empty() {
        return Decision::Skip(SkipReason::NoLink);
    }
    Decision::Dispatch { links }
}

/// Relays a batch of links per row, splitting the batch against the
/// submitter's remaining allowance and accumulating usage in the ledger.
///
/// Dedup across restarts rides on the persisted status cell: a claimed or
/// terminal marker is skipped outright, so no in-process memory is needed
/// for correctness.
pub struct QuotaDispatcher<S, L, T> {
    store: Arc<S>,
    ledger: QuotaLedger<L>,
    sender: T,
    target: String,
    status_col: usize,
    send_timeout: Duration,
    send_delay: Duration,
    options: SendOptions,
}

impl<S: RowStore, L: RowStore, T: LinkSender> QuotaDispatcher<S, L, T> {
    pub fn new(
        store: Arc<S>,
        ledger: QuotaLedger<L>,
        sender: T,
        target: String,
        status_col: usize,
        send_timeout: Duration,
        send_delay: Duration,
    ) -> Self {
        Self {
            store,
            ledger,
            sender,
            target,
            status_col,
            send_timeout,
            send_delay,
            options: SendOptions::default(),
        }
    }

    async fn record(&self, row_number: usize, value: String) -> Result<(), (String, String)> {
        self.store
            .write_cell(row_number, self.status_col, &value)
            .await
            .map_err(|e| (value, e.to_string()))
    }

    /// Sends the allowed links one by one, pacing them with the configured
    /// delay. A failed link is logged and the batch continues.
    async fn send_batch(&self, row_number: usize, links: &[String]) -> usize {
        let mut sent = 0;
        for (i, link) in links.iter().enumerate() {
            if i > 0 {
                sleep(self.send_delay).await;
            }
            let attempt = self.sender.send(&self.target, link, &self.options);
            let result = match timeout(self.send_timeout, attempt).await {
                Ok(result) => result,
                Err(_elapsed) => Err(TelegramError::Timeout {
                    after_secs: self.send_timeout.as_secs(),
                }),
            };
            match result {
                Ok(_message) => sent += 1,
                Err(e) => {
                    eprintln!("  row {row_number}: link {} of {} failed: {e}", i + 1, links.len());
                }
            }
        }
        sent
    }
}

impl<S: RowStore, L: RowStore, T: LinkSender> Dispatch for QuotaDispatcher<S, L, T> {
    async fn dispatch(&self, work_row: &WorkRow) -> RowOutcome {
        let links = match decide(&work_row.text, &work_row.status) {
            Decision::Skip(reason) => return RowOutcome::Skipped(reason),
            Decision::Dispatch { links } => links,
        };

        let Some(submitter) = work_row.submitter.as_deref() else {
            return RowOutcome::Skipped(SkipReason::NoSubmitter);
        };
        let record = match self.ledger.lookup(submitter).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return RowOutcome::Skipped(SkipReason::UnknownSubmitter(submitter.to_string()));
            }
            Err(e) => {
                return RowOutcome::StoreFailed {
                    error: e.to_string(),
                };
            }
        };

        if record.remaining() <= 0 {
            return match self
                .record(work_row.number, row::LIMIT_REACHED.to_string())
                .await
            {
                Ok(()) => RowOutcome::LimitReached,
                Err((_, error)) => RowOutcome::StoreFailed { error },
            };
        }

        let allowed: Vec<String> = links
            .into_iter()
            .take(record.remaining() as usize)
            .collect();

        match claim(self.store.as_ref(), work_row.number, self.status_col).await {
            Claim::Held => {}
            Claim::Lost => return RowOutcome::ClaimLost,
            Claim::Failed(error) => return RowOutcome::StoreFailed { error },
        }

        let sent = self.send_batch(work_row.number, &allowed).await;

        if sent > 0
            && let Err(e) = self.ledger.record_usage(&record, sent as i64).await
        {
            // Usage under-counts until an operator reconciles; the status
            // write below still terminates the row.
            eprintln!("  row {}: usage write failed: {e}", work_row.number);
        }

        let cell = row::batch_sent_status(Local::now(), sent);
        match self.record(work_row.number, cell).await {
            Ok(()) => RowOutcome::Sent(SentInfo::Batch {
                sent,
                allowed: allowed.len(),
            }),
            Err((intended, error)) => RowOutcome::RecordFailed { intended, error },
        }
    }
}
