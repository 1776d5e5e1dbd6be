use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::time::timeout;

use super::row::{self, RowStatus, WorkRow};
use super::{claim, Claim, Dispatch, RowOutcome, SentInfo, SkipReason};
use crate::extract;
use crate::sheets::RowStore;
use crate::telegram::{LinkSender, SendOptions, TelegramError};

/// What `decide` wants done with a row. Pure; the side-effecting protocol
/// lives in [`LinkDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Dispatch { link: String },
}

/// Single-link decision: skip anything already claimed or terminal, then
/// take the first link of the watch cell.
pub fn decide(text: &str, status: &str) -> Decision {
    if text.trim().is_empty() {
        return Decision::Skip(SkipReason::EmptyText);
    }
    match RowStatus::parse(status) {
        RowStatus::Claimed | RowStatus::Sent | RowStatus::Error => {
            return Decision::Skip(SkipReason::AlreadyHandled);
        }
        RowStatus::Empty | RowStatus::LimitReached => {}
    }
    match extract::first_link(text) {
        Some(link) => Decision::Dispatch { link },
        None => Decision::Skip(SkipReason::NoLink),
    }
}

/// Relays the first link of each eligible row to the downstream target,
/// recording the outcome in the status column.
pub struct LinkDispatcher<S, T> {
    store: Arc<S>,
    sender: T,
    target: String,
    status_col: usize,
    send_timeout: Duration,
    options: SendOptions,
}

impl<S: RowStore, T: LinkSender> LinkDispatcher<S, T> {
    pub fn new(
        store: Arc<S>,
        sender: T,
        target: String,
        status_col: usize,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            sender,
            target,
            status_col,
            send_timeout,
            options: SendOptions::default(),
        }
    }

    async fn record(&self, row_number: usize, value: String) -> Result<(), (String, String)> {
        self.store
            .write_cell(row_number, self.status_col, &value)
            .await
            .map_err(|e| (value, e.to_string()))
    }
}

impl<S: RowStore, T: LinkSender> Dispatch for LinkDispatcher<S, T> {
    async fn dispatch(&self, work_row: &WorkRow) -> RowOutcome {
        let link = match decide(&work_row.text, &work_row.status) {
            Decision::Skip(reason) => return RowOutcome::Skipped(reason),
            Decision::Dispatch { link } => link,
        };

        match claim(self.store.as_ref(), work_row.number, self.status_col).await {
            Claim::Held => {}
            Claim::Lost => return RowOutcome::ClaimLost,
            Claim::Failed(error) => return RowOutcome::StoreFailed { error },
        }

        let send = self.sender.send(&self.target, &link, &self.options);
        match timeout(self.send_timeout, send).await {
            Ok(Ok(message)) => {
                let cell = row::sent_status(Local::now(), message.message_id);
                match self.record(work_row.number, cell).await {
                    Ok(()) => RowOutcome::Sent(SentInfo::Single {
                        message_id: message.message_id,
                    }),
                    Err((intended, error)) => RowOutcome::RecordFailed { intended, error },
                }
            }
            Ok(Err(send_err)) => {
                let cell = row::error_status(&send_err.to_string());
                match self.record(work_row.number, cell).await {
                    Ok(()) => RowOutcome::SendFailed {
                        error: send_err.to_string(),
                    },
                    Err((intended, error)) => RowOutcome::RecordFailed { intended, error },
                }
            }
            Err(_elapsed) => {
                let send_err = TelegramError::Timeout {
                    after_secs: self.send_timeout.as_secs(),
                };
                let cell = row::error_status(&send_err.to_string());
                match self.record(work_row.number, cell).await {
                    Ok(()) => RowOutcome::SendFailed {
                        error: send_err.to_string(),
                    },
                    Err((intended, error)) => RowOutcome::RecordFailed { intended, error },
                }
            }
        }
    }
}
