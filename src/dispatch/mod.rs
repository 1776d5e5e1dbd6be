//! Per-row dispatch: decide whether a row needs work, claim it, send, and
//! record a terminal status. Two variants share the claim protocol and the
//! outcome vocabulary: [`single::LinkDispatcher`] relays the first link of a
//! row, [`quota::QuotaDispatcher`] relays a batch of links against a
//! per-submitter allowance.

pub mod quota;
pub mod row;
pub mod single;

use std::fmt;

pub use quota::QuotaDispatcher;
pub use row::{RowStatus, WorkRow};
pub use single::LinkDispatcher;

use crate::sheets::RowStore;

/// Why a row was left untouched this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Watch cell is empty.
    EmptyText,
    /// Status cell already carries a claim or a terminal marker.
    AlreadyHandled,
    /// Watch cell has text but no extractable link.
    NoLink,
    /// Quota variant: no submitter identity in the email column.
    NoSubmitter,
    /// Quota variant: submitter has no ledger entry. The row stays
    /// unterminated and is seen again next cycle.
    UnknownSubmitter(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyText => write!(f, "empty cell"),
            SkipReason::AlreadyHandled => write!(f, "already handled"),
            SkipReason::NoLink => write!(f, "no link in cell"),
            SkipReason::NoSubmitter => write!(f, "no submitter identity"),
            SkipReason::UnknownSubmitter(who) => write!(f, "submitter '{who}' not in quota sheet"),
        }
    }
}

/// What dispatching did to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Nothing to do; no write occurred.
    Skipped(SkipReason),
    /// Dispatched and recorded.
    Sent(SentInfo),
    /// Send failed; `ERROR …` recorded, row is terminal.
    SendFailed { error: String },
    /// Quota exhausted; `LIMIT REACHED` recorded, row is terminal.
    LimitReached,
    /// Another writer took the row between our claim and the re-read;
    /// abandoned without sending.
    ClaimLost,
    /// A store write/read needed by the protocol failed; the row will be
    /// seen again next cycle.
    StoreFailed { error: String },
    /// The message went out but the terminal status could not be written —
    /// the acknowledged at-least-once gap.
    RecordFailed { intended: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentInfo {
    Single { message_id: i64 },
    Batch { sent: usize, allowed: usize },
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            RowOutcome::Sent(SentInfo::Single { message_id }) => {
                write!(f, "sent (msgid:{message_id})")
            }
            RowOutcome::Sent(SentInfo::Batch { sent, allowed }) => {
                write!(f, "sent {sent}/{allowed} links")
            }
            RowOutcome::SendFailed { error } => write!(f, "send failed: {error}"),
            RowOutcome::LimitReached => write!(f, "limit reached"),
            RowOutcome::ClaimLost => write!(f, "claim lost to another writer"),
            RowOutcome::StoreFailed { error } => write!(f, "store failure: {error}"),
            RowOutcome::RecordFailed { intended, error } => {
                write!(f, "sent, but writing '{intended}' failed: {error}")
            }
        }
    }
}

/// A dispatcher turns one scanned row into an outcome. Failures are folded
/// into the outcome so one bad row can never abort a cycle.
pub trait Dispatch {
    async fn dispatch(&self, work_row: &WorkRow) -> RowOutcome;
}

/// Result of the claim protocol: write `SENDING`, then re-read the cell to
/// confirm the claim still stands.
pub(crate) enum Claim {
    Held,
    Lost,
    Failed(String),
}

/// The re-read narrows, but cannot close, the window in which another writer
/// (the intake form, or a second relay instance) takes the row.
pub(crate) async fn claim<S: RowStore>(store: &S, row_number: usize, status_col: usize) -> Claim {
    if let Err(e) = store.write_cell(row_number, status_col, row::SENDING).await {
        return Claim::Failed(e.to_string());
    }
    match store.get_row(row_number).await {
        Ok(cells) => {
            let status_now = cells
                .get(status_col - 1)
                .map(|s| s.trim())
                .unwrap_or_default();
            if status_now.eq_ignore_ascii_case(row::SENDING) {
                Claim::Held
            } else {
                Claim::Lost
            }
        }
        // Cannot confirm the claim; abandon rather than risk a double send.
        Err(e) => Claim::Failed(e.to_string()),
    }
}
