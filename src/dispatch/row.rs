use std::fmt;

use chrono::{DateTime, Local};

/// One row of the watched worksheet, as seen by a single poll cycle.
///
/// The row number is 1-based and stable within a cycle; it is only as stable
/// across cycles as the sheet itself (out-of-band edits can shift rows, which
/// is why every claim is re-validated against the live cell before sending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRow {
    pub number: usize,
    /// Raw text of the watch column.
    pub text: String,
    /// Raw text of the status column.
    pub status: String,
    /// Submitter identity from the email column, when one is configured.
    pub submitter: Option<String>,
}

/// Parsed view of a status cell.
///
/// The cell is free text owned jointly with the intake form, so parsing is a
/// case-insensitive prefix match. Anything unrecognized reads as `Empty` and
/// leaves the row eligible, matching how the dashboard-facing values are
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// No status marker; the row has not been touched.
    Empty,
    /// "SENDING" — claimed by a dispatcher, send in flight.
    Claimed,
    /// "SENT …" — dispatched, permanently done.
    Sent,
    /// "ERROR …" — dispatch failed, permanently done.
    Error,
    /// "LIMIT REACHED" — quota exhausted, permanently done.
    LimitReached,
}

impl RowStatus {
    pub fn parse(cell: &str) -> Self {
        let upper = cell.trim().to_ascii_uppercase();
        if upper.starts_with("SENDING") {
            RowStatus::Claimed
        } else if upper.starts_with("SENT") {
            RowStatus::Sent
        } else if upper.starts_with("ERROR") {
            RowStatus::Error
        } else if upper.starts_with("LIMIT") {
            RowStatus::LimitReached
        } else {
            RowStatus::Empty
        }
    }

    /// A terminal row is never re-claimed or re-written.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RowStatus::Sent | RowStatus::Error | RowStatus::LimitReached)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Empty => write!(f, "EMPTY"),
            RowStatus::Claimed => write!(f, "SENDING"),
            RowStatus::Sent => write!(f, "SENT"),
            RowStatus::Error => write!(f, "ERROR"),
            RowStatus::LimitReached => write!(f, "LIMIT"),
        }
    }
}

/// Claim marker written before dispatching.
pub const SENDING: &str = "SENDING";

/// Terminal marker for a quota-exhausted row.
pub const LIMIT_REACHED: &str = "LIMIT REACHED";

/// Error text is truncated so the cell stays readable in the dashboard.
pub const MAX_ERROR_LEN: usize = 120;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `SENT <timestamp> (msgid:<id>)` — single-link terminal status.
pub fn sent_status(at: DateTime<Local>, message_id: i64) -> String {
    format!("SENT {} (msgid:{message_id})", at.format(TIMESTAMP_FORMAT))
}

/// `SENT <timestamp> (<n> links)` — quota-batch terminal status.
pub fn batch_sent_status(at: DateTime<Local>, sent: usize) -> String {
    format!("SENT {} ({sent} links)", at.format(TIMESTAMP_FORMAT))
}

/// `ERROR <message>` with the message truncated to [`MAX_ERROR_LEN`] chars.
pub fn error_status(message: &str) -> String {
    let truncated: String = message.chars().take(MAX_ERROR_LEN).collect();
    format!("ERROR {truncated}")
}
