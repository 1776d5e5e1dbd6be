//! In-memory fakes for the store and transport seams, shared by the unit
//! tests of the scanner, ledger, dispatchers and monitor.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use crate::dispatch::row;
use crate::sheets::{RowStore, SheetsError};
use crate::telegram::{LinkSender, SendOptions, SentMessage, TelegramError};

/// Sheet held in memory. Writes are recorded; optional fault injection for
/// write failures and claim pre-emption.
pub struct FakeStore {
    rows: Mutex<Vec<Vec<String>>>,
    pub writes: Mutex<Vec<(usize, usize, String)>>,
    write_budget: AtomicUsize,
    fail_reads: AtomicBool,
    preempt_claims_with: Mutex<Option<String>>,
}

impl FakeStore {
    pub fn new(rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Self {
            rows: Mutex::new(rows),
            writes: Mutex::new(Vec::new()),
            write_budget: AtomicUsize::new(usize::MAX),
            fail_reads: AtomicBool::new(false),
            preempt_claims_with: Mutex::new(None),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> String {
        self.rows
            .lock()
            .unwrap()
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Every subsequent `write_cell` fails.
    pub fn fail_writes(&self) {
        self.write_budget.store(0, Ordering::SeqCst);
    }

    /// The next `n` writes succeed, then every write fails.
    pub fn fail_writes_after(&self, n: usize) {
        self.write_budget.store(n, Ordering::SeqCst);
    }

    /// Every subsequent read fails, as if the store were unreachable.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Simulates another writer landing between our claim and the re-read:
    /// right after a `SENDING` write, the cell flips to `value`.
    pub fn preempt_claims_with(&self, value: &str) {
        *self.preempt_claims_with.lock().unwrap() = Some(value.to_string());
    }

    fn set_cell(&self, row: usize, col: usize, value: &str) {
        let mut rows = self.rows.lock().unwrap();
        if rows.len() < row {
            rows.resize_with(row, Vec::new);
        }
        let cells = &mut rows[row - 1];
        if cells.len() < col {
            cells.resize_with(col, String::new);
        }
        cells[col - 1] = value.to_string();
    }
}

impl RowStore for FakeStore {
    async fn get_all_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SheetsError::Api {
                status: 503,
                message: "injected read failure".into(),
            });
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get_row(&self, row: usize) -> Result<Vec<String>, SheetsError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SheetsError::Api {
                status: 503,
                message: "injected read failure".into(),
            });
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(row - 1)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), SheetsError> {
        let allowed = self
            .write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |budget| {
                (budget > 0).then(|| budget.saturating_sub(1))
            })
            .is_ok();
        if !allowed {
            return Err(SheetsError::Api {
                status: 500,
                message: "injected write failure".into(),
            });
        }
        self.set_cell(row, col, value);
        self.writes.lock().unwrap().push((row, col, value.to_string()));
        if value == row::SENDING
            && let Some(hijack) = self.preempt_claims_with.lock().unwrap().clone()
        {
            self.set_cell(row, col, &hijack);
        }
        Ok(())
    }
}

/// Transport that records calls. Responses can be scripted per call;
/// unscripted calls succeed with auto-incrementing message ids.
pub struct FakeSender {
    pub calls: Mutex<Vec<(String, String)>>,
    responses: Mutex<VecDeque<Result<i64, String>>>,
    next_id: AtomicI64,
    hang: AtomicBool,
}

impl FakeSender {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            next_id: AtomicI64::new(1),
            hang: AtomicBool::new(false),
        }
    }

    pub fn enqueue_ok(&self, message_id: i64) {
        self.responses.lock().unwrap().push_back(Ok(message_id));
    }

    pub fn enqueue_err(&self, message: &str) {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
    }

    /// Accepts the call, then never completes. For timeout tests.
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

impl LinkSender for FakeSender {
    async fn send(
        &self,
        target: &str,
        text: &str,
        _options: &SendOptions,
    ) -> Result<SentMessage, TelegramError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.to_string(), text.to_string()));
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(id)) => Ok(SentMessage { message_id: id }),
            Some(Err(message)) => Err(TelegramError::Api {
                status: 500,
                message,
            }),
            None => Ok(SentMessage {
                message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            }),
        }
    }
}
