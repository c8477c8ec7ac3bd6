//! Scriptable mock driver for exercising the middleware without a
//! database.
//!
//! Each mock records what was done to it into a shared [`MockLog`];
//! responses are scripted up front as queues. Exhausting a script is a
//! driver error, so a test that runs more calls than it scripted fails
//! loudly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::driver::{
    BindParams, ColumnDescriptor, DriverConnection, DriverError, DriverPool, ExecOutcome,
    ExecuteOptions, LobRead, LobTypeCodes, LobWrite, RawField, RawRow, RowCursor, WriteEncoding,
    WriteOutcome,
};
use crate::types::RowValues;

/// CLOB type code reported by the mock driver.
pub const MOCK_CLOB_CODE: u32 = 112;
/// BLOB type code reported by the mock driver.
pub const MOCK_BLOB_CODE: u32 = 113;

#[must_use]
pub fn mock_codes() -> LobTypeCodes {
    LobTypeCodes::new(MOCK_CLOB_CODE, MOCK_BLOB_CODE)
}

/// Everything observable a mock did, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Execute { sql: String, auto_commit: bool },
    LobWrite { label: String, bytes: Vec<u8>, utf8: bool },
    Commit,
    Rollback,
    Release,
}

pub type MockLog = Arc<Mutex<Vec<MockEvent>>>;

#[must_use]
pub fn new_log() -> MockLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot the log contents.
#[must_use]
pub fn log_events(log: &MockLog) -> Vec<MockEvent> {
    log.lock().expect("mock log poisoned").clone()
}

fn push(log: &MockLog, event: MockEvent) {
    log.lock().expect("mock log poisoned").push(event);
}

/// Readable LOB stream fed from scripted chunks.
pub struct MockLobRead {
    steps: VecDeque<Result<Vec<u8>, DriverError>>,
}

impl MockLobRead {
    /// Stream that delivers `chunks` then ends.
    #[must_use]
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            steps: chunks.into_iter().map(Ok).collect(),
        }
    }

    /// Stream that delivers `chunks` then fails with `error`.
    #[must_use]
    pub fn failing_after(chunks: Vec<Vec<u8>>, error: DriverError) -> Self {
        let mut steps: VecDeque<_> = chunks.into_iter().map(Ok).collect();
        steps.push_back(Err(error));
        Self { steps }
    }
}

#[async_trait]
impl LobRead for MockLobRead {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, DriverError> {
        // Suspend like real I/O would, so concurrent reads interleave.
        tokio::task::yield_now().await;
        match self.steps.pop_front() {
            None => Ok(None),
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(e),
        }
    }
}

/// Writable LOB stream; successful writes land in the shared log.
pub struct MockLobWrite {
    label: String,
    log: MockLog,
    fail: Option<DriverError>,
}

impl MockLobWrite {
    #[must_use]
    pub fn new(label: impl Into<String>, log: MockLog) -> Self {
        Self {
            label: label.into(),
            log,
            fail: None,
        }
    }

    #[must_use]
    pub fn failing(label: impl Into<String>, log: MockLog, error: DriverError) -> Self {
        Self {
            label: label.into(),
            log,
            fail: Some(error),
        }
    }
}

#[async_trait]
impl LobWrite for MockLobWrite {
    async fn end(
        &mut self,
        payload: &[u8],
        encoding: Option<WriteEncoding>,
    ) -> Result<(), DriverError> {
        tokio::task::yield_now().await;
        if let Some(e) = self.fail.take() {
            return Err(e);
        }
        push(
            &self.log,
            MockEvent::LobWrite {
                label: self.label.clone(),
                bytes: payload.to_vec(),
                utf8: matches!(encoding, Some(WriteEncoding::Utf8)),
            },
        );
        Ok(())
    }
}

/// Cursor fed from scripted batches; once the script is exhausted every
/// further fetch returns an empty batch.
pub struct MockCursor {
    batches: VecDeque<Result<Vec<RawRow>, DriverError>>,
}

impl MockCursor {
    #[must_use]
    pub fn new(batches: Vec<Result<Vec<RawRow>, DriverError>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

#[async_trait]
impl RowCursor for MockCursor {
    async fn get_rows(&mut self, _n: usize) -> Result<Vec<RawRow>, DriverError> {
        tokio::task::yield_now().await;
        self.batches.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Connection with a scripted queue of execute responses.
pub struct MockConnection {
    log: MockLog,
    responses: VecDeque<Result<ExecOutcome, DriverError>>,
    fail_release: Option<DriverError>,
    fail_commit: Option<DriverError>,
}

impl MockConnection {
    #[must_use]
    pub fn new(log: MockLog) -> Self {
        Self {
            log,
            responses: VecDeque::new(),
            fail_release: None,
            fail_commit: None,
        }
    }

    /// Queue the response for the next execute call.
    #[must_use]
    pub fn respond(mut self, response: Result<ExecOutcome, DriverError>) -> Self {
        self.responses.push_back(response);
        self
    }

    #[must_use]
    pub fn fail_release_with(mut self, error: DriverError) -> Self {
        self.fail_release = Some(error);
        self
    }

    #[must_use]
    pub fn fail_commit_with(mut self, error: DriverError) -> Self {
        self.fail_commit = Some(error);
        self
    }
}

#[async_trait]
impl DriverConnection for MockConnection {
    fn lob_type_codes(&self) -> LobTypeCodes {
        mock_codes()
    }

    async fn execute(
        &mut self,
        sql: &str,
        _params: BindParams,
        options: ExecuteOptions,
    ) -> Result<ExecOutcome, DriverError> {
        push(
            &self.log,
            MockEvent::Execute {
                sql: sql.to_string(),
                auto_commit: options.auto_commit,
            },
        );
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(DriverError::new(format!("no scripted response for '{sql}'"))))
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        if let Some(e) = self.fail_commit.take() {
            return Err(e);
        }
        push(&self.log, MockEvent::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DriverError> {
        push(&self.log, MockEvent::Rollback);
        Ok(())
    }

    async fn release(&mut self) -> Result<(), DriverError> {
        push(&self.log, MockEvent::Release);
        if let Some(e) = self.fail_release.take() {
            return Err(e);
        }
        Ok(())
    }
}

/// Pool with a scripted queue of connection attempts, counting every
/// call.
pub struct MockPool {
    script: Mutex<VecDeque<Result<MockConnection, DriverError>>>,
    attempts: AtomicUsize,
}

impl MockPool {
    #[must_use]
    pub fn new(script: Vec<Result<MockConnection, DriverError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// How many times `get_connection` was called.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverPool for MockPool {
    async fn get_connection(&self) -> Result<Box<dyn DriverConnection>, DriverError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .expect("mock pool script poisoned")
            .pop_front();
        match next {
            None => Err(DriverError::new("mock pool script exhausted")),
            Some(Ok(conn)) => Ok(Box::new(conn)),
            Some(Err(e)) => Err(e),
        }
    }

    async fn terminate(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// A materialized execute outcome from column names and rows.
#[must_use]
pub fn materialized(columns: &[&str], rows: Vec<RawRow>) -> ExecOutcome {
    ExecOutcome::Materialized {
        columns: columns.iter().map(|name| ColumnDescriptor::new(*name)).collect(),
        rows,
    }
}

/// A cursor execute outcome from column names and scripted batches.
#[must_use]
pub fn cursor(columns: &[&str], batches: Vec<Result<Vec<RawRow>, DriverError>>) -> ExecOutcome {
    ExecOutcome::Cursor {
        columns: columns.iter().map(|name| ColumnDescriptor::new(*name)).collect(),
        cursor: Box::new(MockCursor::new(batches)),
    }
}

/// A write execute outcome with the given out-bind streams.
#[must_use]
pub fn write_outcome(
    rows_affected: u64,
    out_binds: Vec<(&str, Vec<Box<dyn LobWrite>>)>,
) -> ExecOutcome {
    ExecOutcome::Write(WriteOutcome {
        rows_affected,
        out_binds: out_binds
            .into_iter()
            .map(|(name, streams)| (name.to_string(), streams))
            .collect(),
    })
}

/// The response a validation query expects: one scalar row.
#[must_use]
pub fn validation_ok() -> ExecOutcome {
    materialized(
        &["1"],
        vec![RawRow::Positional(vec![RawField::Scalar(RowValues::Int(
            1,
        ))])],
    )
}
