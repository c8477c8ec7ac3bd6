pub mod dml;
mod tx;

use std::future::Future;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::warn;

use crate::driver::{BindParams, DriverConnection, ExecOutcome, ExecuteOptions, LobTypeCodes};
use crate::error::LobMiddlewareError;
use crate::reader::{self, ResultSetReader};
use crate::results::Record;
use crate::types::QueryOptions;

/// A wrapped driver connection.
///
/// Owns the raw connection outright (explicit composition, nothing is
/// patched onto the driver's object) and captures the driver's LOB type
/// codes once at construction for the readers.
pub struct Connection {
    raw: Box<dyn DriverConnection>,
    codes: LobTypeCodes,
    released: bool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("codes", &self.codes)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Connection {
    #[must_use]
    pub fn new(raw: Box<dyn DriverConnection>) -> Self {
        let codes = raw.lob_type_codes();
        Self {
            raw,
            codes,
            released: false,
        }
    }

    #[must_use]
    pub fn lob_type_codes(&self) -> LobTypeCodes {
        self.codes
    }

    pub(crate) fn raw_mut(&mut self) -> &mut dyn DriverConnection {
        self.raw.as_mut()
    }

    /// Run a query and materialize every row, LOBs included.
    ///
    /// Materialized results go straight through the rows reader; a
    /// cursor result is drained to completion.
    ///
    /// # Errors
    /// Driver errors pass through unchanged; materialization errors abort
    /// the call.
    pub async fn query(
        &mut self,
        sql: &str,
        params: BindParams,
        options: QueryOptions,
    ) -> Result<Vec<Record>, LobMiddlewareError> {
        match self
            .raw
            .execute(sql, params, ExecuteOptions::default())
            .await?
        {
            ExecOutcome::Materialized { columns, rows } => {
                let names = reader::column_names(columns);
                reader::read_rows(&names, rows, self.codes, &options.reader).await
            }
            ExecOutcome::Cursor { columns, cursor } => {
                ResultSetReader::new(columns, cursor, self.codes, options)
                    .read_fully()
                    .await
            }
            ExecOutcome::Write(_) => Err(LobMiddlewareError::Execution(
                "query produced a write outcome; use execute_dml for DML".into(),
            )),
        }
    }

    /// Run a query and deliver results bulk by bulk.
    ///
    /// `on_bulk` fires once per non-empty bulk and one final time with an
    /// empty vector as the done signal (see
    /// [`ResultSetReader::read_bulks`] for the exact contract). A
    /// materialized result is delivered as a single bulk followed by the
    /// done signal.
    ///
    /// # Errors
    /// Returns fetch/materialization errors or the callback's error.
    pub async fn query_bulks<F, Fut>(
        &mut self,
        sql: &str,
        params: BindParams,
        options: QueryOptions,
        mut on_bulk: F,
    ) -> Result<(), LobMiddlewareError>
    where
        F: FnMut(Vec<Record>) -> Fut,
        Fut: Future<Output = Result<(), LobMiddlewareError>>,
    {
        match self
            .raw
            .execute(sql, params, ExecuteOptions::default())
            .await?
        {
            ExecOutcome::Materialized { columns, rows } => {
                let names = reader::column_names(columns);
                let records = reader::read_rows(&names, rows, self.codes, &options.reader).await?;
                if !records.is_empty() {
                    on_bulk(records).await?;
                }
                on_bulk(Vec::new()).await
            }
            ExecOutcome::Cursor { columns, cursor } => {
                ResultSetReader::new(columns, cursor, self.codes, options)
                    .read_bulks(on_bulk)
                    .await
            }
            ExecOutcome::Write(_) => Err(LobMiddlewareError::Execution(
                "query produced a write outcome; use execute_dml for DML".into(),
            )),
        }
    }

    /// Run a query as a pull-based stream of single records.
    ///
    /// A cursor result fetches one row per pull; a materialized result is
    /// streamed from memory.
    ///
    /// # Errors
    /// Returns the execute error; later fetch errors surface through the
    /// stream.
    pub async fn query_stream(
        &mut self,
        sql: &str,
        params: BindParams,
        options: QueryOptions,
    ) -> Result<BoxStream<'static, Result<Record, LobMiddlewareError>>, LobMiddlewareError> {
        match self
            .raw
            .execute(sql, params, ExecuteOptions::default())
            .await?
        {
            ExecOutcome::Materialized { columns, rows } => {
                let names = reader::column_names(columns);
                let records = reader::read_rows(&names, rows, self.codes, &options.reader).await?;
                Ok(futures_util::stream::iter(records.into_iter().map(Ok)).boxed())
            }
            ExecOutcome::Cursor { columns, cursor } => {
                Ok(ResultSetReader::new(columns, cursor, self.codes, options)
                    .into_stream()
                    .boxed())
            }
            ExecOutcome::Write(_) => Err(LobMiddlewareError::Execution(
                "query produced a write outcome; use execute_dml for DML".into(),
            )),
        }
    }

    /// # Errors
    /// Returns the driver's commit error.
    pub async fn commit(&mut self) -> Result<(), LobMiddlewareError> {
        Ok(self.raw.commit().await?)
    }

    /// # Errors
    /// Returns the driver's rollback error.
    pub async fn rollback(&mut self) -> Result<(), LobMiddlewareError> {
        Ok(self.raw.rollback().await?)
    }

    /// Return the connection to its pool. Idempotent: releasing an
    /// already-released connection is a no-op.
    ///
    /// # Errors
    /// Returns `Release` when the driver fails to release.
    pub async fn release(&mut self) -> Result<(), LobMiddlewareError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.raw
            .release()
            .await
            .map_err(LobMiddlewareError::Release)
    }

    /// Release, logging instead of surfacing a failure.
    pub async fn release_quietly(&mut self) {
        if let Err(e) = self.release().await {
            warn!(error = %e, "connection release failed");
        }
    }
}
