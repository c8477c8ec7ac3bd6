use std::future::Future;
use std::sync::Arc;

use futures_util::Stream;
use tracing::warn;

use crate::driver::{ColumnDescriptor, LobTypeCodes, RowCursor};
use crate::error::LobMiddlewareError;
use crate::reader::{column_names, rows};
use crate::results::Record;
use crate::types::QueryOptions;

/// Paginates a server-side cursor, materializing records bulk by bulk.
///
/// A cursor is a single sequential resource, so each consumption mode —
/// [`read_fully`](Self::read_fully), [`read_bulks`](Self::read_bulks),
/// [`into_stream`](Self::into_stream) — consumes the reader; only one
/// mode can ever run against one cursor.
pub struct ResultSetReader {
    columns: Arc<Vec<String>>,
    cursor: Box<dyn RowCursor>,
    codes: LobTypeCodes,
    options: QueryOptions,
}

impl ResultSetReader {
    #[must_use]
    pub fn new(
        columns: Vec<ColumnDescriptor>,
        cursor: Box<dyn RowCursor>,
        codes: LobTypeCodes,
        options: QueryOptions,
    ) -> Self {
        Self {
            columns: column_names(columns),
            cursor,
            codes,
            options,
        }
    }

    /// Fetch and materialize the next batch of up to `bulk_size` rows.
    /// An empty result means the cursor is exhausted.
    async fn fetch_next_batch(
        &mut self,
        bulk_size: usize,
    ) -> Result<Vec<Record>, LobMiddlewareError> {
        let raw = self
            .cursor
            .get_rows(bulk_size.max(1))
            .await
            .map_err(LobMiddlewareError::Driver)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        rows::read_rows(&self.columns, raw, self.codes, &self.options.reader).await
    }

    async fn close_quietly(&mut self) {
        if let Err(e) = self.cursor.close().await {
            warn!(error = %e, "failed to close result-set cursor");
        }
    }

    /// Drain the cursor to completion, accumulating every record.
    ///
    /// Yields to the scheduler between bulks so a long drain stays
    /// cooperative.
    ///
    /// # Errors
    /// Returns the first fetch or materialization error.
    pub async fn read_fully(mut self) -> Result<Vec<Record>, LobMiddlewareError> {
        let mut all = Vec::new();
        loop {
            let batch = self.fetch_next_batch(self.options.bulk_rows_amount).await?;
            if batch.is_empty() {
                break;
            }
            all.extend(batch);
            tokio::task::yield_now().await;
        }
        self.close_quietly().await;
        Ok(all)
    }

    /// Deliver the cursor bulk by bulk to `on_bulk`.
    ///
    /// The callback fires once per non-empty bulk, then **one final time
    /// with an empty vector** as the done signal. There is no separate
    /// completion flag: an empty argument is the only way to tell "done"
    /// from "more data coming", so callers must branch on
    /// `bulk.is_empty()` and nothing else.
    ///
    /// # Errors
    /// Returns the first fetch/materialization error, or the callback's
    /// own error, aborting the remaining fetches.
    pub async fn read_bulks<F, Fut>(mut self, mut on_bulk: F) -> Result<(), LobMiddlewareError>
    where
        F: FnMut(Vec<Record>) -> Fut,
        Fut: Future<Output = Result<(), LobMiddlewareError>>,
    {
        loop {
            let batch = self.fetch_next_batch(self.options.bulk_rows_amount).await?;
            let done = batch.is_empty();
            on_bulk(batch).await?;
            if done {
                break;
            }
            tokio::task::yield_now().await;
        }
        self.close_quietly().await;
        Ok(())
    }

    /// Turn the cursor into a pull-based stream of single records.
    ///
    /// Each pull fetches exactly one row; end-of-cursor completes the
    /// stream and a fetch returning more than one row is a hard
    /// [`StreamRowCount`](LobMiddlewareError::StreamRowCount) error —
    /// stream mode commits to one-row granularity.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record, LobMiddlewareError>> + Send {
        futures_util::stream::try_unfold(self, |mut reader| async move {
            let mut batch = reader.fetch_next_batch(1).await?;
            if batch.len() > 1 {
                return Err(LobMiddlewareError::StreamRowCount(batch.len()));
            }
            match batch.pop() {
                Some(record) => Ok(Some((record, reader))),
                None => {
                    reader.close_quietly().await;
                    Ok(None)
                }
            }
        })
    }
}
