use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::Value as JsonValue;

use crate::driver::{LobTypeCodes, RawRow};
use crate::error::LobMiddlewareError;
use crate::reader::record;
use crate::results::Record;
use crate::types::RowValues;

/// Tuning for batch row materialization.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RowsReaderOptions {
    /// Rows materialized concurrently. Caps the number of LOB streams
    /// open at once across the whole batch.
    pub parallel_limit: usize,
    /// Yield back to the scheduler after this many completed rows, so a
    /// huge batch cannot monopolize the executor.
    pub yield_every_rows: usize,
}

impl Default for RowsReaderOptions {
    fn default() -> Self {
        Self {
            parallel_limit: 2,
            yield_every_rows: 20,
        }
    }
}

/// Materialize a batch of raw rows into [`Record`]s, in input order.
///
/// Rows are dispatched through a bounded concurrent stream; each row's
/// output slot is fixed by its index before dispatch, so completion order
/// under contention never reorders the result. The first row error aborts
/// the batch; rows still in flight are dropped.
///
/// An empty batch resolves immediately with an empty vector.
///
/// # Errors
/// Returns the first error from any row's materialization.
pub async fn read_rows(
    columns: &Arc<Vec<String>>,
    raw_rows: Vec<RawRow>,
    codes: LobTypeCodes,
    options: &RowsReaderOptions,
) -> Result<Vec<Record>, LobMiddlewareError> {
    if raw_rows.is_empty() {
        return Ok(Vec::new());
    }

    let total = raw_rows.len();
    let mut slots: Vec<Option<Record>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    let mut in_flight = futures_util::stream::iter(raw_rows.into_iter().enumerate().map(
        |(index, row)| {
            let columns = Arc::clone(columns);
            async move { (index, record::read_record(&columns, row, codes).await) }
        },
    ))
    .buffer_unordered(options.parallel_limit.max(1));

    let mut completed = 0usize;
    while let Some((index, result)) = in_flight.next().await {
        slots[index] = Some(result?);
        completed += 1;
        if options.yield_every_rows > 0 && completed.is_multiple_of(options.yield_every_rows) {
            tokio::task::yield_now().await;
        }
    }
    drop(in_flight);

    // Every slot was filled exactly once above.
    Ok(slots.into_iter().flatten().collect())
}

/// Project single-column records into parsed JSON values.
///
/// Fails fast if any record does not have exactly one column. A NULL or
/// empty value maps to an empty JSON object.
///
/// # Errors
/// Returns `Execution` on column-count or parse failures.
pub fn project_single_column_json(
    records: &[Record],
) -> Result<Vec<JsonValue>, LobMiddlewareError> {
    if let Some(record) = records.iter().find(|r| r.len() != 1) {
        return Err(LobMiddlewareError::Execution(format!(
            "json projection requires exactly one column per record, found {}",
            record.len()
        )));
    }

    records
        .iter()
        .map(|record| match record.get_by_index(0) {
            None | Some(RowValues::Null) => Ok(JsonValue::Object(serde_json::Map::new())),
            Some(RowValues::Text(text)) if text.is_empty() => {
                Ok(JsonValue::Object(serde_json::Map::new()))
            }
            Some(RowValues::Text(text)) => serde_json::from_str(text).map_err(|e| {
                LobMiddlewareError::Execution(format!("json projection parse failure: {e}"))
            }),
            Some(other) => Err(LobMiddlewareError::Execution(format!(
                "json projection expects text content, found {other:?}"
            ))),
        })
        .collect()
}
