//! Result materialization: raw driver rows into [`Record`]s.
//!
//! Layered leaf-first: `record` resolves one row (LOB fields included),
//! `rows` runs a batch under a concurrency cap, `result_set` paginates a
//! server-side cursor in drain, bulk-callback, or pull-stream mode.

pub mod record;
pub mod result_set;
pub mod rows;

pub use result_set::ResultSetReader;
pub use rows::read_rows;

use std::sync::Arc;

use crate::driver::ColumnDescriptor;

/// Shared column-name sequence for all records of one result set.
#[must_use]
pub fn column_names(columns: Vec<ColumnDescriptor>) -> Arc<Vec<String>> {
    Arc::new(columns.into_iter().map(|c| c.name).collect())
}
