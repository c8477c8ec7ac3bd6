use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A fully materialized row: every LOB already resolved to its content.
///
/// Column names are shared across all records of one result set; values
/// sit in descriptor order, with SQL NULL represented as
/// [`RowValues::Null`].
#[derive(Debug, Clone)]
pub struct Record {
    /// The column names for this record (shared across the result set)
    column_names: Arc<Vec<String>>,
    /// The resolved values, one per column, in descriptor order
    values: Vec<RowValues>,
    // Name -> index cache to avoid repeated string comparisons
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl Record {
    /// Assemble a record from shared column names and resolved values.
    ///
    /// `values` must align with `column_names`; the readers guarantee
    /// this by construction.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let cache = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );

        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        // Fall back to linear search
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value by column name, `None` if the column is unknown
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Column names in descriptor order
    #[must_use]
    pub fn column_names(&self) -> &Arc<Vec<String>> {
        &self.column_names
    }

    /// Resolved values in descriptor order
    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the record, keeping only the values.
    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }
}
