use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::reader::rows::RowsReaderOptions;

/// Values that can appear in a materialized row or be bound to a query.
///
/// One enum across all drivers so helper code never branches on driver
/// types. Resolved LOB content lands here as `Text` (CLOB) or `Blob`
/// (BLOB):
/// ```rust
/// use lob_middleware::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// In-memory LOB content to be written through an out-bind stream.
#[derive(Debug, Clone, PartialEq)]
pub enum LobPayload {
    /// Character content, written UTF-8 tagged.
    Text(String),
    /// Binary content, written untagged.
    Blob(Vec<u8>),
}

impl LobPayload {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            LobPayload::Text(s) => s.is_empty(),
            LobPayload::Blob(b) => b.is_empty(),
        }
    }

    /// Borrow the payload as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            LobPayload::Text(s) => s.as_bytes(),
            LobPayload::Blob(b) => b,
        }
    }
}

/// One pending LOB write: bind variable paired with its payload.
///
/// Exists only for the duration of a single insert/update call.
#[derive(Debug, Clone)]
pub struct LobWriteJob {
    /// Bind variable whose out-bound stream(s) receive the payload.
    pub bind_name: String,
    /// Content to write.
    pub payload: LobPayload,
}

/// Maps destination LOB columns to the bind variables that carry their
/// content, for insert/update SQL rewriting.
///
/// Insertion order is preserved; the synthesized `RETURNING ... INTO ...`
/// clause lists columns and binds in exactly this order.
#[derive(Debug, Clone, Default)]
pub struct LobMetaInfo {
    entries: Vec<(String, String)>,
}

impl LobMetaInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `column` to the bind variable `bind_name`. Remaps in place if
    /// the column was already listed, keeping its original position.
    pub fn map(&mut self, column: impl Into<String>, bind_name: impl Into<String>) -> &mut Self {
        let column = column.into();
        let bind_name = bind_name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == column) {
            entry.1 = bind_name;
        } else {
            self.entries.push((column, bind_name));
        }
        self
    }

    /// Build from `(column, bind)` pairs, preserving order.
    pub fn from_pairs<C, B>(pairs: impl IntoIterator<Item = (C, B)>) -> Self
    where
        C: Into<String>,
        B: Into<String>,
    {
        let mut meta = Self::new();
        for (column, bind) in pairs {
            meta.map(column, bind);
        }
        meta
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(column, bind)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, b)| (c.as_str(), b.as_str()))
    }
}

/// Options for the query paths (drain, bulk-callback, and stream modes).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryOptions {
    /// Rows fetched per cursor pagination call.
    pub bulk_rows_amount: usize,
    /// Row materialization tuning.
    pub reader: RowsReaderOptions,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            bulk_rows_amount: 100,
            reader: RowsReaderOptions::default(),
        }
    }
}

/// Options for `insert`/`update`/`execute_dml`.
#[derive(Debug, Clone, Default)]
pub struct DmlOptions {
    /// Commit after the statement (and after any LOB writes) succeeds.
    pub auto_commit: bool,
    /// LOB columns populated through RETURNING-clause out-binds.
    pub lob_meta_info: LobMetaInfo,
}

/// Options for `Pool::run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Swallow (log-only) a release failure after a successful action.
    pub ignore_release_errors: bool,
}

/// Outcome of an insert/update once any LOB writes have completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// Rows affected by the statement.
    pub rows_affected: u64,
}
