//! Trait seam to the underlying database driver.
//!
//! The middleware never talks to a database itself; everything below goes
//! through these object-safe traits. A driver adapter implements them and
//! hands the wrapper a pool; the scriptable mock in `test_utils` is one
//! such adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::RowValues;

/// Error surfaced by the underlying driver, passed through verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DriverError {
    /// Driver/vendor error code, when one exists.
    pub code: Option<i32>,
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// Character vs binary large object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    /// CLOB; stream content is decoded as UTF-8 text.
    Character,
    /// BLOB; stream content stays raw bytes.
    Binary,
}

/// Encoding tag for a terminal LOB write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEncoding {
    Utf8,
}

/// Numeric LOB type codes reported by the driver.
///
/// Captured once when a pool or connection is wrapped and threaded
/// explicitly through the readers; there is no global type-code state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobTypeCodes {
    pub clob: u32,
    pub blob: u32,
}

impl LobTypeCodes {
    #[must_use]
    pub fn new(clob: u32, blob: u32) -> Self {
        Self { clob, blob }
    }

    /// Classify a field's type code, `None` when it is neither LOB kind.
    #[must_use]
    pub fn kind_of(&self, type_code: u32) -> Option<LobKind> {
        if type_code == self.clob {
            Some(LobKind::Character)
        } else if type_code == self.blob {
            Some(LobKind::Binary)
        } else {
            None
        }
    }
}

/// Readable LOB stream handle.
///
/// Pull-based: `Ok(Some(chunk))` delivers data, `Ok(None)` is end of
/// stream, `Err` is terminal. A driver adapter maps its event- or
/// poll-based stream onto this shape.
#[async_trait]
pub trait LobRead: Send {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, DriverError>;
}

/// Writable LOB stream handle obtained from a RETURNING-clause out-bind.
#[async_trait]
pub trait LobWrite: Send {
    /// Terminal write: `payload` is the entire LOB content. Text payloads
    /// carry the UTF-8 tag, binary payloads no tag.
    async fn end(
        &mut self,
        payload: &[u8],
        encoding: Option<WriteEncoding>,
    ) -> Result<(), DriverError>;
}

/// Server-side paginated result handle.
#[async_trait]
pub trait RowCursor: Send {
    /// Fetch up to `n` raw rows. An empty batch signals exhaustion.
    async fn get_rows(&mut self, n: usize) -> Result<Vec<RawRow>, DriverError>;

    /// Release server-side cursor resources.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// One result column, in result order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One raw field as delivered by the driver, before materialization.
pub enum RawField {
    /// SQL NULL.
    Null,
    /// Inline scalar value.
    Scalar(RowValues),
    /// Out-of-line LOB handle; resolved by the readers.
    Lob {
        type_code: u32,
        stream: Box<dyn LobRead>,
    },
    /// A shape the driver adapter could not classify; carries the field's
    /// display form for the error message.
    Unsupported(String),
}

impl std::fmt::Debug for RawField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Self::Lob { type_code, .. } => f
                .debug_struct("Lob")
                .field("type_code", type_code)
                .field("stream", &"<LobRead>")
                .finish(),
            Self::Unsupported(repr) => f.debug_tuple("Unsupported").field(repr).finish(),
        }
    }
}

/// One raw row: positional (aligned with the column descriptors) or keyed
/// by column name. Both shapes are handled transparently.
#[derive(Debug)]
pub enum RawRow {
    Positional(Vec<RawField>),
    Named(HashMap<String, RawField>),
}

impl RawRow {
    /// Take the field for column `index`/`name`, leaving `Null` behind.
    /// Missing fields read as NULL.
    pub fn take_field(&mut self, index: usize, name: &str) -> RawField {
        match self {
            RawRow::Positional(fields) => match fields.get_mut(index) {
                Some(slot) => std::mem::replace(slot, RawField::Null),
                None => RawField::Null,
            },
            RawRow::Named(map) => map.remove(name).unwrap_or(RawField::Null),
        }
    }
}

/// A single bound parameter value.
#[derive(Debug, Clone)]
pub enum BindValue {
    /// Ordinary IN bind.
    In(RowValues),
    /// OUT bind populated by the database with LOB write handles
    /// (RETURNING INTO).
    OutLob(LobKind),
}

/// Bind parameters for one statement.
#[derive(Debug, Clone, Default)]
pub enum BindParams {
    #[default]
    None,
    Positional(Vec<BindValue>),
    Named(HashMap<String, BindValue>),
}

impl BindParams {
    /// Positional IN binds from plain values.
    pub fn positional(values: impl IntoIterator<Item = RowValues>) -> Self {
        BindParams::Positional(values.into_iter().map(BindValue::In).collect())
    }

    /// Named IN binds from `(name, value)` pairs.
    pub fn named<N: Into<String>>(values: impl IntoIterator<Item = (N, RowValues)>) -> Self {
        BindParams::Named(
            values
                .into_iter()
                .map(|(n, v)| (n.into(), BindValue::In(v)))
                .collect(),
        )
    }

    pub(crate) fn named_mut(&mut self) -> Option<&mut HashMap<String, BindValue>> {
        match self {
            BindParams::Named(map) => Some(map),
            _ => None,
        }
    }
}

/// Per-execute driver options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Commit as part of the execute call.
    pub auto_commit: bool,
}

/// DML outcome with out-bound LOB handles, one handle per affected row
/// and bind variable.
pub struct WriteOutcome {
    pub rows_affected: u64,
    pub out_binds: HashMap<String, Vec<Box<dyn LobWrite>>>,
}

impl std::fmt::Debug for WriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteOutcome")
            .field("rows_affected", &self.rows_affected)
            .field("out_binds", &self.out_binds.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// What an execute call produced, matched explicitly by the facade
/// instead of probing the result object's shape.
pub enum ExecOutcome {
    /// Fully materialized rows.
    Materialized {
        columns: Vec<ColumnDescriptor>,
        rows: Vec<RawRow>,
    },
    /// Server-side cursor to be paginated.
    Cursor {
        columns: Vec<ColumnDescriptor>,
        cursor: Box<dyn RowCursor>,
    },
    /// DML outcome.
    Write(WriteOutcome),
}

impl std::fmt::Debug for ExecOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Materialized { columns, rows } => f
                .debug_struct("Materialized")
                .field("columns", columns)
                .field("rows", &rows.len())
                .finish(),
            Self::Cursor { columns, .. } => f
                .debug_struct("Cursor")
                .field("columns", columns)
                .field("cursor", &"<RowCursor>")
                .finish(),
            Self::Write(w) => f.debug_tuple("Write").field(w).finish(),
        }
    }
}

/// A raw driver connection.
#[async_trait]
pub trait DriverConnection: Send {
    /// LOB type codes for this driver, stable for the connection's life.
    fn lob_type_codes(&self) -> LobTypeCodes;

    async fn execute(
        &mut self,
        sql: &str,
        params: BindParams,
        options: ExecuteOptions,
    ) -> Result<ExecOutcome, DriverError>;

    async fn commit(&mut self) -> Result<(), DriverError>;

    async fn rollback(&mut self) -> Result<(), DriverError>;

    /// Return the connection to its pool (or close it).
    async fn release(&mut self) -> Result<(), DriverError>;
}

/// A raw driver connection pool.
#[async_trait]
pub trait DriverPool: Send + Sync {
    async fn get_connection(&self) -> Result<Box<dyn DriverConnection>, DriverError>;

    async fn terminate(&self) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lob_type_codes_classify() {
        let codes = LobTypeCodes::new(112, 113);
        assert_eq!(codes.kind_of(112), Some(LobKind::Character));
        assert_eq!(codes.kind_of(113), Some(LobKind::Binary));
        assert_eq!(codes.kind_of(2), None);
    }

    #[test]
    fn take_field_reads_missing_as_null() {
        let mut row = RawRow::Positional(vec![RawField::Scalar(RowValues::Int(7))]);
        assert!(matches!(
            row.take_field(0, "A"),
            RawField::Scalar(RowValues::Int(7))
        ));
        assert!(matches!(row.take_field(1, "B"), RawField::Null));

        let mut row = RawRow::Named(HashMap::from([(
            "A".to_string(),
            RawField::Scalar(RowValues::Bool(true)),
        )]));
        assert!(matches!(
            row.take_field(0, "A"),
            RawField::Scalar(RowValues::Bool(true))
        ));
        assert!(matches!(row.take_field(0, "A"), RawField::Null));
    }
}
