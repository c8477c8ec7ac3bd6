//! Convenient imports for common functionality.

pub use crate::connection::Connection;
pub use crate::driver::{
    BindParams, BindValue, ColumnDescriptor, DriverConnection, DriverError, DriverPool,
    ExecOutcome, ExecuteOptions, LobKind, LobRead, LobTypeCodes, LobWrite, RawField, RawRow,
    RowCursor, WriteEncoding, WriteOutcome,
};
pub use crate::error::LobMiddlewareError;
pub use crate::extensions::{ExtensionKind, Extensions};
pub use crate::pool::{Pool, PoolAttributes};
pub use crate::reader::ResultSetReader;
pub use crate::reader::rows::RowsReaderOptions;
pub use crate::results::Record;
pub use crate::types::{
    DmlOptions, LobMetaInfo, LobPayload, QueryOptions, RowValues, RunOptions, WriteResult,
};
