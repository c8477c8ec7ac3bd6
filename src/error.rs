use thiserror::Error;

use crate::driver::DriverError;

#[derive(Debug, Error)]
pub enum LobMiddlewareError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("unsupported field type: {0}")]
    UnsupportedFieldType(String),

    #[error("connection validation failed: {0}")]
    ValidationFailed(String),

    #[error("lob stream error: {0}")]
    Stream(String),

    #[error("stream-mode fetch returned {0} rows, expected at most 1")]
    StreamRowCount(usize),

    #[error("connection release failed: {0}")]
    Release(DriverError),

    #[error("parameter error: {0}")]
    Parameter(String),

    #[error("execution error: {0}")]
    Execution(String),
}
