use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::driver::{LobTypeCodes, RawField, RawRow};
use crate::error::LobMiddlewareError;
use crate::results::Record;
use crate::stream;
use crate::types::RowValues;

/// Resolve one raw field to its materialized value.
///
/// NULL and scalars pass through; LOB handles are read to completion with
/// the kind classified through `codes`.
///
/// # Errors
/// Returns `UnsupportedFieldType` for unclassifiable fields or unknown
/// LOB type codes, and stream/driver errors from LOB reads.
pub async fn resolve_field(
    field: RawField,
    codes: LobTypeCodes,
) -> Result<RowValues, LobMiddlewareError> {
    match field {
        RawField::Null => Ok(RowValues::Null),
        RawField::Scalar(value) => Ok(value),
        RawField::Lob {
            type_code,
            mut stream,
        } => {
            let kind = codes.kind_of(type_code).ok_or_else(|| {
                LobMiddlewareError::UnsupportedFieldType(format!("lob type code {type_code}"))
            })?;
            stream::read_fully(stream.as_mut(), kind).await
        }
        RawField::Unsupported(repr) => Err(LobMiddlewareError::UnsupportedFieldType(repr)),
    }
}

/// Materialize one raw row into a [`Record`].
///
/// Fields are aligned to the column sequence — by position for array
/// rows, by name for keyed rows, missing fields reading as NULL — and all
/// resolutions run concurrently since LOB reads are I/O-bound. Assembly
/// is all-or-nothing: the record exists only once every column resolved,
/// and the first resolution error fails the whole row.
///
/// # Errors
/// Returns the first error from any field resolution.
pub async fn read_record(
    columns: &Arc<Vec<String>>,
    mut row: RawRow,
    codes: LobTypeCodes,
) -> Result<Record, LobMiddlewareError> {
    let fields: Vec<RawField> = columns
        .iter()
        .enumerate()
        .map(|(index, name)| row.take_field(index, name))
        .collect();

    let values = try_join_all(fields.into_iter().map(|f| resolve_field(f, codes))).await?;
    Ok(Record::new(columns.clone(), values))
}
