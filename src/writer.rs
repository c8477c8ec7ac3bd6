//! Writes LOB payloads back through RETURNING-clause out-bind streams.
//!
//! All writes are strictly sequential: drivers serialize LOB writes per
//! connection, and overlapping writes would corrupt their state. This is
//! the one place real serialization (not just single-threaded
//! interleaving) is required.

use std::collections::HashMap;

use crate::driver::LobWrite;
use crate::error::LobMiddlewareError;
use crate::stream;
use crate::types::LobWriteJob;

/// Out-bound LOB streams keyed by bind variable, one stream per affected
/// row.
pub type OutBinds = HashMap<String, Vec<Box<dyn LobWrite>>>;

/// Write single-row out-binds: each job's payload goes to the sole
/// stream of its bind variable.
///
/// Jobs with an empty payload, or whose bind has no out-bound stream,
/// are skipped. The first write error aborts the remaining writes.
///
/// # Errors
/// Returns the first failed write's error.
pub async fn write_record(
    out_binds: &mut OutBinds,
    jobs: &[LobWriteJob],
) -> Result<(), LobMiddlewareError> {
    for job in jobs {
        if job.payload.is_empty() {
            continue;
        }
        let stream = out_binds
            .get_mut(&job.bind_name)
            .and_then(|streams| streams.first_mut());
        let Some(stream) = stream else {
            continue;
        };
        stream::write_fully(Some(stream.as_mut()), Some(&job.payload)).await?;
    }
    Ok(())
}

/// Write multi-row out-binds: every stream of a bind variable receives
/// the same payload (a batch UPDATE writes identical LOB content to each
/// affected row).
///
/// Writes stay sequenced one after another across all variables and all
/// rows; the first error aborts the remainder.
///
/// # Errors
/// Returns the first failed write's error.
pub async fn write_records(
    out_binds: &mut OutBinds,
    jobs: &[LobWriteJob],
) -> Result<(), LobMiddlewareError> {
    for job in jobs {
        if job.payload.is_empty() {
            continue;
        }
        let Some(streams) = out_binds.get_mut(&job.bind_name) else {
            continue;
        };
        for stream in streams.iter_mut() {
            stream::write_fully(Some(stream.as_mut()), Some(&job.payload)).await?;
        }
    }
    Ok(())
}
