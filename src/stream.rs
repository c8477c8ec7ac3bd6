//! Whole-stream LOB reads and writes.
//!
//! LOB values arrive and leave as streams; this module turns a readable
//! stream into one in-memory value and pushes one in-memory payload
//! through a writable stream. Streams are trusted to terminate — there is
//! no timeout here.

use crate::driver::{LobKind, LobRead, LobWrite, WriteEncoding};
use crate::error::LobMiddlewareError;
use crate::types::{LobPayload, RowValues};

/// Read a LOB stream to completion.
///
/// `Character` content is UTF-8 decoded into [`RowValues::Text`];
/// `Binary` content is concatenated into [`RowValues::Blob`]. A chunk
/// error discards everything accumulated so far and propagates.
///
/// # Errors
/// Returns the driver's stream error, or `LobMiddlewareError::Stream`
/// when character content is not valid UTF-8.
pub async fn read_fully(
    stream: &mut dyn LobRead,
    kind: LobKind,
) -> Result<RowValues, LobMiddlewareError> {
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    loop {
        match stream.next_chunk().await {
            Ok(Some(chunk)) => chunks.push(chunk),
            Ok(None) => break,
            Err(e) => return Err(LobMiddlewareError::Driver(e)),
        }
    }

    let bytes = chunks.concat();
    match kind {
        LobKind::Binary => Ok(RowValues::Blob(bytes)),
        LobKind::Character => {
            // Decode once over the whole content; chunk boundaries may
            // split multi-byte sequences.
            let text = String::from_utf8(bytes).map_err(|e| {
                LobMiddlewareError::Stream(format!("clob content is not valid utf-8: {e}"))
            })?;
            Ok(RowValues::Text(text))
        }
    }
}

/// Write one payload through a LOB stream's terminal write.
///
/// An absent stream or payload resolves immediately with no side effect
/// (the skip-empty-LOB path). Text payloads are tagged UTF-8, binary
/// payloads are untagged.
///
/// # Errors
/// Returns the driver's write error.
pub async fn write_fully(
    stream: Option<&mut dyn LobWrite>,
    payload: Option<&LobPayload>,
) -> Result<(), LobMiddlewareError> {
    let (Some(stream), Some(payload)) = (stream, payload) else {
        return Ok(());
    };

    let encoding = match payload {
        LobPayload::Text(_) => Some(WriteEncoding::Utf8),
        LobPayload::Blob(_) => None,
    };
    stream
        .end(payload.as_bytes(), encoding)
        .await
        .map_err(LobMiddlewareError::Driver)
}
