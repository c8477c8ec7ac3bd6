use tracing::debug;

use super::types::PoolAttributes;
use crate::connection::Connection;
use crate::driver::{BindParams, DriverPool};
use crate::error::LobMiddlewareError;
use crate::types::QueryOptions;

/// Bounded-retry connection acquisition.
///
/// Each attempt asks the driver pool for a connection and, when enabled,
/// probes it with the validation query. A failed attempt — driver error
/// or validation failure — waits `retry_interval` and tries again until
/// `retry_count` attempts are spent, at which point the last error
/// surfaces. A connection that fails validation is released quietly; its
/// validation error (not the driver's connect error) feeds the retry
/// loop.
pub(crate) async fn acquire(
    raw: &dyn DriverPool,
    attrs: &PoolAttributes,
) -> Result<Connection, LobMiddlewareError> {
    let attempts = attrs.retry_count.max(1);
    let mut last_error: Option<LobMiddlewareError> = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::time::sleep(attrs.retry_interval).await;
        }

        match raw.get_connection().await {
            Err(e) => {
                debug!(attempt, error = %e, "pool connection attempt failed");
                last_error = Some(e.into());
            }
            Ok(raw_conn) => {
                let mut conn = Connection::new(raw_conn);
                if !attrs.run_validation_sql {
                    return Ok(conn);
                }
                match validate(&mut conn, &attrs.validation_sql).await {
                    Ok(()) => return Ok(conn),
                    Err(validation_err) => {
                        debug!(attempt, error = %validation_err, "connection failed validation");
                        // There is no sane path for the caller to act on
                        // a release failure mid-validation-failure.
                        conn.release_quietly().await;
                        last_error = Some(LobMiddlewareError::ValidationFailed(
                            validation_err.to_string(),
                        ));
                    }
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        LobMiddlewareError::Execution("connection acquisition made no attempts".into())
    }))
}

async fn validate(conn: &mut Connection, sql: &str) -> Result<(), LobMiddlewareError> {
    conn.query(sql, BindParams::None, QueryOptions::default())
        .await
        .map(|_| ())
}
