mod acquire;
pub mod types;

pub use types::PoolAttributes;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::connection::Connection;
use crate::driver::DriverPool;
use crate::error::LobMiddlewareError;
use crate::types::RunOptions;

/// A wrapped driver pool: validated, retrying connection acquisition and
/// a release-guaranteeing `run` helper.
///
/// Explicit composition over the raw pool; cloning shares the underlying
/// pool and its attributes.
#[derive(Clone)]
pub struct Pool {
    raw: Arc<dyn DriverPool>,
    attributes: PoolAttributes,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("raw", &"<DriverPool>")
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl Pool {
    #[must_use]
    pub fn new(raw: Arc<dyn DriverPool>, attributes: PoolAttributes) -> Self {
        Self { raw, attributes }
    }

    /// Wrap with default attributes.
    #[must_use]
    pub fn with_defaults(raw: Arc<dyn DriverPool>) -> Self {
        Self::new(raw, PoolAttributes::default())
    }

    #[must_use]
    pub fn attributes(&self) -> &PoolAttributes {
        &self.attributes
    }

    /// Acquire a validated, wrapped connection under the pool's retry
    /// policy.
    ///
    /// # Errors
    /// Surfaces the last attempt's error once `retry_count` attempts are
    /// exhausted.
    pub async fn get_connection(&self) -> Result<Connection, LobMiddlewareError> {
        acquire::acquire(self.raw.as_ref(), &self.attributes).await
    }

    /// Acquire a connection, run `action` with it, and release the
    /// connection exactly once — whether the action succeeds, fails, or
    /// panics (the panic resumes after release).
    ///
    /// # Errors
    /// The action's error takes priority; a release failure after a
    /// successful action surfaces unless `options.ignore_release_errors`
    /// is set.
    pub async fn run<T, F>(&self, action: F, options: RunOptions) -> Result<T, LobMiddlewareError>
    where
        F: for<'c> FnOnce(&'c mut Connection) -> BoxFuture<'c, Result<T, LobMiddlewareError>>,
    {
        let mut conn = self.get_connection().await?;

        // The async block keeps a synchronous panic from the action
        // closure itself inside the unwind guard.
        let outcome = AssertUnwindSafe(async { action(&mut conn).await })
            .catch_unwind()
            .await;
        let released = conn.release().await;

        match outcome {
            Err(panic_payload) => std::panic::resume_unwind(panic_payload),
            Ok(Err(action_err)) => Err(action_err),
            Ok(Ok(value)) => match released {
                Ok(()) => Ok(value),
                Err(release_err) if options.ignore_release_errors => {
                    debug!(error = %release_err, "ignoring connection release failure");
                    Ok(value)
                }
                Err(release_err) => Err(release_err),
            },
        }
    }

    /// Shut the underlying pool down.
    ///
    /// # Errors
    /// Returns the driver's terminate error.
    pub async fn terminate(&self) -> Result<(), LobMiddlewareError> {
        Ok(self.raw.terminate().await?)
    }
}
