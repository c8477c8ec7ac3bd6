use futures_util::future::BoxFuture;
use tracing::warn;

use super::Connection;
use crate::error::LobMiddlewareError;

impl Connection {
    /// Run `action` against this connection, committing when it returns
    /// `Ok` and rolling back when it returns `Err`.
    ///
    /// A rollback failure after a failed action is logged; the action's
    /// error is what propagates.
    ///
    /// # Errors
    /// Returns the action's error, or the commit error on an otherwise
    /// successful action.
    pub async fn transaction<T, F>(&mut self, action: F) -> Result<T, LobMiddlewareError>
    where
        F: for<'c> FnOnce(&'c mut Connection) -> BoxFuture<'c, Result<T, LobMiddlewareError>>,
    {
        match action(self).await {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(action_err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed action also failed");
                }
                Err(action_err)
            }
        }
    }
}
