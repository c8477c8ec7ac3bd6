//! Async convenience layer in front of a LOB-capable SQL driver.
//!
//! Wraps a driver's pool and connections (reached through the trait seam
//! in [`driver`]) with validated, retrying connection acquisition,
//! LOB-resolving result materialization, and RETURNING-clause LOB writes
//! for INSERT/UPDATE.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lob_middleware::prelude::*;
//!
//! async fn demo(raw: Arc<dyn DriverPool>) -> Result<(), LobMiddlewareError> {
//!     let pool = Pool::new(raw, PoolAttributes::default());
//!     let records = pool
//!         .run(
//!             |conn| {
//!                 Box::pin(async move {
//!                     conn.query(
//!                         "SELECT id, body FROM notes",
//!                         BindParams::None,
//!                         QueryOptions::default(),
//!                     )
//!                     .await
//!                 })
//!             },
//!             RunOptions::default(),
//!         )
//!         .await?;
//!     let _ = records;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod driver;
pub mod error;
pub mod extensions;
pub mod pool;
pub mod prelude;
pub mod reader;
pub mod results;
pub mod stream;
pub mod types;
pub mod writer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use connection::Connection;
pub use error::LobMiddlewareError;
pub use pool::{Pool, PoolAttributes};
pub use results::Record;
pub use types::RowValues;
