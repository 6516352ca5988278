//! SQLite backend for the recall question backlog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on dedicated
//! connection threads without blocking the async runtime. Connections are
//! handed out by a bounded [`Pool`] that replaces stale ones on acquisition.

mod encode;
mod schema;
mod store;

pub mod connector;
pub mod error;
pub mod pool;

pub use connector::SqliteConnector;
pub use error::{Error, Result};
pub use pool::{Connector, Pool, PoolConfig, PoolStatus, PooledConnection};
pub use store::SqliteBacklog;

#[cfg(test)]
mod tests;
