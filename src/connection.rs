//! Connection and driver seams used by the session runner.

use std::error::Error as StdError;

use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::{ApplicationError, Result};

/// One exclusively-owned database session.
///
/// `close` consumes the handle, so an explicit close happens at most once.
/// Implementations must still release the session when dropped unclosed.
pub trait Connection {
    /// Database-layer error raised by this connection and its queries
    type Error: StdError + Send + Sync + 'static;

    /// Toggle autocommit. Disabling it makes the next statement open a
    /// transaction that stays open until `commit` or `rollback`.
    fn set_autocommit(&mut self, enabled: bool) -> std::result::Result<(), Self::Error>;

    fn is_autocommit(&self) -> bool;

    fn commit(&mut self) -> std::result::Result<(), Self::Error>;

    fn rollback(&mut self) -> std::result::Result<(), Self::Error>;

    fn close(self) -> std::result::Result<(), Self::Error>;
}

/// Loads the client library and opens connections from a config.
pub trait Driver {
    type Connection: Connection;

    fn name(&self) -> &str;

    /// Make sure the client library is usable before connecting.
    fn load(&self) -> std::result::Result<(), <Self::Connection as Connection>::Error>;

    fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> std::result::Result<Self::Connection, <Self::Connection as Connection>::Error>;
}

/// Result of a [`with_connection`] scope.
#[derive(Debug)]
pub struct Scoped<T> {
    pub result: Result<T>,
    /// Close failure, kept apart so it never masks `result`
    pub closed: Result<()>,
}

/// Run `body` against `conn`, then close it exactly once whatever the body
/// returned.
pub fn with_connection<C, T, F>(mut conn: C, body: F) -> Scoped<T>
where
    C: Connection,
    F: FnOnce(&mut C) -> Result<T>,
{
    let result = body(&mut conn);
    info!("closing connection");
    let closed = conn
        .close()
        .map_err(|e| ApplicationError::connection("failed to close connection", e));
    Scoped { result, closed }
}
