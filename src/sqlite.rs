use rusqlite::{ffi, OpenFlags, Params, Row};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::{Connection, Driver};

/// Oldest SQLite library the schema is written for (3.24.0)
pub const MIN_SQLITE_VERSION: i32 = 3_024_000;

/// SQLite driver backed by rusqlite
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }
}

/// Open flags for a connection config. Paths and `file:` URIs are both accepted.
pub fn open_flags(config: &ConnectionConfig) -> OpenFlags {
    let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if config.read_only {
        flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
    } else {
        flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
        if config.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
    }
    flags
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self) -> rusqlite::Result<()> {
        let version = rusqlite::version_number();
        if version < MIN_SQLITE_VERSION {
            return Err(rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_MISUSE),
                Some(format!(
                    "SQLite {} is older than the required 3.24.0",
                    rusqlite::version()
                )),
            ));
        }
        debug!(version = rusqlite::version(), "sqlite library loaded");
        Ok(())
    }

    fn connect(&self, config: &ConnectionConfig) -> rusqlite::Result<SqliteConnection> {
        let inner = rusqlite::Connection::open_with_flags(&config.url, open_flags(config))?;
        inner.busy_timeout(config.busy_timeout())?;
        if config.foreign_keys {
            inner.pragma_update(None, "foreign_keys", true)?;
        }
        debug!(url = %config.url, read_only = config.read_only, "sqlite connection opened");
        Ok(SqliteConnection::new(inner))
    }
}

/// A rusqlite connection with JDBC-style autocommit.
///
/// With autocommit off, the first statement after a commit or rollback
/// issues `BEGIN`, and the transaction stays open until the next explicit
/// `commit` or `rollback`.
#[derive(Debug)]
pub struct SqliteConnection {
    inner: rusqlite::Connection,
    autocommit: bool,
}

impl SqliteConnection {
    pub fn new(inner: rusqlite::Connection) -> Self {
        Self {
            inner,
            autocommit: true,
        }
    }

    /// The underlying rusqlite connection, for schema setup
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.inner
    }

    /// True while a server-side transaction is open
    pub fn in_transaction(&self) -> bool {
        !self.inner.is_autocommit()
    }

    pub fn execute<P: Params>(&self, sql: &str, params: P) -> rusqlite::Result<usize> {
        self.begin_if_needed()?;
        self.inner.execute(sql, params)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.inner.last_insert_rowid()
    }

    pub fn query<T, P, F>(&self, sql: &str, params: P, f: F) -> rusqlite::Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.begin_if_needed()?;
        let mut stmt = self.inner.prepare_cached(sql)?;
        let rows = stmt.query_map(params, f)?.collect::<rusqlite::Result<Vec<T>>>();
        rows
    }

    pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> rusqlite::Result<T>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.begin_if_needed()?;
        self.inner.query_row(sql, params, f)
    }

    fn begin_if_needed(&self) -> rusqlite::Result<()> {
        if !self.autocommit && !self.in_transaction() {
            self.inner.execute_batch("BEGIN DEFERRED")?;
        }
        Ok(())
    }
}

impl Connection for SqliteConnection {
    type Error = rusqlite::Error;

    fn set_autocommit(&mut self, enabled: bool) -> rusqlite::Result<()> {
        if enabled && self.in_transaction() {
            self.inner.execute_batch("COMMIT")?;
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    fn commit(&mut self) -> rusqlite::Result<()> {
        if self.in_transaction() {
            self.inner.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> rusqlite::Result<()> {
        if self.in_transaction() {
            self.inner.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn close(self) -> rusqlite::Result<()> {
        self.inner.close().map_err(|(_, err)| err)
    }
}
