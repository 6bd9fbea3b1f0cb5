//! Uniform application error and the operator-facing report built from it.
//!
//! Every failure that leaves the session layer is an [`ApplicationError`].
//! Database failures keep their original `rusqlite::Error` as the cause so
//! [`describe`] can pull the SQLite result codes back out for the log line.

use std::error::Error as StdError;
use std::fmt;

use rusqlite::ErrorCode;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Boxed cause carried by an [`ApplicationError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias for session-layer operations.
pub type Result<T> = std::result::Result<T, ApplicationError>;

/// Which boundary a failure was translated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Driver load, connect or close failure
    Connection,
    /// Malformed literal input, e.g. an unparsable kickoff date
    Internal,
    /// A domain operation failed in the database
    Query,
    /// Commit, rollback or autocommit toggle failed
    Transaction,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Internal => "internal",
            ErrorKind::Query => "query",
            ErrorKind::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApplicationError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ApplicationError {
    /// Create an error without an underlying cause
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Wrap an underlying cause under a human message
    pub fn wrap(kind: ErrorKind, message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn connection(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::wrap(ErrorKind::Connection, message, cause)
    }

    pub fn internal(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::wrap(ErrorKind::Internal, message, cause)
    }

    pub fn query(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::wrap(ErrorKind::Query, message, cause)
    }

    pub fn transaction(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::wrap(ErrorKind::Transaction, message, cause)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The wrapped `rusqlite::Error`, if the cause came from the database
    pub fn database_cause(&self) -> Option<&rusqlite::Error> {
        self.cause()?.downcast_ref::<rusqlite::Error>()
    }
}

/// Database-specific fields of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseDetail {
    /// SQLite primary result code name, e.g. `ConstraintViolation`
    pub state: String,
    /// SQLite extended result code, `-1` for client-side rusqlite errors
    pub code: i32,
    pub message: String,
}

/// Structured description of an [`ApplicationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub database: Option<DatabaseDetail>,
    pub cause: Option<String>,
}

/// Build the operator report for an error.
///
/// Database causes contribute state, code and the database's own message;
/// any other cause contributes only its display text.
pub fn describe(err: &ApplicationError) -> ErrorReport {
    let database = err.database_cause().map(database_detail);
    let cause = match (&database, err.cause()) {
        (None, Some(cause)) => Some(cause.to_string()),
        _ => None,
    };
    ErrorReport {
        kind: err.kind(),
        message: err.message().to_string(),
        database,
        cause,
    }
}

fn database_detail(err: &rusqlite::Error) -> DatabaseDetail {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => DatabaseDetail {
            state: format!("{:?}", failure.code),
            code: failure.extended_code,
            message: message.clone().unwrap_or_else(|| failure.to_string()),
        },
        other => DatabaseDetail {
            state: format!("{:?}", ErrorCode::Unknown),
            code: -1,
            message: other.to_string(),
        },
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR ({}): {}", self.kind, self.message)?;
        if let Some(db) = &self.database {
            write!(f, "\n* SQL state: {}", db.state)?;
            write!(f, "\n* DBMS error code: {}", db.code)?;
            write!(f, "\n* DBMS error message: {}", db.message)?;
        } else if let Some(cause) = &self.cause {
            write!(f, "\n* Cause: {}", cause)?;
        }
        Ok(())
    }
}

/// Emit the report for `err` as a structured `tracing` event.
pub fn log_error(err: &ApplicationError) {
    let report = describe(err);
    match &report.database {
        Some(db) => error!(
            kind = %report.kind,
            sql_state = %db.state,
            db_code = db.code,
            db_message = %db.message,
            "{}",
            report.message
        ),
        None => error!(
            kind = %report.kind,
            cause = report.cause.as_deref().unwrap_or("-"),
            "{}",
            report.message
        ),
    }
}
