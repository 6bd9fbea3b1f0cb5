//! Transactional SQLite sessions over a sports-league schema.
//!
//! # Intention
//!
//! - Show disciplined use of a database client: acquire a connection,
//!   translate driver failures into one application error, demarcate
//!   transactions, and always release the connection.
//! - Contrast autocommit sessions with single-transaction sessions.
//!
//! # Architectural Boundaries
//!
//! - `session` is the only place driver errors become `ApplicationError`.
//! - `queries` holds plain parameterized statements and no lifecycle logic.
//! - `sqlite` and `schema` are the only modules that know about SQLite.

pub mod config;
pub mod connection;
pub mod error;
pub mod queries;
pub mod scenario;
pub mod schema;
pub mod session;
pub mod sqlite;

pub use config::{AppConfig, ConnectionConfig};
pub use connection::{with_connection, Connection, Driver, Scoped};
pub use error::{describe, log_error, ApplicationError, ErrorKind, ErrorReport};
pub use queries::{QueryService, SqliteQueryService};
pub use scenario::{Operation, Statement};
pub use session::{Resolution, SessionOutcome, SessionRunner};
pub use sqlite::{SqliteConnection, SqliteDriver};
