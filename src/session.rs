//! Session lifecycle: connect, execute, commit or rollback, close.
//!
//! [`SessionRunner::run`] executes every statement in its own transaction
//! and closes the connection through [`with_connection`].
//! [`SessionRunner::run_transactional`] keeps the connection in hand so the
//! failure branch can roll back, and closes it explicitly afterwards.
//!
//! Both methods are the outermost error boundary: they log every failure
//! and report it in the returned [`SessionOutcome`] instead of propagating.

use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::connection::{with_connection, Connection, Driver};
use crate::error::{log_error, ApplicationError, Result};
use crate::queries::QueryService;
use crate::scenario::{resolve_all, Operation, Statement};

/// How the session's work ended up on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No connection was opened
    NotConnected,
    /// Each executed statement committed on its own
    Autocommit,
    Committed,
    RolledBack,
    /// Rollback itself failed; the server discards the transaction on close
    RollbackFailed,
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub resolution: Resolution,
    /// Statements that completed without error
    pub executed: usize,
    /// The failure that ended the session's work, if any
    pub failure: Option<ApplicationError>,
    /// Rollback and close failures, in the order they happened
    pub cleanup_failures: Vec<ApplicationError>,
}

impl SessionOutcome {
    fn new() -> Self {
        Self {
            resolution: Resolution::NotConnected,
            executed: 0,
            failure: None,
            cleanup_failures: Vec::new(),
        }
    }

    /// Success is judged on the work alone; cleanup failures do not count.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    fn fail(&mut self, err: ApplicationError) {
        log_error(&err);
        self.failure = Some(err);
    }

    fn cleanup_failed(&mut self, err: ApplicationError) {
        log_error(&err);
        self.cleanup_failures.push(err);
    }
}

pub struct SessionRunner<D, Q> {
    driver: D,
    queries: Q,
    config: ConnectionConfig,
}

impl<D, Q> SessionRunner<D, Q>
where
    D: Driver,
    Q: QueryService<D::Connection>,
{
    pub fn new(driver: D, queries: Q, config: ConnectionConfig) -> Self {
        Self {
            driver,
            queries,
            config,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Load the driver and open a connection. Either failure becomes a
    /// `Connection` error carrying the driver's cause.
    pub fn connect(&self) -> Result<D::Connection> {
        info!(driver = self.driver.name(), url = %self.config.url, "opening connection");
        self.driver
            .load()
            .map_err(|e| ApplicationError::connection("driver not available", e))?;
        self.driver
            .connect(&self.config)
            .map_err(|e| ApplicationError::connection("connection failed", e))
    }

    /// Execute `operations` with autocommit on. Statements that ran before a
    /// failure stay committed.
    pub fn run(&self, operations: &[Operation]) -> SessionOutcome {
        info!(operations = operations.len(), "autonomous session");
        let mut outcome = SessionOutcome::new();
        let conn = match self.connect() {
            Ok(conn) => conn,
            Err(err) => {
                outcome.fail(err);
                return outcome;
            }
        };
        outcome.resolution = Resolution::Autocommit;

        let mut executed = 0;
        let scoped = with_connection(conn, |conn| {
            let statements = resolve_all(operations)?;
            for statement in &statements {
                self.execute(conn, statement)?;
                executed += 1;
            }
            Ok(())
        });
        outcome.executed = executed;

        if let Err(err) = scoped.result {
            outcome.fail(err);
        }
        if let Err(err) = scoped.closed {
            outcome.cleanup_failed(err);
        }
        outcome
    }

    /// Execute `operations` as one transaction: all of them commit or none.
    pub fn run_transactional(&self, operations: &[Operation]) -> SessionOutcome {
        info!(operations = operations.len(), "transactional session");
        let mut outcome = SessionOutcome::new();
        let statements = match resolve_all(operations) {
            Ok(statements) => statements,
            Err(err) => {
                outcome.fail(err);
                return outcome;
            }
        };
        let mut conn = match self.connect() {
            Ok(conn) => conn,
            Err(err) => {
                outcome.fail(err);
                return outcome;
            }
        };

        match self.transact(&mut conn, &statements, &mut outcome.executed) {
            Ok(()) => outcome.resolution = Resolution::Committed,
            Err(err) => {
                outcome.fail(err);
                info!("rollback");
                match conn.rollback() {
                    Ok(()) => outcome.resolution = Resolution::RolledBack,
                    Err(e) => {
                        outcome.resolution = Resolution::RollbackFailed;
                        outcome.cleanup_failed(ApplicationError::transaction("rollback failed", e));
                    }
                }
            }
        }

        info!("closing connection");
        if let Err(e) = conn.close() {
            outcome.cleanup_failed(ApplicationError::connection("failed to close connection", e));
        }
        outcome
    }

    fn transact(
        &self,
        conn: &mut D::Connection,
        statements: &[Statement],
        executed: &mut usize,
    ) -> Result<()> {
        info!("disabling autocommit");
        conn.set_autocommit(false)
            .map_err(|e| ApplicationError::transaction("could not disable autocommit", e))?;
        debug!(autocommit = conn.is_autocommit(), "transaction scope open");
        for statement in statements {
            self.execute(conn, statement)?;
            *executed += 1;
        }
        info!("commit");
        conn.commit()
            .map_err(|e| ApplicationError::transaction("commit failed", e))
    }

    fn execute(&self, conn: &mut D::Connection, statement: &Statement) -> Result<()> {
        let name = statement.name();
        debug!(statement = name, "executing");
        let q = &self.queries;
        let done = match statement {
            Statement::ListTopScorers { season } => q
                .list_top_scorers(conn, *season)
                .map(|rows| debug!(statement = name, rows = rows.len(), "done")),
            Statement::ListSchedule { season } => q
                .list_schedule(conn, *season)
                .map(|rows| debug!(statement = name, rows = rows.len(), "done")),
            Statement::InsertMatch(new_match) => q
                .insert_match(conn, new_match)
                .map(|id| debug!(statement = name, match_id = id, "done")),
            Statement::UpdateMatchScore {
                match_id,
                home_score,
                away_score,
            } => q
                .update_match_score(conn, *match_id, *home_score, *away_score)
                .map(|rows| debug!(statement = name, rows, "done")),
            Statement::Lineup { team_id, season } => q
                .lineup(conn, *team_id, *season)
                .map(|rows| debug!(statement = name, rows = rows.len(), "done")),
            Statement::TeamMembership { player_id, season } => q
                .team_membership(conn, *player_id, *season)
                .map(|membership| debug!(statement = name, found = membership.is_some(), "done")),
            Statement::ValidateMatch { match_id } => {
                q.validate_match(conn, *match_id).map(|check| {
                    if !check.is_consistent() {
                        warn!(
                            match_id,
                            home_score = ?check.home_score,
                            away_score = ?check.away_score,
                            home_goals = check.home_goals,
                            away_goals = check.away_goals,
                            "recorded score does not match the goal log"
                        );
                    }
                })
            }
        };
        done.map_err(|e| ApplicationError::query(format!("{} failed", name), e))
    }
}
