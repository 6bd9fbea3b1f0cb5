// Recording driver, connection and query service for session tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use league_session::queries::{
    Fixture, LineupEntry, MatchValidation, Membership, NewMatch, TopScorer,
};
use league_session::{Connection, ConnectionConfig, Driver, QueryService, SessionRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load,
    Connect,
    Autocommit(bool),
    Query(&'static str),
    QueryFailed(&'static str),
    Commit,
    Rollback,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockDbError(pub String);

impl fmt::Display for MockDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock database error: {}", self.0)
    }
}

impl std::error::Error for MockDbError {}

/// Which steps fail. `queries` lists (statement, nth call) pairs, 1-based.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub load: bool,
    pub connect: bool,
    pub autocommit: bool,
    pub commit: bool,
    pub rollback: bool,
    pub close: bool,
    pub queries: Vec<(&'static str, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }
}

pub struct MockDriver {
    journal: Journal,
    faults: Faults,
}

pub struct MockConnection {
    journal: Journal,
    faults: Faults,
    autocommit: bool,
}

impl Driver for MockDriver {
    type Connection = MockConnection;

    fn name(&self) -> &str {
        "mock"
    }

    fn load(&self) -> Result<(), MockDbError> {
        self.journal.push(Event::Load);
        if self.faults.load {
            return Err(MockDbError("driver missing".into()));
        }
        Ok(())
    }

    fn connect(&self, _config: &ConnectionConfig) -> Result<MockConnection, MockDbError> {
        self.journal.push(Event::Connect);
        if self.faults.connect {
            return Err(MockDbError("connection refused".into()));
        }
        Ok(MockConnection {
            journal: self.journal.clone(),
            faults: self.faults.clone(),
            autocommit: true,
        })
    }
}

impl Connection for MockConnection {
    type Error = MockDbError;

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), MockDbError> {
        self.journal.push(Event::Autocommit(enabled));
        if self.faults.autocommit {
            return Err(MockDbError("autocommit toggle refused".into()));
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    fn commit(&mut self) -> Result<(), MockDbError> {
        self.journal.push(Event::Commit);
        if self.faults.commit {
            return Err(MockDbError("commit refused".into()));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), MockDbError> {
        self.journal.push(Event::Rollback);
        if self.faults.rollback {
            return Err(MockDbError("rollback refused".into()));
        }
        Ok(())
    }

    fn close(self) -> Result<(), MockDbError> {
        self.journal.push(Event::Close);
        if self.faults.close {
            return Err(MockDbError("close refused".into()));
        }
        Ok(())
    }
}

pub struct MockQueries {
    journal: Journal,
    failing: Vec<(&'static str, usize)>,
    calls: RefCell<HashMap<&'static str, usize>>,
    inserted: Rc<RefCell<Vec<NewMatch>>>,
}

impl MockQueries {
    fn call(&self, name: &'static str) -> Result<(), MockDbError> {
        let nth = {
            let mut calls = self.calls.borrow_mut();
            let n = calls.entry(name).or_insert(0);
            *n += 1;
            *n
        };
        if self.failing.contains(&(name, nth)) {
            self.journal.push(Event::QueryFailed(name));
            return Err(MockDbError(format!("{} call {} rejected", name, nth)));
        }
        self.journal.push(Event::Query(name));
        Ok(())
    }
}

impl QueryService<MockConnection> for MockQueries {
    fn list_top_scorers(&self, _: &mut MockConnection, _: i32) -> Result<Vec<TopScorer>, MockDbError> {
        self.call("list_top_scorers").map(|_| Vec::new())
    }

    fn list_schedule(&self, _: &mut MockConnection, _: i32) -> Result<Vec<Fixture>, MockDbError> {
        self.call("list_schedule").map(|_| Vec::new())
    }

    fn insert_match(&self, _: &mut MockConnection, new_match: &NewMatch) -> Result<i64, MockDbError> {
        self.call("insert_match")?;
        let mut inserted = self.inserted.borrow_mut();
        inserted.push(new_match.clone());
        Ok(inserted.len() as i64)
    }

    fn update_match_score(
        &self,
        _: &mut MockConnection,
        _: i64,
        _: u32,
        _: u32,
    ) -> Result<usize, MockDbError> {
        self.call("update_match_score").map(|_| 1)
    }

    fn lineup(&self, _: &mut MockConnection, _: i64, _: i32) -> Result<Vec<LineupEntry>, MockDbError> {
        self.call("lineup").map(|_| Vec::new())
    }

    fn team_membership(
        &self,
        _: &mut MockConnection,
        _: i64,
        _: i32,
    ) -> Result<Option<Membership>, MockDbError> {
        self.call("team_membership").map(|_| None)
    }

    fn validate_match(&self, _: &mut MockConnection, match_id: i64) -> Result<MatchValidation, MockDbError> {
        self.call("validate_match").map(|_| MatchValidation {
            match_id,
            home_score: Some(1),
            away_score: Some(0),
            home_goals: 1,
            away_goals: 0,
        })
    }
}

pub struct Harness {
    pub runner: SessionRunner<MockDriver, MockQueries>,
    pub journal: Journal,
    pub inserted: Rc<RefCell<Vec<NewMatch>>>,
}

pub fn harness(faults: Faults) -> Harness {
    let journal = Journal::default();
    let inserted = Rc::new(RefCell::new(Vec::new()));
    let queries = MockQueries {
        journal: journal.clone(),
        failing: faults.queries.clone(),
        calls: RefCell::new(HashMap::new()),
        inserted: inserted.clone(),
    };
    let driver = MockDriver {
        journal: journal.clone(),
        faults,
    };
    Harness {
        runner: SessionRunner::new(driver, queries, ConnectionConfig::new("mock://league")),
        journal,
        inserted,
    }
}

/// Events after the connection is open
pub fn session_events(journal: &Journal) -> Vec<Event> {
    journal
        .events()
        .into_iter()
        .skip_while(|e| matches!(e, Event::Load | Event::Connect))
        .collect()
}
