//! Domain operations against the league schema.
//!
//! Implementations raise only the connection's own database error; turning
//! it into an [`ApplicationError`](crate::error::ApplicationError) is the
//! session runner's job.

pub mod sqlite;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::connection::Connection;

pub use sqlite::SqliteQueryService;

/// Arguments of `insert_match`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMatch {
    pub kickoff: NaiveDateTime,
    pub round: u32,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopScorer {
    pub player_id: i64,
    pub name: String,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub match_id: i64,
    pub kickoff: NaiveDateTime,
    pub round: u32,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineupEntry {
    pub player_id: i64,
    pub name: String,
    pub shirt_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub team_id: i64,
    pub team_name: String,
    pub shirt_number: u32,
}

/// Recorded score of a match against the goals logged for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchValidation {
    pub match_id: i64,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl MatchValidation {
    /// True when a score is recorded and it agrees with the goal log
    pub fn is_consistent(&self) -> bool {
        self.home_score == Some(self.home_goals) && self.away_score == Some(self.away_goals)
    }
}

pub trait QueryService<C: Connection> {
    fn list_top_scorers(&self, conn: &mut C, season: i32) -> Result<Vec<TopScorer>, C::Error>;

    fn list_schedule(&self, conn: &mut C, season: i32) -> Result<Vec<Fixture>, C::Error>;

    /// Returns the new match id
    fn insert_match(&self, conn: &mut C, new_match: &NewMatch) -> Result<i64, C::Error>;

    /// Returns the number of rows updated
    fn update_match_score(
        &self,
        conn: &mut C,
        match_id: i64,
        home_score: u32,
        away_score: u32,
    ) -> Result<usize, C::Error>;

    fn lineup(&self, conn: &mut C, team_id: i64, season: i32) -> Result<Vec<LineupEntry>, C::Error>;

    fn team_membership(
        &self,
        conn: &mut C,
        player_id: i64,
        season: i32,
    ) -> Result<Option<Membership>, C::Error>;

    fn validate_match(&self, conn: &mut C, match_id: i64) -> Result<MatchValidation, C::Error>;
}
