use chrono::Datelike;
use rusqlite::params;

use super::{
    Fixture, LineupEntry, MatchValidation, Membership, NewMatch, QueryService, TopScorer,
};
use crate::sqlite::SqliteConnection;

const TOP_SCORERS: &str = "
    SELECT p.id, p.first_name || ' ' || p.last_name, COUNT(g.id) AS goals
    FROM goal g
    JOIN fixture f ON f.id = g.fixture_id
    JOIN player p ON p.id = g.player_id
    WHERE f.season = ?1 AND g.own_goal = 0
    GROUP BY p.id
    ORDER BY goals DESC, p.last_name, p.first_name";

const SCHEDULE: &str = "
    SELECT f.id, f.kickoff, f.round, h.name, a.name, f.home_score, f.away_score
    FROM fixture f
    JOIN team h ON h.id = f.home_team_id
    JOIN team a ON a.id = f.away_team_id
    WHERE f.season = ?1
    ORDER BY f.round, f.kickoff";

const INSERT_MATCH: &str = "
    INSERT INTO fixture (kickoff, season, round, home_team_id, away_team_id, home_score)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const UPDATE_SCORE: &str = "UPDATE fixture SET home_score = ?2, away_score = ?3 WHERE id = ?1";

const LINEUP: &str = "
    SELECT p.id, p.first_name || ' ' || p.last_name, r.shirt_number
    FROM roster r
    JOIN player p ON p.id = r.player_id
    WHERE r.team_id = ?1 AND r.season = ?2
    ORDER BY r.shirt_number";

const MEMBERSHIP: &str = "
    SELECT t.id, t.name, r.shirt_number
    FROM roster r
    JOIN team t ON t.id = r.team_id
    WHERE r.player_id = ?1 AND r.season = ?2";

// A goal counts for the scorer's team, or for the opponent when it is an own goal.
const VALIDATE_MATCH: &str = "
    SELECT f.home_score, f.away_score,
        COALESCE(SUM(CASE WHEN (r.team_id = f.home_team_id) <> (g.own_goal = 1) THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN (r.team_id = f.away_team_id) <> (g.own_goal = 1) THEN 1 ELSE 0 END), 0)
    FROM fixture f
    LEFT JOIN goal g ON g.fixture_id = f.id
    LEFT JOIN roster r ON r.player_id = g.player_id AND r.season = f.season
    WHERE f.id = ?1
    GROUP BY f.id";

/// League queries as plain parameterized statements
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQueryService;

impl SqliteQueryService {
    pub fn new() -> Self {
        Self
    }
}

impl QueryService<SqliteConnection> for SqliteQueryService {
    fn list_top_scorers(
        &self,
        conn: &mut SqliteConnection,
        season: i32,
    ) -> rusqlite::Result<Vec<TopScorer>> {
        conn.query(TOP_SCORERS, params![season], |row| {
            Ok(TopScorer {
                player_id: row.get(0)?,
                name: row.get(1)?,
                goals: row.get(2)?,
            })
        })
    }

    fn list_schedule(&self, conn: &mut SqliteConnection, season: i32) -> rusqlite::Result<Vec<Fixture>> {
        conn.query(SCHEDULE, params![season], |row| {
            Ok(Fixture {
                match_id: row.get(0)?,
                kickoff: row.get(1)?,
                round: row.get(2)?,
                home_team: row.get(3)?,
                away_team: row.get(4)?,
                home_score: row.get(5)?,
                away_score: row.get(6)?,
            })
        })
    }

    fn insert_match(&self, conn: &mut SqliteConnection, new_match: &NewMatch) -> rusqlite::Result<i64> {
        conn.execute(
            INSERT_MATCH,
            params![
                new_match.kickoff,
                new_match.kickoff.year(),
                new_match.round,
                new_match.home_team_id,
                new_match.away_team_id,
                new_match.home_score,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_match_score(
        &self,
        conn: &mut SqliteConnection,
        match_id: i64,
        home_score: u32,
        away_score: u32,
    ) -> rusqlite::Result<usize> {
        conn.execute(UPDATE_SCORE, params![match_id, home_score, away_score])
    }

    fn lineup(
        &self,
        conn: &mut SqliteConnection,
        team_id: i64,
        season: i32,
    ) -> rusqlite::Result<Vec<LineupEntry>> {
        conn.query(LINEUP, params![team_id, season], |row| {
            Ok(LineupEntry {
                player_id: row.get(0)?,
                name: row.get(1)?,
                shirt_number: row.get(2)?,
            })
        })
    }

    fn team_membership(
        &self,
        conn: &mut SqliteConnection,
        player_id: i64,
        season: i32,
    ) -> rusqlite::Result<Option<Membership>> {
        let rows = conn.query(MEMBERSHIP, params![player_id, season], |row| {
            Ok(Membership {
                team_id: row.get(0)?,
                team_name: row.get(1)?,
                shirt_number: row.get(2)?,
            })
        })?;
        Ok(rows.into_iter().next())
    }

    fn validate_match(&self, conn: &mut SqliteConnection, match_id: i64) -> rusqlite::Result<MatchValidation> {
        conn.query_row(VALIDATE_MATCH, params![match_id], |row| {
            Ok(MatchValidation {
                match_id,
                home_score: row.get(0)?,
                away_score: row.get(1)?,
                home_goals: row.get(2)?,
                away_goals: row.get(3)?,
            })
        })
    }
}
