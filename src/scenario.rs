//! Operation lists run by a session, and the kickoff literal format.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ApplicationError, Result};
use crate::queries::NewMatch;

/// `dd/MM/yyyy HH:mm`; single-digit day and month are accepted.
pub const KICKOFF_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn parse_kickoff(literal: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(literal.trim(), KICKOFF_FORMAT)
}

/// One query service call with literal arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    ListTopScorers {
        season: i32,
    },
    ListSchedule {
        season: i32,
    },
    InsertMatch {
        kickoff: String,
        round: u32,
        home_team_id: i64,
        away_team_id: i64,
        home_score: u32,
    },
    UpdateMatchScore {
        match_id: i64,
        home_score: u32,
        away_score: u32,
    },
    Lineup {
        team_id: i64,
        season: i32,
    },
    TeamMembership {
        player_id: i64,
        season: i32,
    },
    ValidateMatch {
        match_id: i64,
    },
}

/// An [`Operation`] with its literals parsed, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    ListTopScorers { season: i32 },
    ListSchedule { season: i32 },
    InsertMatch(NewMatch),
    UpdateMatchScore { match_id: i64, home_score: u32, away_score: u32 },
    Lineup { team_id: i64, season: i32 },
    TeamMembership { player_id: i64, season: i32 },
    ValidateMatch { match_id: i64 },
}

impl Statement {
    pub fn name(&self) -> &'static str {
        match self {
            Statement::ListTopScorers { .. } => "list_top_scorers",
            Statement::ListSchedule { .. } => "list_schedule",
            Statement::InsertMatch(_) => "insert_match",
            Statement::UpdateMatchScore { .. } => "update_match_score",
            Statement::Lineup { .. } => "lineup",
            Statement::TeamMembership { .. } => "team_membership",
            Statement::ValidateMatch { .. } => "validate_match",
        }
    }
}

impl Operation {
    /// Parse literal arguments. A bad kickoff is an `Internal` error.
    pub fn resolve(&self) -> Result<Statement> {
        let statement = match self {
            Operation::ListTopScorers { season } => Statement::ListTopScorers { season: *season },
            Operation::ListSchedule { season } => Statement::ListSchedule { season: *season },
            Operation::InsertMatch {
                kickoff,
                round,
                home_team_id,
                away_team_id,
                home_score,
            } => {
                let kickoff = parse_kickoff(kickoff).map_err(|e| {
                    ApplicationError::internal(format!("internal error: bad kickoff {:?}", kickoff), e)
                })?;
                Statement::InsertMatch(NewMatch {
                    kickoff,
                    round: *round,
                    home_team_id: *home_team_id,
                    away_team_id: *away_team_id,
                    home_score: *home_score,
                })
            }
            Operation::UpdateMatchScore {
                match_id,
                home_score,
                away_score,
            } => Statement::UpdateMatchScore {
                match_id: *match_id,
                home_score: *home_score,
                away_score: *away_score,
            },
            Operation::Lineup { team_id, season } => Statement::Lineup {
                team_id: *team_id,
                season: *season,
            },
            Operation::TeamMembership { player_id, season } => Statement::TeamMembership {
                player_id: *player_id,
                season: *season,
            },
            Operation::ValidateMatch { match_id } => Statement::ValidateMatch { match_id: *match_id },
        };
        Ok(statement)
    }
}

/// Resolve every operation, stopping at the first bad literal.
pub fn resolve_all(operations: &[Operation]) -> Result<Vec<Statement>> {
    operations.iter().map(Operation::resolve).collect()
}

/// Every query once, each in its own transaction.
pub fn autonomous_reference() -> Vec<Operation> {
    vec![
        Operation::ListTopScorers { season: 2020 },
        Operation::ListSchedule { season: 2020 },
        Operation::InsertMatch {
            kickoff: "30/09/2020 11:30".to_string(),
            round: 1,
            home_team_id: 1,
            away_team_id: 2,
            home_score: 1,
        },
        Operation::UpdateMatchScore {
            match_id: 1,
            home_score: 5,
            away_score: 6,
        },
        Operation::Lineup {
            team_id: 1,
            season: 2020,
        },
        Operation::TeamMembership {
            player_id: 1,
            season: 2020,
        },
        Operation::ValidateMatch { match_id: 1 },
    ]
}

/// The same insert twice; the second one conflicts and forces a rollback.
pub fn transactional_reference() -> Vec<Operation> {
    let insert = Operation::InsertMatch {
        kickoff: "30/9/2020 16:15".to_string(),
        round: 1,
        home_team_id: 1,
        away_team_id: 2,
        home_score: 1,
    };
    vec![insert.clone(), insert]
}
