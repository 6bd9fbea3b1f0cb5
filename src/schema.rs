//! League schema and the sample data the reference scenarios expect.

use rusqlite::{params, Connection, Result};
use tracing::info;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS team (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    city TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS player (
    id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS roster (
    player_id INTEGER NOT NULL REFERENCES player(id),
    team_id INTEGER NOT NULL REFERENCES team(id),
    season INTEGER NOT NULL,
    shirt_number INTEGER NOT NULL,
    PRIMARY KEY (player_id, season),
    UNIQUE (team_id, season, shirt_number)
);

CREATE TABLE IF NOT EXISTS fixture (
    id INTEGER PRIMARY KEY,
    kickoff TEXT NOT NULL,
    season INTEGER NOT NULL,
    round INTEGER NOT NULL,
    home_team_id INTEGER NOT NULL REFERENCES team(id),
    away_team_id INTEGER NOT NULL REFERENCES team(id),
    home_score INTEGER,
    away_score INTEGER,
    CHECK (home_team_id <> away_team_id),
    UNIQUE (kickoff, home_team_id),
    UNIQUE (kickoff, away_team_id)
);

CREATE TABLE IF NOT EXISTS goal (
    id INTEGER PRIMARY KEY,
    fixture_id INTEGER NOT NULL REFERENCES fixture(id),
    player_id INTEGER NOT NULL REFERENCES player(id),
    minute INTEGER NOT NULL,
    own_goal INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_fixture_season ON fixture(season, round, kickoff);
CREATE INDEX IF NOT EXISTS idx_goal_fixture ON goal(fixture_id);
CREATE INDEX IF NOT EXISTS idx_goal_player ON goal(player_id);
"#;

/// Create every table and index that is missing.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
}

const TEAMS: [(i64, &str, &str); 4] = [
    (1, "Aquile", "L'Aquila"),
    (2, "Grifoni", "Perugia"),
    (3, "Lupi", "Roma"),
    (4, "Falchi", "Pescara"),
];

// (id, first name, last name, team, shirt)
const PLAYERS: [(i64, &str, &str, i64, u32); 8] = [
    (1, "Marco", "Rossi", 1, 9),
    (2, "Luca", "Bianchi", 1, 10),
    (3, "Paolo", "Verdi", 2, 9),
    (4, "Andrea", "Neri", 2, 7),
    (5, "Giorgio", "Gallo", 3, 11),
    (6, "Matteo", "Conti", 3, 1),
    (7, "Stefano", "Greco", 4, 8),
    (8, "Davide", "Bruno", 4, 5),
];

pub const SAMPLE_SEASON: i32 = 2020;

/// True once any team exists
pub fn is_seeded(conn: &Connection) -> Result<bool> {
    conn.query_row("SELECT EXISTS (SELECT 1 FROM team)", [], |row| row.get(0))
}

/// Insert the sample league in a single transaction. Expects an empty schema.
pub fn seed_sample_data(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for (id, name, city) in TEAMS {
        tx.execute(
            "INSERT INTO team (id, name, city) VALUES (?1, ?2, ?3)",
            params![id, name, city],
        )?;
    }
    for (id, first_name, last_name, team_id, shirt) in PLAYERS {
        tx.execute(
            "INSERT INTO player (id, first_name, last_name) VALUES (?1, ?2, ?3)",
            params![id, first_name, last_name],
        )?;
        tx.execute(
            "INSERT INTO roster (player_id, team_id, season, shirt_number) VALUES (?1, ?2, ?3, ?4)",
            params![id, team_id, SAMPLE_SEASON, shirt],
        )?;
    }
    tx.execute(
        "INSERT INTO fixture (id, kickoff, season, round, home_team_id, away_team_id, home_score, away_score)
         VALUES (1, '2020-09-20 15:00:00', ?1, 1, 1, 2, 2, 1)",
        params![SAMPLE_SEASON],
    )?;
    tx.execute_batch(
        "INSERT INTO goal (fixture_id, player_id, minute, own_goal) VALUES (1, 1, 12, 0);
         INSERT INTO goal (fixture_id, player_id, minute, own_goal) VALUES (1, 3, 40, 0);
         INSERT INTO goal (fixture_id, player_id, minute, own_goal) VALUES (1, 1, 77, 0);",
    )?;
    tx.commit()?;
    info!(teams = TEAMS.len(), players = PLAYERS.len(), "sample league seeded");
    Ok(())
}
