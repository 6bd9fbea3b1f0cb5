use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use league_session::schema::{initialize_schema, is_seeded, seed_sample_data};
use league_session::{
    AppConfig, Connection, Driver, SessionOutcome, SessionRunner, SqliteDriver, SqliteQueryService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Autonomous,
    Transactional,
    Both,
}

/// Run the league sessions against a SQLite database
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(short, long, default_value = "league.toml")]
    config: PathBuf,

    /// Create the schema and load the sample league first
    #[arg(long)]
    bootstrap: bool,

    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    if cli.bootstrap {
        bootstrap(&config)?;
    }

    let runner = SessionRunner::new(SqliteDriver::new(), SqliteQueryService::new(), config.connection);

    if matches!(cli.mode, Mode::Autonomous | Mode::Both) {
        let outcome = runner.run(&config.scenario.autonomous);
        summarize("autonomous", &outcome);
    }
    if matches!(cli.mode, Mode::Transactional | Mode::Both) {
        let outcome = runner.run_transactional(&config.scenario.transactional);
        summarize("transactional", &outcome);
    }
    Ok(())
}

fn bootstrap(config: &AppConfig) -> Result<()> {
    let conn = SqliteDriver::new()
        .connect(&config.connection)
        .with_context(|| format!("Failed to open database {:?}", config.connection.url))?;
    initialize_schema(conn.raw()).context("Failed to create schema")?;
    if is_seeded(conn.raw())? {
        info!("sample data already present");
    } else {
        seed_sample_data(conn.raw()).context("Failed to seed sample data")?;
    }
    conn.close().context("Failed to close database")?;
    info!(url = %config.connection.url, "database bootstrapped");
    Ok(())
}

fn summarize(session: &str, outcome: &SessionOutcome) {
    if outcome.is_success() {
        info!(session, resolution = ?outcome.resolution, executed = outcome.executed, "session finished");
    } else {
        warn!(
            session,
            resolution = ?outcome.resolution,
            executed = outcome.executed,
            cleanup_failures = outcome.cleanup_failures.len(),
            "session failed"
        );
    }
}
