//! Taskboard
//!
//! Server-rendered task board: create tasks, mark them done, delete them.

use anyhow::Result;
use clap::Parser;
use taskboard::cli::{Cli, Command};
use taskboard::config::Config;
use taskboard::db::Database;
use taskboard::logging::{self, LogTarget};
use taskboard::readiness::{self, GateOutcome};
use taskboard::web::{self, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.ensure_db_dir()?;

    match cli.command {
        Some(Command::InitDb) => {
            Database::open(&config.database.path)?;
            info!(path = %config.database.path.display(), "Database schema ready");
        }
        Some(Command::Serve) | None => run_server(config).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let db = Database::connect_lazy(&config.database.path);

    // Schema must exist (or the gate must have given up) before the listener is bound.
    match readiness::wait_for_store(&db, &config.readiness).await? {
        GateOutcome::Ready { attempts } => {
            info!(attempts, path = ?db.path(), "Database ready");
        }
        GateOutcome::Exhausted { attempts } => {
            warn!(
                attempts,
                "Serving without a verified schema; requests may fail until the database is reachable"
            );
        }
    }

    let state = AppState::new(db, config.server.routes);
    let server = web::start_server(state, config.server.socket_addr()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    server.shutdown().await;

    Ok(())
}
