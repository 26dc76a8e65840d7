use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use draftleague::api;
use draftleague::client::LeagueClient;
use draftleague::config::ServerConfig;

#[derive(Parser)]
#[command(name = "dleague")]
#[command(about = "Season server for music draft leagues")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the league server
    Serve {
        /// Port for HTTP API (overrides DRAFTLEAGUE_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Database file (overrides DRAFTLEAGUE_DB)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Create or upgrade the database schema and exit
    Migrate {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Check whether a server is reachable
    Status,
    /// List the checkpoints a season can be rolled back to
    Checkpoints { season: Uuid },
    /// Move a season forward to the named phase
    Advance {
        season: Uuid,
        target: String,
        /// The acting commissioner
        #[arg(long)]
        actor: Uuid,
    },
    /// Roll a season back to a checkpoint such as DRAFT or WEEK_2
    Rollback {
        season: Uuid,
        checkpoint: String,
        #[arg(long)]
        actor: Uuid,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(
        |_| "draftleague=debug,draftleague_core=debug,tower_http=debug".into(),
    ));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = config.open_database()?;
    let app = api::create_router_with_security(db, config.security());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("League server listening on http://{}", addr);
    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ServerConfig::from_env();

    match cli.command {
        Some(Commands::Serve { port, db }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if db.is_some() {
                config.db_path = db;
            }
            serve(config).await?;
        }
        Some(Commands::Migrate { db }) => {
            if db.is_some() {
                config.db_path = db;
            }
            config.open_database()?;
            println!("Database is up to date");
        }
        Some(Commands::Status) => {
            let client = LeagueClient::from_env();
            match client.health().await {
                Ok(_) => println!("Server at {} is up", client.base_url()),
                Err(e) => println!("Server at {} is not reachable: {}", client.base_url(), e),
            }
        }
        Some(Commands::Checkpoints { season }) => {
            let client = LeagueClient::from_env();
            for checkpoint in client.checkpoints(season).await? {
                println!(
                    "{:<24} {} week {}",
                    checkpoint.id, checkpoint.target.phase, checkpoint.target.week
                );
            }
        }
        Some(Commands::Advance {
            season,
            target,
            actor,
        }) => {
            let client = LeagueClient::from_env();
            let season = client.advance_phase(season, &target, actor).await?;
            println!(
                "Season {} is now in {} (week {})",
                season.name, season.current_phase, season.current_week
            );
        }
        Some(Commands::Rollback {
            season,
            checkpoint,
            actor,
        }) => {
            let client = LeagueClient::from_env();
            let report = client.rollback(season, &checkpoint, actor).await?;
            println!(
                "Rolled back to {}: {} week {} -> {} week {} ({} rows)",
                report.checkpoint,
                report.from.phase,
                report.from.week,
                report.to.phase,
                report.to.week,
                report.rows_affected
            );
        }
        None => serve(config).await?,
    }

    Ok(())
}
