use std::path::PathBuf;

use clap::{Parser, Subcommand};
use diesel::prelude::*;
use tracing_subscriber::EnvFilter;
use tunevote::{
    challenges::Challenge,
    config::{AppConfig, create_app, make_pool, run_migrations},
    schema::{categories, challenges, votes},
};

#[derive(Parser)]
#[command(name = "tunevote", about = "Run the song contest voting server.")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web interface (the default).
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Apply pending database migrations and exit.
    Migrate,
    /// Check that the database is reachable and print what it contains.
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    tracing::info!(location = %config.database_url, "opening database");
    let pool = make_pool(&config.database_url)?;
    run_migrations(&pool)?;

    match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let app = create_app(pool, config)?;
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            tracing::info!("listening on {bind}");
            axum::serve(listener, app).await?;
        }
        Command::Migrate => {}
        Command::Check => {
            let mut conn = pool.get()?;
            let n_challenges =
                challenges::table.count().get_result::<i64>(&mut conn)?;
            let n_categories =
                categories::table.count().get_result::<i64>(&mut conn)?;
            let n_votes = votes::table.count().get_result::<i64>(&mut conn)?;
            println!("challenges: {n_challenges}");
            println!("categories: {n_categories}");
            println!("votes:      {n_votes}");
            match Challenge::get_active(&mut conn)? {
                Some(active) => println!(
                    "active:     #{} {} ({})",
                    active.number, active.title, active.id
                ),
                None => println!("active:     none"),
            }
        }
    }

    Ok(())
}
