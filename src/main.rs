use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use gdoc_press::config;
use gdoc_press::db;
use gdoc_press::startup::{self, AppState};
use gdoc_press::web;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let pool = db::init_pool(&cfg.database.url).await?;
    db::run_migrations(&pool).await?;

    let source = startup::drive_source(&cfg).await?;
    let state = match AppState::bootstrap(&cfg, pool, source).await {
        Ok(state) => state,
        Err(err) => {
            error!(%err, "startup failed");
            std::process::exit(1);
        }
    };

    let listener = tokio::net::TcpListener::bind(cfg.site.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", cfg.site.bind))?;
    info!(addr = %cfg.site.bind, folder = %state.folder.name, "serving site");
    axum::serve(listener, web::router(state)).await?;
    Ok(())
}
