use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use gdoc_press::config;
use gdoc_press::db;
use gdoc_press::startup;
use gdoc_press::sync;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fetch the named documents from the Drive folder and publish them"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Document name to publish (repeatable)
    #[arg(long = "name")]
    names: Vec<String>,

    /// Comma-separated document names
    #[arg(long, default_value = "")]
    csv: String,
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

    let names = sync::collect_names(&args.names, &args.csv);
    if names.is_empty() {
        info!("no names given, nothing to sync");
        return Ok(());
    }

    let pool = db::init_pool(&cfg.database.url).await?;
    db::run_migrations(&pool).await?;
    let source = startup::drive_source(&cfg).await?;
    let folder = startup::resolve_folder(source.as_ref(), &cfg.site.folder_name).await?;

    let report = sync::sync_batch(&pool, source.as_ref(), &folder, &names).await;
    for name in &report.published {
        println!("published  {}", name);
    }
    for name in &report.not_found {
        println!("not found  {}", name);
    }
    for (name, err) in &report.failed {
        println!("failed     {}: {}", name, err);
    }
    if !report.failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
