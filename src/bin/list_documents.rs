use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use gdoc_press::config;
use gdoc_press::db;
use gdoc_press::reconcile;
use gdoc_press::startup;

#[derive(Parser, Debug)]
#[command(about = "Show which folder documents are published, unpublished or orphaned")]
struct Args {
    /// Path to YAML config
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
    let folder = startup::resolve_folder(source.as_ref(), &cfg.site.folder_name).await?;

    let state = reconcile::load(&pool, source.as_ref(), &folder).await?;
    println!("Folder: {} ({})", folder.name, folder.id);
    for doc in &state.active {
        println!("  active     {}", doc.name);
    }
    for doc in &state.available {
        println!("  available  {}", doc.name);
    }
    for name in &state.orphaned {
        println!("  orphaned   {}", name);
    }
    Ok(())
}
