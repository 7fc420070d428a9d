use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fxstream_client::config;
use fxstream_client::session::load_persisted;
use fxstream_client::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(about = "Print the session saved in the local store")]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Store URL; defaults to DATABASE_URL or the configured data dir
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let database_url = match args.database_url {
        Some(url) => url,
        None => {
            let cfg = config::load(Some(&args.config))?;
            std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.storage.database_url())
        }
    };
    let store = SqliteStore::connect(&database_url).await?;

    println!("Store: {}", database_url);
    println!("Entries:");
    for (key, updated_at) in store.entries().await? {
        println!("  {} (updated {})", key, updated_at);
    }

    match load_persisted(&store).await? {
        Some(session) => {
            let user = session.user;
            println!("Session: active");
            println!("  id: {}", user.id);
            println!("  name: {}", user.full_name);
            println!("  email: {}", user.email);
            println!("  role: {}", user.role.as_str());
            println!("  token: [REDACTED] ({} chars)", session.token.len());
        }
        None => println!("Session: none"),
    }
    Ok(())
}
