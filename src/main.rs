use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_inventory_server::file_auth_store::FileAuthStore;
use music_inventory_server::inventory::{InventoryRepository, JsonFileStore};
use music_inventory_server::server::{run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the JSON inventory file.
    #[clap(value_parser = parse_path)]
    pub inventory_path: PathBuf,

    /// Path to the JSON file to use for credentials and session tokens.
    #[clap(long, value_parser = parse_path)]
    pub auth_store_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let auth_store_path = match cli_args.auth_store_path {
        Some(path) => path,
        None => FileAuthStore::infer_path()
            .context("No auth store path given and no auth_store.json found")?,
    };

    info!("Opening inventory file at {:?}...", cli_args.inventory_path);
    let repository =
        InventoryRepository::new(Box::new(JsonFileStore::new(cli_args.inventory_path)));

    info!("Opening auth store at {:?}...", auth_store_path);
    let auth_store = Box::new(FileAuthStore::initialize(auth_store_path));

    info!("Ready to serve at port {}!", cli_args.port);
    run_server(
        repository,
        auth_store,
        cli_args.logging_level,
        cli_args.port,
    )
    .await
}
