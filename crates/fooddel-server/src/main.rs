//! FoodDel — food-delivery REST API server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use fooddel_server::{build_router, AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("FOODDEL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn open_store(
    data_dir: &Path,
) -> anyhow::Result<(fooddel_core::FoodDelConfig, fooddel_store::SqliteStore)> {
    let config = fooddel_core::FoodDelConfig::from_env(data_dir)?;
    let store = fooddel_store::SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
    Ok((config, store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--seed" | "seed" => {
                let data_dir = if args.len() > 2 {
                    PathBuf::from(&args[2])
                } else {
                    resolve_data_dir()
                };
                let (_, store) = open_store(&data_dir)?;
                let inserted = fooddel_store::seed::seed_sample_data(&store)
                    .map_err(|e| anyhow::anyhow!("Seeding failed: {}", e))?;
                println!("Inserted {} sample restaurants into {}", inserted, store.db_path().display());
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("FoodDel — food-delivery API server");
                println!();
                println!("Usage: fooddel [command]");
                println!();
                println!("Commands:");
                println!("  (none)              Start the server");
                println!("  seed [data-dir]     Insert sample restaurants and menus");
                println!("  help                Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT                      HTTP port (default 5000)");
                println!("  FOODDEL_DATA_DIR          Data directory (default ./data)");
                println!("  FOODDEL_TOKEN_TTL_HOURS   Bearer token lifetime (default 24)");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'fooddel help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let (config, store) = open_store(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config, store));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("FoodDel server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
