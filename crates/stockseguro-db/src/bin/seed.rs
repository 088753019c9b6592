//! # Seed
//!
//! Prepares a database for the store: demo catalog plus a demo worker.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (platform data dir)
//! cargo run -p stockseguro-db --bin seed
//!
//! # Specific file
//! cargo run -p stockseguro-db --bin seed -- --db ./stockseguro_dev.db
//!
//! # Replace the catalog with the seed list (same as RESET_CATALOG=1)
//! cargo run -p stockseguro-db --bin seed -- --reset
//! ```
//!
//! The catalog is only seeded when `products` is empty, and the demo worker
//! only when `workers` is empty, so running this twice changes nothing.

use std::env;
use std::path::PathBuf;

use tracing::{info, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use stockseguro_db::catalog::{replace_with_seed, seed_if_empty};
use stockseguro_db::{Database, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = StoreConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--reset" | "-r" => config.reset_catalog = true,
            "--help" | "-h" => {
                println!("Stock Seguro seed");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: STOCKSEGURO_DB_PATH or data dir)");
                println!("  -r, --reset        Replace the catalog with the seed list");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stock Seguro seed");
    println!("====================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected, migrations applied");

    if config.reset_catalog {
        let deactivated = replace_with_seed(&db).await?;
        println!("✓ Catalog replaced ({} products deactivated)", deactivated);
    } else {
        let inserted = seed_if_empty(&db).await?;
        if inserted > 0 {
            println!("✓ Seeded {} products", inserted);
        } else {
            println!("⚠ Catalog already has products, skipping seed");
        }
    }

    let workers = db.workers();
    if workers.count().await? == 0 {
        let demo = &config.demo_worker;
        let worker = workers
            .register(&demo.rut, &demo.name, &demo.email, &demo.pin)
            .await?;
        info!(worker_id = worker.id, "Demo worker created");
        println!("✓ Demo worker created");
        println!("   EMAIL: {}", worker.email);
        println!("   PIN:   {}", demo.pin);
        println!("   RUT:   {}", worker.rut);
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,stockseguro=debug,sqlx=warn";

/// `RUST_LOG` wins; otherwise info, with debug for our crates.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    subscriber(filter).init();
}

fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(filter).finish()
}
