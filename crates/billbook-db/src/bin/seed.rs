//! # Demo Data Seeder
//!
//! Writes the demo business into a Billbook database and audits the result.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database (skipped if already seeded)
//! cargo run -p billbook-db --bin seed
//!
//! # Replace existing data with the demo set
//! cargo run -p billbook-db --bin seed -- --force
//!
//! # Specify database path
//! cargo run -p billbook-db --bin seed -- --db ./data/billbook.db
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::env;
use std::path::PathBuf;

use billbook_db::{audit, seed_demo_data, BillbookConfig, Database, RecordStore, SeedOutcome};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut force = false;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--force" => force = true,
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Billbook Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -f, --force          Replace existing data with the demo set");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("  -c, --config <PATH>  Config file path");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = BillbookConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.db_path = path;
    }

    println!("Billbook Demo Data Seeder");
    println!("=========================");
    println!("Database: {}", config.db_path.display());
    println!();

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.to_db_config()).await?;
    let store = RecordStore::new(db);

    match seed_demo_data(&store, force).await? {
        SeedOutcome::Seeded {
            products,
            customers,
            invoices,
        } => {
            println!(
                "✓ Seeded {} products, {} customers, {} invoices",
                products, customers, invoices
            );
        }
        SeedOutcome::AlreadySeeded => {
            println!("⚠ Database is already seeded.");
            println!("  Run with --force to replace it with the demo data.");
        }
    }

    let settings = store.settings().await?;
    println!("  Next invoice: {}", settings.next_invoice_no());

    let report = audit::audit(&store).await?;
    println!();
    if report.is_clean() {
        println!("✓ Audit clean ({} invoices)", report.invoices_checked);
    } else {
        println!("✗ Audit found {} problem(s):", report.findings.len());
        for finding in &report.findings {
            println!("  - {}", finding);
        }
    }

    store.into_backend().close().await;
    Ok(())
}
