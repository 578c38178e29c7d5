//! # Seed Data Generator
//!
//! Enrolls demo terminals and opens a pending session on each, so the
//! checkout pages and admin views have something to show.
//!
//! ## Usage
//! ```bash
//! # Enroll 5 devices (default) under the default store
//! cargo run -p tappay-broker-api --bin seed
//!
//! # More devices, spread over a named store
//! cargo run -p tappay-broker-api --bin seed -- --count 20 --store STORE02
//!
//! # Specify database path
//! cargo run -p tappay-broker-api --bin seed -- --db ./data/tappay.db
//! ```
//!
//! Devices go through the registry resolver, so every one of them draws a
//! real terminal code from the store's sequence. Re-running is safe: known
//! devices keep their codes and just get another session.

use std::env;

use tappay_db::{Database, DbConfig};
use tappay_resolver::{DeviceResolver, RegistryResolver, ResolverSettings};

/// Demo charge amounts in minor units, cycled per device.
const DEMO_AMOUNTS: &[i64] = &[350, 1200, 499, 2750, 999];

fn demo_device_id(index: usize) -> String {
    format!("DE:M0:00:00:{:02X}:{:02X}", (index >> 8) & 0xFF, index & 0xFF)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 5;
    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/tappay.db".to_string());
    let mut store: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(5);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    store = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("TapPay Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of demo devices (default: 5)");
                println!("  -s, --store <CODE>   Store to enroll under (default: DEFAULT_STORE_CODE)");
                println!("  -d, --db <PATH>      Database file path (default: ./data/tappay.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("TapPay Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Devices:  {}", count);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");

    let settings = ResolverSettings::from_env();
    let resolver = RegistryResolver::new(&db, settings.defaults.clone(), settings.terminal_format);

    let mut enrolled = 0;
    for index in 0..count {
        let device_id = demo_device_id(index + 1);

        let config = match resolver.resolve(Some(device_id.as_str()), store.as_deref()).await {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to resolve {}: {}", device_id, e);
                continue;
            }
        };
        if config.auto_enrolled {
            enrolled += 1;
        }

        let amount = DEMO_AMOUNTS[index % DEMO_AMOUNTS.len()];
        let session = db
            .sessions()
            .create(&config.terminal_id, amount, &config.currency)
            .await?;

        println!(
            "  {} → {} ({} {}) session {}",
            device_id, config.terminal_id, config.currency, amount, session.id
        );
    }

    println!();
    println!("✓ {} new devices enrolled, {} already known", enrolled, count - enrolled);

    for counter in db.sequences().list().await? {
        println!("  Sequence {}: {}", counter.store_code, counter.last_value);
    }

    db.close().await;
    Ok(())
}
