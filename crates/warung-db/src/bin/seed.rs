//! # Seed Data Generator
//!
//! Fills a fresh database with a small warung catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p warung-db --bin seed
//! cargo run -p warung-db --bin seed -- --db ./data/warung.db
//! ```
//!
//! Creates the category and unit lists, one product per catalog row with a
//! deterministic stock level (a few deliberately low), and a "Daily needs"
//! storefront section featuring the first staples.

use chrono::Utc;
use std::env;
use uuid::Uuid;
use warung_core::{Product, StorefrontSection};
use warung_db::{Database, DbConfig};

/// (category, unit, name, price)
const CATALOG: &[(&str, &str, &str, i64)] = &[
    ("Sembako", "kg", "Beras Pandan Wangi", 14000),
    ("Sembako", "kg", "Gula Pasir", 17500),
    ("Sembako", "liter", "Minyak Goreng", 18000),
    ("Sembako", "butir", "Telur Ayam", 2200),
    ("Sembako", "kg", "Tepung Terigu", 12000),
    ("Mie", "bungkus", "Indomie Goreng", 3500),
    ("Mie", "bungkus", "Indomie Soto", 3300),
    ("Mie", "bungkus", "Mie Sedaap Kari", 3300),
    ("Minuman", "botol", "Teh Botol Sosro", 5000),
    ("Minuman", "botol", "Aqua 600ml", 4000),
    ("Minuman", "sachet", "Kopi Kapal Api", 1500),
    ("Minuman", "kaleng", "Susu Bear Brand", 11000),
    ("Bumbu", "sachet", "Royco Ayam", 500),
    ("Bumbu", "botol", "Kecap Bango", 9500),
    ("Bumbu", "botol", "Saus Sambal ABC", 8000),
    ("Kebersihan", "batang", "Sabun Lifebuoy", 4500),
    ("Kebersihan", "sachet", "Rinso Cair", 1000),
    ("Kebersihan", "pcs", "Pasta Gigi Pepsodent", 12500),
    ("Rokok", "bungkus", "Gudang Garam Filter", 26000),
    ("Gas", "tabung", "LPG 3kg", 22000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./warung_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Warung POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./warung_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Warung POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut categories: Vec<&str> = CATALOG.iter().map(|(c, ..)| *c).collect();
    categories.dedup();
    for name in &categories {
        db.categories().add(name).await?;
    }

    let mut units: Vec<&str> = CATALOG.iter().map(|(_, u, ..)| *u).collect();
    units.sort_unstable();
    units.dedup();
    for name in &units {
        db.units().add(name).await?;
    }
    println!("✓ {} categories, {} units", categories.len(), units.len());

    let mut staples = Vec::new();
    for (seed, (category, unit, name, price)) in CATALOG.iter().enumerate() {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: category.to_string(),
            unit: unit.to_string(),
            price: *price,
            // Every fourth product starts low so the dashboard has something to show
            stock: if seed % 4 == 3 { (seed % 5) as i64 } else { 10 + (seed * 7 % 40) as i64 },
            image_url: None,
            created_at: Utc::now(),
        };

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        if *category == "Sembako" {
            staples.push(product.id.clone());
        }
    }
    println!("✓ {} products", db.products().count().await?);

    db.sections()
        .upsert(&StorefrontSection {
            id: Uuid::new_v4().to_string(),
            name: "Daily needs".to_string(),
            display_order: 0,
            product_ids: staples,
        })
        .await?;
    println!("✓ Storefront section created");

    let low = db.products().below_stock(warung_core::DEFAULT_LOW_STOCK_THRESHOLD, 5).await?;
    println!("  Low stock: {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
