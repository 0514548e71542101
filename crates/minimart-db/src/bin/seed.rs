//! # Seed Data Generator
//!
//! Populates the database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p minimart-db --bin seed
//!
//! # Specify database path
//! cargo run -p minimart-db --bin seed -- --db ./data/minimart.db
//! ```
//!
//! ## Generated Data
//! - A mini-mart catalog (biscuits, noodles, staples, toiletries, drinks)
//!   with realistic MRP/selling-price gaps and GST slabs
//! - A pair of loyalty customers
//! - Store profile settings used by receipt rendering

use std::env;

use tracing_subscriber::EnvFilter;

use minimart_db::repository::customer::new_customer;
use minimart_db::repository::product::new_product;
use minimart_db::{Database, DbConfig};

/// name, brand, hsn, barcode, mrp, selling, gst bps, inclusive, stock
#[allow(clippy::type_complexity)]
const CATALOG: &[(&str, &str, &str, Option<&str>, i64, Option<i64>, u32, bool, i64)] = &[
    ("Parle-G Gold 250g", "Parle", "190531", Some("8901063010116"), 3000, Some(2800), 1800, true, 60),
    ("Maggi Noodles 70g", "Nestle", "190230", Some("8901058000290"), 1400, None, 1200, true, 80),
    ("Tata Salt 1kg", "Tata", "250100", Some("8904043900021"), 2800, Some(2500), 0, true, 40),
    ("Madhur Sugar 1kg", "Madhur", "170199", None, 4800, Some(4500), 500, true, 35),
    ("Aashirvaad Atta 5kg", "ITC", "110100", Some("8901725133481"), 27500, Some(26000), 500, true, 20),
    ("Lux Soap 100g", "Unilever", "340111", Some("8901030687898"), 3500, Some(3200), 1800, true, 50),
    ("Colgate Strong Teeth 100g", "Colgate", "330610", Some("8901314010322"), 6500, Some(6000), 1800, true, 30),
    ("Coca-Cola 750ml", "Coca-Cola", "220210", Some("8901764070016"), 4000, None, 2800, true, 45),
    ("Amul Milk 500ml", "Amul", "040120", None, 2700, None, 0, true, 25),
    ("Loose Rice per kg", "Local", "100630", None, 5500, Some(5000), 500, false, 100),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./minimart_dev.db");

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
                println!("Minimart POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./minimart_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Minimart POS Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let mut seeded = 0;
    for (name, brand, hsn, barcode, mrp, selling, bps, incl, stock) in CATALOG {
        let product = new_product(name, brand, hsn, *barcode, *mrp, *selling, *bps, *incl, *stock);
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }
        seeded += 1;
    }
    println!("✓ Seeded {} products", seeded);

    db.customers()
        .insert(&new_customer("Asha Patel", "9876543210", Some("asha@example.com")))
        .await?;
    db.customers()
        .insert(&new_customer("Ravi Kumar", "9812345678", None))
        .await?;
    println!("✓ Seeded 2 customers");

    for (key, value) in [
        ("store_name", "NATIONAL MINI MART"),
        ("store_tagline", "Your Trusted Store"),
        ("store_address", "Shop 4, Market Road"),
        ("store_phone", "080-12345678"),
        ("store_gstin", "29ABCDE1234F1Z5"),
        ("receipt_footer", "Thank You! Visit Again!"),
    ] {
        db.settings().upsert(key, value).await?;
    }
    println!("✓ Seeded store settings");

    let hits = db.products().search("parle", 10).await?;
    println!();
    println!("  Search 'parle': {} results", hits.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
