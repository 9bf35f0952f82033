//! # Seed Data Generator
//!
//! Populates the database with sellable products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p tally-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tally-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Products
//! Products are spread across a few product types (Beverage, Snack, Dairy,
//! Grocery), each in several pack sizes. Every product gets:
//! - Name: `{base name} {size}`
//! - Sale price: Rs.20.00 - Rs.499.00
//! - Purchase price: 60-80% of the sale price
//! - Opening stock: 0 - 100

use std::env;
use tally_core::{Money, NewProduct};
use tally_db::{Database, DbConfig};

/// Base names per product type.
const PRODUCT_TYPES: &[(&str, &[&str])] = &[
    (
        "Beverage",
        &[
            "Green Tea",
            "Black Tea",
            "Instant Coffee",
            "Mango Juice",
            "Orange Juice",
            "Mineral Water",
            "Cola",
            "Lemonade",
        ],
    ),
    (
        "Snack",
        &[
            "Salted Chips",
            "Masala Chips",
            "Chocolate Biscuits",
            "Cream Biscuits",
            "Roasted Peanuts",
            "Nimko Mix",
            "Chocolate Bar",
        ],
    ),
    (
        "Dairy",
        &[
            "Fresh Milk",
            "Yogurt",
            "Butter",
            "Cheddar Cheese",
            "Cream",
            "Eggs",
        ],
    ),
    (
        "Grocery",
        &[
            "Basmati Rice",
            "Wheat Flour",
            "Sugar",
            "Red Lentils",
            "Chickpeas",
            "Cooking Oil",
            "Iodized Salt",
            "Spaghetti",
        ],
    ),
];

/// Pack sizes and the price they add, in paisa.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("250g", 1_500),
    ("500g", 4_000),
    ("1kg", 9_000),
    ("Family Pack", 15_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./tally.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let catalog = db.catalog();
    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (type_idx, (product_type, names)) in PRODUCT_TYPES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = type_idx * 1000 + name_idx * 20 + size_idx;
                let product = generate_product(product_type, name, size, *price_addon, seed);

                if let Err(e) = catalog.add_product(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;
                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let sellable = catalog.list_sellable().await?;
    let in_stock = sellable.iter().filter(|p| p.available_quantity > 0).count();
    println!("  Sellable: {} ({} in stock)", sellable.len(), in_stock);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one product with deterministic pseudo-random data.
fn generate_product(product_type: &str, name: &str, size: &str, price_addon: i64, seed: usize) -> NewProduct {
    // Rs.20.00 - Rs.349.00 before the size addon
    let base_price = 2_000 + ((seed * 37) % 330) as i64 * 100;
    let price_sale = base_price + price_addon;

    // Cost is 60-80% of the sale price
    let cost_pct = 60 + (seed % 21) as i64;
    let price_purchase = price_sale * cost_pct / 100;

    NewProduct {
        name: format!("{} {}", name, size),
        product_type: Some(product_type.to_string()),
        price_sale: Money::from_minor(price_sale),
        price_purchase: Money::from_minor(price_purchase),
        quantity: (seed % 101) as i64,
    }
}
