//! # Seed Data Generator
//!
//! Initializes a database with the bootstrap users and a demo catalog of a
//! typical Argentine neighborhood almacén.
//!
//! ## Usage
//! ```bash
//! cargo run -p almacen-db --bin seed
//!
//! # Specify database path and admin password
//! cargo run -p almacen-db --bin seed -- --db ./almacen.db --admin-password s3creto
//! ```
//!
//! Safe to re-run: users and catalog are each skipped when already present.
//! Initial stock enters through ENTRADA movements so the ledger matches the
//! stock column from day one.

use std::collections::HashMap;
use std::env;

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use chrono::Utc;
use uuid::Uuid;

use almacen_core::{Customer, Movement, MovementType, Presentation, Product, User, UserRole};
use almacen_db::{Database, DbConfig};

/// Demo catalog. (sku, name, price_centavos, cost_centavos, stock, min_stock)
const PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("YER-PLA-500", "Yerba Mate Playadito 500g", 250_000, 182_000, 40, 10),
    ("YER-ROS-1K", "Yerba Mate Rosamonte 1kg", 420_000, 315_000, 25, 8),
    ("AZU-LED-1K", "Azúcar Ledesma 1kg", 110_000, 78_000, 60, 15),
    ("FID-MAT-500", "Fideos Matarazzo Tallarín 500g", 145_000, 99_000, 48, 12),
    ("FID-LUC-500", "Fideos Lucchetti Mostachol 500g", 130_000, 88_000, 36, 12),
    ("ARR-GAL-1K", "Arroz Gallo Oro 1kg", 165_000, 116_000, 30, 10),
    ("ACE-NAT-900", "Aceite Natura Girasol 900ml", 210_000, 151_000, 24, 8),
    ("HAR-PUR-1K", "Harina Pureza 000 1kg", 95_000, 62_000, 45, 12),
    ("GAL-TER-300", "Galletitas Terrabusi Variedad 300g", 120_000, 81_000, 50, 10),
    ("GAL-CRI-3P", "Criollitas Clásicas Pack x3", 135_000, 92_000, 30, 8),
    ("COC-15L", "Coca-Cola 1.5L", 180_000, 126_000, 72, 24),
    ("AGU-VIL-15L", "Agua Villavicencio 1.5L", 90_000, 56_000, 48, 12),
    ("LEC-SER-1L", "Leche La Serenísima Entera 1L", 135_000, 99_000, 36, 12),
    ("PUR-ARC-520", "Puré de Tomate Arcor 520g", 85_000, 57_000, 40, 10),
    ("LEN-EGR-400", "Lentejas Egran 400g", 105_000, 71_000, 20, 6),
    ("CAF-VIR-250", "Café La Virginia Molido 250g", 290_000, 206_000, 18, 6),
    ("TE-GRE-25", "Té Green Hills x25 saquitos", 95_000, 61_000, 30, 8),
    ("MER-ARC-454", "Mermelada Arcor Durazno 454g", 140_000, 95_000, 22, 6),
    ("JAB-ALA-750", "Jabón Líquido Ala 750ml", 240_000, 171_000, 15, 5),
    ("LAV-AYU-1L", "Lavandina Ayudín 1L", 75_000, 46_000, 28, 8),
    ("PAP-HIG-4", "Papel Higiénico Higienol x4", 160_000, 112_000, 32, 10),
    ("SAL-CEL-500", "Sal Celusal Fina 500g", 60_000, 38_000, 5, 10),
];

/// Pack presentations. (product_sku, name, units_per_presentation, price_centavos)
const PRESENTATIONS: &[(&str, &str, i64, i64)] = &[
    ("COC-15L", "Pack x6", 6, 990_000),
    ("AGU-VIL-15L", "Pack x6", 6, 480_000),
    ("LEC-SER-1L", "Caja x12", 12, 1_500_000),
    ("FID-MAT-500", "Bulto x10", 10, 1_350_000),
];

/// Account customers. (document, name, address, phone)
const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    (
        "30-70812345-6",
        "Kiosco El Paso",
        "Av. Rivadavia 2301, Lanús",
        "11-4241-8890",
    ),
    (
        "27-28456789-3",
        "María Fernández",
        "Ituzaingó 455, Lanús",
        "11-6502-1134",
    ),
    (
        "20-31234567-8",
        "Rotisería Don Carlos",
        "9 de Julio 1180, Lanús",
        "11-4249-0021",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./almacen.db");
    let mut admin_password = String::from("admin1234");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" | "-p" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Almacén POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>             Database file path (default: ./almacen.db)");
                println!("  -p, --admin-password <PW>   Bootstrap admin password (default: admin1234)");
                println!("  -h, --help                  Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Almacén POS Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Bootstrap users
    println!();
    if db.users().count_active().await? > 0 {
        println!("⚠ Users already present, skipping bootstrap");
    } else {
        println!("Creating bootstrap users...");
        let now = Utc::now();

        let admin = User {
            id: Uuid::new_v4().to_string(),
            username: "admin".to_string(),
            display_name: "Administrador".to_string(),
            password_hash: hash_password(&admin_password)?,
            role: UserRole::Admin,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&admin).await?;

        let vendor = User {
            id: Uuid::new_v4().to_string(),
            username: "vendedor".to_string(),
            display_name: "Vendedor de Mostrador".to_string(),
            password_hash: hash_password("vendedor1234")?,
            role: UserRole::Vendor,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&vendor).await?;

        println!("  admin    / {} (ADMIN)", admin_password);
        println!("  vendedor / vendedor1234 (VENDOR)");
        println!("⚠ Change both passwords before going live");
    }

    let admin = db
        .users()
        .get_by_username("admin")
        .await?
        .ok_or("bootstrap admin user missing")?;

    // Demo catalog
    println!();
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!("Loading demo catalog...");
    let start = std::time::Instant::now();
    let now = Utc::now();

    let mut ids_by_sku: HashMap<&str, String> = HashMap::new();

    for &(sku, name, price, cost, stock, min_stock) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            price_centavos: price,
            cost_centavos: Some(cost),
            current_stock: stock,
            min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;

        // Initial stock enters through the ledger like any other stock.
        db.movements()
            .record(&Movement {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                kind: MovementType::Entrada,
                quantity: stock,
                stock_after: stock,
                detail: Some("Carga inicial".to_string()),
                sale_id: None,
                user_id: admin.id.clone(),
                created_at: now,
            })
            .await?;

        ids_by_sku.insert(sku, product.id);
    }

    for &(product_sku, name, units, price) in PRESENTATIONS {
        let product_id = ids_by_sku
            .get(product_sku)
            .ok_or_else(|| format!("presentation references unknown SKU {product_sku}"))?;

        db.presentations()
            .insert(&Presentation {
                id: Uuid::new_v4().to_string(),
                product_id: product_id.clone(),
                name: name.to_string(),
                units_per_presentation: units,
                price_centavos: price,
                is_active: true,
                created_at: now,
            })
            .await?;
    }

    for &(document, name, address, phone) in CUSTOMERS {
        db.customers()
            .insert(&Customer {
                id: Uuid::new_v4().to_string(),
                document: document.to_string(),
                name: name.to_string(),
                address: Some(address.to_string()),
                phone: Some(phone.to_string()),
                email: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Loaded {} products, {} presentations, {} customers in {:?}",
        PRODUCTS.len(),
        PRESENTATIONS.len(),
        CUSTOMERS.len(),
        elapsed
    );

    // Verify lookups
    println!();
    println!("Verifying catalog...");
    let search_results = db.products().search("yerba", 10).await?;
    println!("  Search 'yerba': {} results", search_results.len());

    let alerts = db.products().low_stock(50).await?;
    println!("  Low stock alerts: {}", alerts.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Hashes a password with argon2id and a fresh random salt.
fn hash_password(plain: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("hashing password: {e}"))
}
