//! # Demo Catalog
//!
//! The liquor-store catalog a fresh install starts with, and the two ways
//! of loading it:
//!
//! - [`seed_if_empty`]: inserts the list when `products` has no rows
//! - [`replace_with_seed`]: upserts the list as active and deactivates
//!   everything else, keeping the stock of rows that already exist

use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use stockseguro_core::Product;

struct SeedProduct {
    barcode: &'static str,
    name: &'static str,
    category: &'static str,
    unit_price: i64,
    box_price: i64,
    stock: i64,
    min_stock: i64,
    image: &'static str,
}

#[rustfmt::skip]
const SEED: &[SeedProduct] = &[
    SeedProduct { barcode: "7702116011239", name: "Aguardiente Antioqueño 750ml", category: "Licores", unit_price: 28000, box_price: 280000, stock: 45, min_stock: 10, image: "🍶" },
    SeedProduct { barcode: "7702259001234", name: "Cerveza Poker Lata 330ml", category: "Cervezas", unit_price: 2500, box_price: 60000, stock: 120, min_stock: 30, image: "🍺" },
    SeedProduct { barcode: "7702259005678", name: "Cerveza Águila Lata 330ml", category: "Cervezas", unit_price: 2500, box_price: 60000, stock: 150, min_stock: 40, image: "🍺" },
    SeedProduct { barcode: "7702259009012", name: "Club Colombia Roja 330ml", category: "Cervezas", unit_price: 3200, box_price: 76800, stock: 80, min_stock: 20, image: "🍺" },
    SeedProduct { barcode: "7702116012345", name: "Ron Medellín Añejo 750ml", category: "Licores", unit_price: 35000, box_price: 350000, stock: 30, min_stock: 8, image: "🥃" },
    SeedProduct { barcode: "7702116013456", name: "Tequila José Cuervo 750ml", category: "Licores", unit_price: 65000, box_price: 650000, stock: 18, min_stock: 5, image: "🥃" },
    SeedProduct { barcode: "8410161011234", name: "Vino Casillero del Diablo 750ml", category: "Vinos", unit_price: 45000, box_price: 270000, stock: 25, min_stock: 6, image: "🍷" },
    SeedProduct { barcode: "8410161015678", name: "Vino Gato Negro Merlot 750ml", category: "Vinos", unit_price: 32000, box_price: 192000, stock: 35, min_stock: 8, image: "🍷" },
    SeedProduct { barcode: "7702116014567", name: "Whisky Old Parr 12 años 750ml", category: "Licores", unit_price: 125000, box_price: 1250000, stock: 12, min_stock: 3, image: "🥃" },
    SeedProduct { barcode: "7702116015678", name: "Vodka Smirnoff 750ml", category: "Licores", unit_price: 45000, box_price: 450000, stock: 22, min_stock: 6, image: "🍸" },
    SeedProduct { barcode: "7702259010234", name: "Cerveza Corona Botella 355ml", category: "Cervezas", unit_price: 4500, box_price: 108000, stock: 60, min_stock: 15, image: "🍺" },
    SeedProduct { barcode: "7702259011345", name: "Cerveza Heineken Lata 330ml", category: "Cervezas", unit_price: 4000, box_price: 96000, stock: 72, min_stock: 18, image: "🍺" },
    SeedProduct { barcode: "7702116016789", name: "Baileys Original 750ml", category: "Cremas", unit_price: 68000, box_price: 680000, stock: 15, min_stock: 4, image: "🥛" },
    SeedProduct { barcode: "7899026001234", name: "Energizante Red Bull 250ml", category: "Energizantes", unit_price: 6500, box_price: 156000, stock: 90, min_stock: 24, image: "⚡" },
    SeedProduct { barcode: "7702116017890", name: "Ginebra Bombay Sapphire 750ml", category: "Licores", unit_price: 95000, box_price: 950000, stock: 10, min_stock: 3, image: "🍸" },
    SeedProduct { barcode: "7702259012456", name: "Cerveza Budweiser Lata 330ml", category: "Cervezas", unit_price: 3800, box_price: 91200, stock: 55, min_stock: 12, image: "🍺" },
];

/// The seed list as products. Each id is its barcode.
pub fn seed_products() -> Vec<Product> {
    SEED.iter()
        .map(|p| Product {
            id: p.barcode.to_string(),
            barcode: p.barcode.to_string(),
            name: p.name.to_string(),
            category: p.category.to_string(),
            unit_price: p.unit_price,
            box_price: p.box_price,
            stock: p.stock,
            min_stock: p.min_stock,
            image: p.image.to_string(),
            active: true,
        })
        .collect()
}

/// Inserts the seed list into an empty catalog. Returns rows inserted.
pub async fn seed_if_empty(db: &Database) -> DbResult<usize> {
    let repo = db.products();
    if repo.count().await? > 0 {
        return Ok(0);
    }

    let products = seed_products();
    repo.replace_catalog(&products).await?;

    info!(count = products.len(), "Seeded demo catalog");
    Ok(products.len())
}

/// Makes the seed list the whole active catalog. Returns rows deactivated.
pub async fn replace_with_seed(db: &Database) -> DbResult<u64> {
    let products = seed_products();
    let deactivated = db.products().replace_catalog(&products).await?;

    info!(active = products.len(), deactivated, "Replaced catalog");
    Ok(deactivated)
}
