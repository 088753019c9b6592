//! # Catalog Maintenance
//!
//! Create, edit and soft-delete products, plus the read paths the sale
//! screen uses (barcode lookup, active listing).
//!
//! Products are never removed: sales and movements keep pointing at them.
//! Uniqueness of `id` and `barcode` is checked across active and inactive
//! rows alike.

use tracing::{debug, info};

use crate::error::{CoreError, CoreResult, StoreError};
use crate::store::CatalogStore;
use crate::types::{NewProduct, Product, ProductUpdate};
use crate::validation::{validate_new_product, validate_product_update, validate_required};
use crate::DEFAULT_PRODUCT_IMAGE;

/// Blank or missing images fall back to the default glyph.
fn image_or_default(image: Option<&str>) -> String {
    image
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_PRODUCT_IMAGE)
        .to_string()
}

/// Adds a product to the catalog.
pub async fn create_product<S>(store: &S, new: &NewProduct) -> CoreResult<Product>
where
    S: CatalogStore + ?Sized,
{
    validate_new_product(new)?;

    let product = Product {
        id: new.id.trim().to_string(),
        barcode: new.barcode.trim().to_string(),
        name: new.name.trim().to_string(),
        category: new.category.trim().to_string(),
        unit_price: new.unit_price,
        box_price: new.box_price,
        stock: new.stock,
        min_stock: new.min_stock,
        image: image_or_default(new.image.as_deref()),
        active: true,
    };
    debug!(id = %product.id, barcode = %product.barcode, "Creating product");

    let duplicate = || CoreError::DuplicateProduct {
        id: product.id.clone(),
        barcode: product.barcode.clone(),
    };

    if store.id_or_barcode_exists(&product.id, &product.barcode).await? {
        return Err(duplicate());
    }

    match store.create(&product).await {
        Ok(()) => {}
        // Lost the race to another insert with the same keys
        Err(StoreError::Conflict(_)) => return Err(duplicate()),
        Err(e) => return Err(e.into()),
    }

    info!(id = %product.id, name = %product.name, "Product created");
    Ok(product)
}

/// Edits a product. Re-activates it if it had been soft-deleted.
///
/// Stock is not part of the edit; use the adjustment engine so the change
/// is logged.
pub async fn update_product<S>(store: &S, update: &ProductUpdate) -> CoreResult<Product>
where
    S: CatalogStore + ?Sized,
{
    validate_product_update(update)?;

    let update = ProductUpdate {
        id: update.id.trim().to_string(),
        barcode: update.barcode.trim().to_string(),
        name: update.name.trim().to_string(),
        category: update.category.trim().to_string(),
        image: update
            .image
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string),
        ..update.clone()
    };
    debug!(id = %update.id, "Updating product");

    let taken = || CoreError::BarcodeTaken {
        barcode: update.barcode.clone(),
    };

    if store.barcode_taken_by_other(&update.barcode, &update.id).await? {
        return Err(taken());
    }

    let affected = match store.update_fields(&update).await {
        Ok(n) => n,
        Err(StoreError::Conflict(_)) => return Err(taken()),
        Err(e) => return Err(e.into()),
    };
    if affected == 0 {
        return Err(CoreError::ProductNotFound(update.id));
    }

    store
        .find_by_id(&update.id)
        .await?
        .ok_or(CoreError::ProductNotFound(update.id))
}

/// Marks a product inactive.
pub async fn delete_product<S>(store: &S, id: &str) -> CoreResult<()>
where
    S: CatalogStore + ?Sized,
{
    validate_required("id", id)?;
    let id = id.trim();

    if store.soft_delete(id).await? == 0 {
        return Err(CoreError::ProductNotFound(id.to_string()));
    }

    info!(id = %id, "Product deactivated");
    Ok(())
}

/// Scanner lookup among active products.
pub async fn lookup_barcode<S>(store: &S, barcode: &str) -> CoreResult<Option<Product>>
where
    S: CatalogStore + ?Sized,
{
    validate_required("barcode", barcode)?;
    Ok(store.find_active_by_barcode(barcode.trim()).await?)
}

/// Active products, by category then name.
pub async fn list_products<S>(store: &S) -> CoreResult<Vec<Product>>
where
    S: CatalogStore + ?Sized,
{
    Ok(store.list_active().await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::types::StockStatus;

    fn aguardiente() -> NewProduct {
        NewProduct {
            id: "7702116011239".to_string(),
            barcode: "7702116011239".to_string(),
            name: " Aguardiente Antioqueño 750ml ".to_string(),
            category: "Licores".to_string(),
            unit_price: 28000,
            box_price: 280000,
            stock: 45,
            min_stock: 10,
            image: None,
        }
    }

    fn edit_of(product: &Product) -> ProductUpdate {
        ProductUpdate {
            id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            unit_price: product.unit_price,
            box_price: product.box_price,
            min_stock: product.min_stock,
            image: Some(product.image.clone()),
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_defaults_image() {
        let store = MemoryStore::new();

        let product = create_product(&store, &aguardiente()).await.unwrap();
        assert_eq!(product.name, "Aguardiente Antioqueño 750ml");
        assert_eq!(product.image, DEFAULT_PRODUCT_IMAGE);
        assert!(product.active);
        assert_eq!(product.stock_status(), StockStatus::Healthy);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id_or_barcode_even_when_inactive() {
        let store = MemoryStore::new();
        create_product(&store, &aguardiente()).await.unwrap();
        delete_product(&store, "7702116011239").await.unwrap();

        let mut same_barcode = aguardiente();
        same_barcode.id = "OTHER".to_string();
        let err = create_product(&store, &same_barcode).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateProduct { .. }));

        let mut same_id = aguardiente();
        same_id.barcode = "OTHER".to_string();
        let err = create_product(&store, &same_id).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateProduct { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_barcode_of_another_product() {
        let store = MemoryStore::new();
        let first = create_product(&store, &aguardiente()).await.unwrap();
        let mut other = aguardiente();
        other.id = "7702049000011".to_string();
        other.barcode = "7702049000011".to_string();
        create_product(&store, &other).await.unwrap();

        let mut edit = edit_of(&first);
        edit.barcode = "7702049000011".to_string();
        let err = update_product(&store, &edit).await.unwrap_err();
        assert!(matches!(err, CoreError::BarcodeTaken { .. }));

        // Keeping its own barcode is fine
        let mut edit = edit_of(&first);
        edit.unit_price = 29000;
        let updated = update_product(&store, &edit).await.unwrap();
        assert_eq!(updated.unit_price, 29000);
        assert_eq!(updated.stock, 45);
    }

    #[tokio::test]
    async fn test_update_reactivates_and_reports_missing() {
        let store = MemoryStore::new();
        let product = create_product(&store, &aguardiente()).await.unwrap();
        delete_product(&store, &product.id).await.unwrap();
        assert!(lookup_barcode(&store, &product.barcode).await.unwrap().is_none());

        let restored = update_product(&store, &edit_of(&product)).await.unwrap();
        assert!(restored.active);
        assert!(lookup_barcode(&store, &product.barcode).await.unwrap().is_some());

        let mut ghost = edit_of(&product);
        ghost.id = "GHOST".to_string();
        ghost.barcode = "GHOST".to_string();
        let err = update_product(&store, &ghost).await.unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let store = MemoryStore::new();
        let product = create_product(&store, &aguardiente()).await.unwrap();

        delete_product(&store, &product.id).await.unwrap();
        assert!(list_products(&store).await.unwrap().is_empty());

        let kept = store.find_by_id(&product.id).await.unwrap().unwrap();
        assert!(!kept.active);

        let err = delete_product(&store, "NOPE").await.unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(_)));
    }
}
