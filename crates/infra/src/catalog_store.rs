use std::collections::HashMap;
use std::sync::RwLock;

use storefront_catalog::{Category, Product, ProductVariation};
use storefront_core::{
    CategoryId, DomainError, DomainResult, ProductId, VariationId,
};
use storefront_orders::{CatalogReader, StockLedger, StockTarget};

#[derive(Debug, Default)]
struct CatalogRows {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    variations: HashMap<VariationId, ProductVariation>,
}

/// In-memory catalog.
///
/// Intended for tests/dev. Holds product and variation rows under one lock and
/// implements both [`CatalogReader`] and [`StockLedger`]: reserve's
/// check-then-write runs inside a single write-lock scope, which is what makes
/// concurrent reservations against the same row safe.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    rows: RwLock<CatalogRows>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admin-side write: create or replace a category row.
    pub fn upsert_category(&self, category: Category) -> DomainResult<()> {
        let mut rows = self.write()?;
        rows.categories.insert(category.id_typed(), category);
        Ok(())
    }

    /// Admin-side write: create or replace a product row.
    pub fn upsert_product(&self, product: Product) -> DomainResult<()> {
        let mut rows = self.write()?;
        rows.products.insert(product.id_typed(), product);
        Ok(())
    }

    /// Admin-side write: create or replace a variation row.
    pub fn upsert_variation(&self, variation: ProductVariation) -> DomainResult<()> {
        let mut rows = self.write()?;
        rows.variations.insert(variation.id_typed(), variation);
        Ok(())
    }

    pub fn category(&self, category_id: CategoryId) -> DomainResult<Category> {
        self.read()?
            .categories
            .get(&category_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("category {category_id}")))
    }

    /// Whether any variation row already carries this SKU (the uniqueness
    /// check SKU generation retries against).
    pub fn sku_taken(&self, sku: &str) -> DomainResult<bool> {
        Ok(self
            .read()?
            .variations
            .values()
            .any(|v| v.sku() == Some(sku)))
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, CatalogRows>> {
        self.rows
            .read()
            .map_err(|_| DomainError::storage("catalog lock poisoned"))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, CatalogRows>> {
        self.rows
            .write()
            .map_err(|_| DomainError::storage("catalog lock poisoned"))
    }
}

impl CatalogReader for InMemoryCatalog {
    fn product(&self, product_id: ProductId) -> DomainResult<Product> {
        self.read()?
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))
    }

    fn variation(&self, variation_id: VariationId) -> DomainResult<ProductVariation> {
        self.read()?
            .variations
            .get(&variation_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("variation {variation_id}")))
    }

    fn has_active_variations(&self, product_id: ProductId) -> DomainResult<bool> {
        Ok(self
            .read()?
            .variations
            .values()
            .any(|v| v.product_id() == product_id && v.is_active()))
    }
}

impl StockLedger for InMemoryCatalog {
    fn reserve(&self, target: &StockTarget, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        // Check and decrement under the same write lock; concurrent reserves
        // against the same row serialize here.
        let mut rows = self.write()?;
        match target {
            StockTarget::Product(product_id) => {
                let product = rows
                    .products
                    .get_mut(product_id)
                    .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?;
                let available = product.stock_quantity();
                if available < quantity {
                    return Err(DomainError::insufficient_stock(
                        target.to_string(),
                        quantity,
                        available,
                    ));
                }
                product.apply_stock_delta(-quantity)
            }
            StockTarget::Variation(variation_id) => {
                let variation = rows
                    .variations
                    .get_mut(variation_id)
                    .ok_or_else(|| DomainError::not_found(format!("variation {variation_id}")))?;
                let available = variation.stock_quantity();
                if available < quantity {
                    return Err(DomainError::insufficient_stock(
                        target.to_string(),
                        quantity,
                        available,
                    ));
                }
                variation.apply_stock_delta(-quantity)
            }
        }
    }

    fn release(&self, target: &StockTarget, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let mut rows = self.write()?;
        match target {
            StockTarget::Product(product_id) => rows
                .products
                .get_mut(product_id)
                .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?
                .apply_stock_delta(quantity),
            StockTarget::Variation(variation_id) => rows
                .variations
                .get_mut(variation_id)
                .ok_or_else(|| DomainError::not_found(format!("variation {variation_id}")))?
                .apply_stock_delta(quantity),
        }
    }
}
