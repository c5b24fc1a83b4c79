use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, Entity, ProductId};

/// A product in the catalog.
///
/// `stock_quantity` is the base stock counter, used only when the product has
/// no active variations; otherwise each variation carries its own counter.
/// Stock never goes negative: all decrements go through
/// [`Product::apply_stock_delta`], which rejects any delta that would cross
/// zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    name: String,
    price: Decimal,
    stock_quantity: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        category_id: CategoryId,
        name: impl Into<String>,
        price: Decimal,
        stock_quantity: i64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            category_id,
            name,
            price,
            stock_quantity,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Adjust the base stock counter. Rejects adjustments that would take the
    /// counter below zero, leaving stock unchanged.
    pub fn apply_stock_delta(&mut self, delta: i64) -> Result<(), DomainError> {
        let next = self.stock_quantity + delta;
        if next < 0 {
            return Err(DomainError::validation("stock cannot go negative"));
        }
        self.stock_quantity = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Reprice the product (admin operation). Order lines already placed keep
    /// their snapshotted price.
    pub fn set_price(&mut self, price: Decimal) -> Result<(), DomainError> {
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        self.price = price;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_product() -> Product {
        Product::new(
            ProductId::new(),
            CategoryId::new(),
            "Shirt",
            dec!(20.00),
            10,
        )
        .unwrap()
    }

    #[test]
    fn new_product_is_active_with_given_stock() {
        let product = test_product();
        assert!(product.is_active());
        assert_eq!(product.stock_quantity(), 10);
        assert_eq!(product.price(), dec!(20.00));
    }

    #[test]
    fn rejects_empty_name() {
        let err = Product::new(ProductId::new(), CategoryId::new(), "  ", dec!(1), 0)
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn rejects_negative_price() {
        let err = Product::new(ProductId::new(), CategoryId::new(), "Shirt", dec!(-1), 0)
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative price"),
        }
    }

    #[test]
    fn rejects_negative_stock() {
        let err = Product::new(ProductId::new(), CategoryId::new(), "Shirt", dec!(1), -3)
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative stock"),
        }
    }

    #[test]
    fn stock_delta_decrements_and_increments() {
        let mut product = test_product();
        product.apply_stock_delta(-4).unwrap();
        assert_eq!(product.stock_quantity(), 6);
        product.apply_stock_delta(4).unwrap();
        assert_eq!(product.stock_quantity(), 10);
    }

    #[test]
    fn stock_delta_never_crosses_zero() {
        let mut product = test_product();
        let err = product.apply_stock_delta(-11).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("negative")),
            _ => panic!("Expected Validation error"),
        }
        // Stock unchanged after a rejected adjustment.
        assert_eq!(product.stock_quantity(), 10);
    }

    #[test]
    fn reprice_does_not_touch_stock() {
        let mut product = test_product();
        product.set_price(dec!(25.50)).unwrap();
        assert_eq!(product.price(), dec!(25.50));
        assert_eq!(product.stock_quantity(), 10);
    }
}
