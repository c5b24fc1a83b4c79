use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, Entity, ProductId, ValueObject, VariationId};

/// Free-form variation attributes: an ordered string→string mapping such as
/// `{"Color": "Red", "Size": "Large"}`.
///
/// The core treats this as opaque passthrough data; only well-known keys (the
/// `Color` key) are ever interpreted, and that interpretation lives in
/// [`crate::color`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Find a value by key, ignoring ASCII case. Attributes are user-authored,
    /// so `color`, `Color` and `COLOR` must all resolve.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable rendering, `"Color: Red | Size: Large"`. Attribute-less
    /// variations render as `"Standard"`.
    pub fn display(&self) -> String {
        if self.0.is_empty() {
            return "Standard".to_string();
        }
        self.0
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl ValueObject for Attributes {}

/// A specific purchasable configuration of a product.
///
/// Carries its own stock counter and a price adjustment relative to the owning
/// product's price; the adjustment may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariation {
    id: VariationId,
    product_id: ProductId,
    name: String,
    sku: Option<String>,
    attributes: Attributes,
    price_adjustment: Decimal,
    stock_quantity: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductVariation {
    pub fn new(
        id: VariationId,
        product_id: ProductId,
        name: impl Into<String>,
        attributes: Attributes,
        price_adjustment: Decimal,
        stock_quantity: i64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("variation name cannot be empty"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            product_id,
            name,
            sku: None,
            attributes,
            price_adjustment,
            stock_quantity,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> VariationId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn price_adjustment(&self) -> Decimal {
        self.price_adjustment
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Final unit price for this configuration: owning product's price plus
    /// this variation's adjustment.
    pub fn final_price(&self, base_price: Decimal) -> Decimal {
        base_price + self.price_adjustment
    }

    pub fn set_sku(&mut self, sku: impl Into<String>) {
        self.sku = Some(sku.into());
        self.updated_at = Utc::now();
    }

    /// Adjust the variation stock counter. Rejects adjustments that would take
    /// the counter below zero, leaving stock unchanged.
    pub fn apply_stock_delta(&mut self, delta: i64) -> Result<(), DomainError> {
        let next = self.stock_quantity + delta;
        if next < 0 {
            return Err(DomainError::validation("stock cannot go negative"));
        }
        self.stock_quantity = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }
}

impl Entity for ProductVariation {
    type Id = VariationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
