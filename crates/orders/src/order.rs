use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{
    DomainError, Entity, OrderId, OrderItemId, ProductId, UserId, VariationId,
};

/// Order status lifecycle.
///
/// Transitions are performed by an external admin operation and are not
/// validated beyond membership in this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// A single line of an order.
///
/// `price_at_purchase` is snapshotted at creation and immutable afterwards:
/// later catalog price changes never touch committed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    variation_id: Option<VariationId>,
    quantity: i64,
    price_at_purchase: Decimal,
}

impl OrderItem {
    pub fn new(
        id: OrderItemId,
        order_id: OrderId,
        product_id: ProductId,
        variation_id: Option<VariationId>,
        quantity: i64,
        price_at_purchase: Decimal,
    ) -> Result<Self, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            id,
            order_id,
            product_id,
            variation_id,
            quantity,
            price_at_purchase,
        })
    }

    pub fn id_typed(&self) -> OrderItemId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn variation_id(&self) -> Option<VariationId> {
        self.variation_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price_at_purchase(&self) -> Decimal {
        self.price_at_purchase
    }

    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price_at_purchase
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// An order with its line items.
///
/// Created together with its items as one unit; `total_amount` is derived by
/// [`Order::recalculate_total`] and never authored by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: Option<UserId>,
    status: OrderStatus,
    shipping_address: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    items: Vec<OrderItem>,
}

impl Order {
    pub fn new(
        id: OrderId,
        customer: Option<UserId>,
        shipping_address: impl Into<String>,
        customer_name: Option<String>,
        customer_email: Option<String>,
    ) -> Result<Self, DomainError> {
        let shipping_address = shipping_address.into();
        if shipping_address.trim().is_empty() {
            return Err(DomainError::validation("shipping address cannot be empty"));
        }
        Ok(Self {
            id,
            customer,
            status: OrderStatus::Pending,
            shipping_address,
            customer_name,
            customer_email,
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
            items: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> Option<UserId> {
        self.customer
    }

    /// An order with no associated customer identity.
    pub fn is_guest(&self) -> bool {
        self.customer.is_none()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Status transitions are an external admin operation; membership in the
    /// status set is the only validation.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn push_item(&mut self, item: OrderItem) {
        self.items.push(item);
    }

    /// Sum line subtotals into `total_amount` and return it.
    ///
    /// Pure function of current item state; calling it twice with unchanged
    /// items yields the same total.
    pub fn recalculate_total(&mut self) -> Decimal {
        self.total_amount = self.items.iter().map(OrderItem::subtotal).sum();
        self.total_amount
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
