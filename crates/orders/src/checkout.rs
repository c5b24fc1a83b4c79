//! Order placement: catalog validation, stock reservation, price snapshotting.
//!
//! [`CheckoutService`] is the only writer of orders and the only caller of the
//! stock ledger. Items are processed in submission order and the whole request
//! fails on the first bad line; reservations already made for earlier lines
//! are released before the error is returned, so no order and no partial
//! reservation survive a failed call.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use storefront_auth::Identity;
use storefront_catalog::{Product, ProductVariation};
use storefront_core::{
    DomainError, DomainResult, OrderId, OrderItemId, ProductId, UserId, VariationId,
};

use crate::order::{Order, OrderItem};

/// The row a reservation decrements: a product's base stock counter, or one
/// variation's counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockTarget {
    Product(ProductId),
    Variation(VariationId),
}

impl core::fmt::Display for StockTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StockTarget::Product(id) => write!(f, "product {id}"),
            StockTarget::Variation(id) => write!(f, "variation {id}"),
        }
    }
}

/// Read-only catalog access.
///
/// A variation that resolves but belongs to a different product is a
/// validation concern checked by the checkout service, never a lookup error.
pub trait CatalogReader: Send + Sync {
    fn product(&self, product_id: ProductId) -> DomainResult<Product>;

    fn variation(&self, variation_id: VariationId) -> DomainResult<ProductVariation>;

    /// Whether the product has any active variations (drives the
    /// required-variation policy).
    fn has_active_variations(&self, product_id: ProductId) -> DomainResult<bool>;
}

/// Atomic stock mutation.
///
/// `reserve` must check and decrement in one lock/transaction scope: two
/// concurrent reservations against the same target must never both succeed
/// past the available quantity, and stock never goes negative.
pub trait StockLedger: Send + Sync {
    /// Decrement `target` by `quantity` if at least that much is available,
    /// else fail with `InsufficientStock` leaving stock unchanged. No partial
    /// reservation.
    fn reserve(&self, target: &StockTarget, quantity: i64) -> DomainResult<()>;

    /// Compensating action: put a prior reservation back. Used only to void
    /// earlier lines of a failed order.
    fn release(&self, target: &StockTarget, quantity: i64) -> DomainResult<()>;
}

/// Order persistence.
pub trait OrderStore: Send + Sync {
    /// Persist an order with its items as one atomic unit.
    fn insert(&self, order: &Order) -> DomainResult<()>;

    fn get(&self, order_id: OrderId) -> DomainResult<Order>;

    /// Persist only the derived total.
    fn update_total(&self, order_id: OrderId, total: Decimal) -> DomainResult<()>;

    /// Remove an order and its items. Restores no stock; stock compensation
    /// is the ledger's job.
    fn delete(&self, order_id: OrderId) -> DomainResult<()>;

    fn list_for_customer(&self, customer: UserId) -> DomainResult<Vec<Order>>;
}

impl<T> CatalogReader for Arc<T>
where
    T: CatalogReader + ?Sized,
{
    fn product(&self, product_id: ProductId) -> DomainResult<Product> {
        (**self).product(product_id)
    }

    fn variation(&self, variation_id: VariationId) -> DomainResult<ProductVariation> {
        (**self).variation(variation_id)
    }

    fn has_active_variations(&self, product_id: ProductId) -> DomainResult<bool> {
        (**self).has_active_variations(product_id)
    }
}

impl<T> StockLedger for Arc<T>
where
    T: StockLedger + ?Sized,
{
    fn reserve(&self, target: &StockTarget, quantity: i64) -> DomainResult<()> {
        (**self).reserve(target, quantity)
    }

    fn release(&self, target: &StockTarget, quantity: i64) -> DomainResult<()> {
        (**self).release(target, quantity)
    }
}

impl<T> OrderStore for Arc<T>
where
    T: OrderStore + ?Sized,
{
    fn insert(&self, order: &Order) -> DomainResult<()> {
        (**self).insert(order)
    }

    fn get(&self, order_id: OrderId) -> DomainResult<Order> {
        (**self).get(order_id)
    }

    fn update_total(&self, order_id: OrderId, total: Decimal) -> DomainResult<()> {
        (**self).update_total(order_id, total)
    }

    fn delete(&self, order_id: OrderId) -> DomainResult<()> {
        (**self).delete(order_id)
    }

    fn list_for_customer(&self, customer: UserId) -> DomainResult<Vec<Order>> {
        (**self).list_for_customer(customer)
    }
}

/// One requested order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    pub quantity: i64,
}

/// An order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub shipping_address: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<ItemRequest>,
}

impl OrderRequest {
    pub fn new(shipping_address: impl Into<String>, items: Vec<ItemRequest>) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            customer_name: None,
            customer_email: None,
            items,
        }
    }

    pub fn with_contact(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.customer_name = Some(name.into());
        self.customer_email = Some(email.into());
        self
    }
}

/// Order builder: validates each line against the catalog, reserves stock,
/// snapshots unit prices, and persists the order atomically.
#[derive(Debug)]
pub struct CheckoutService<C, L, O> {
    catalog: C,
    ledger: L,
    orders: O,
}

impl<C, L, O> CheckoutService<C, L, O>
where
    C: CatalogReader,
    L: StockLedger,
    O: OrderStore,
{
    pub fn new(catalog: C, ledger: L, orders: O) -> Self {
        Self {
            catalog,
            ledger,
            orders,
        }
    }

    /// Place an order for `identity` (guests allowed).
    ///
    /// Items are processed in submission order, short-circuiting on the first
    /// failure. On any failure after a reservation has been made (a later
    /// line, persistence, the total update) every reservation is released
    /// and any persisted order is deleted before the error is returned.
    pub fn place_order(
        &self,
        identity: &Identity,
        request: OrderRequest,
    ) -> DomainResult<Order> {
        if request.items.is_empty() {
            return Err(DomainError::validation(
                "order must contain at least one item",
            ));
        }

        let order_id = OrderId::new();
        let mut order = Order::new(
            order_id,
            identity.user_id(),
            request.shipping_address,
            request.customer_name,
            request.customer_email,
        )?;

        let mut reserved: Vec<(StockTarget, i64)> = Vec::with_capacity(request.items.len());

        for line in &request.items {
            match self.build_line(order_id, line) {
                Ok((item, target)) => {
                    reserved.push((target, line.quantity));
                    order.push_item(item);
                }
                Err(err) => {
                    self.release_reserved(&reserved);
                    warn!(order_id = %order_id, error = %err, "order rejected");
                    return Err(err);
                }
            }
        }

        if let Err(err) = self.orders.insert(&order) {
            self.release_reserved(&reserved);
            warn!(order_id = %order_id, error = %err, "order persistence failed");
            return Err(err);
        }

        if let Err(err) = recalculate_total(&self.orders, &mut order) {
            // No order half exists: drop the persisted order, then put the
            // stock back.
            if let Err(delete_err) = self.orders.delete(order_id) {
                warn!(order_id = %order_id, error = %delete_err, "failed to delete order during rollback");
            }
            self.release_reserved(&reserved);
            warn!(order_id = %order_id, error = %err, "total update failed");
            return Err(err);
        }

        info!(
            order_id = %order_id,
            items = order.items().len(),
            total = %order.total_amount(),
            guest = order.is_guest(),
            "order placed"
        );
        Ok(order)
    }

    /// Validate one line, snapshot its unit price, and reserve its stock.
    ///
    /// Reservation is the last step, so a line that fails here has nothing of
    /// its own to roll back.
    fn build_line(
        &self,
        order_id: OrderId,
        line: &ItemRequest,
    ) -> DomainResult<(OrderItem, StockTarget)> {
        if line.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be positive for product {}",
                line.product_id
            )));
        }

        let product = self.catalog.product(line.product_id)?;

        let (target, unit_price) = match line.variation_id {
            Some(variation_id) => {
                let variation = self.catalog.variation(variation_id)?;
                if variation.product_id() != product.id_typed() {
                    return Err(DomainError::validation(format!(
                        "variation {variation_id} does not belong to product {}",
                        line.product_id
                    )));
                }
                (
                    StockTarget::Variation(variation_id),
                    variation.final_price(product.price()),
                )
            }
            None => {
                // A product with active variations sells only through them;
                // accepting a bare line here would decrement the wrong counter.
                if self.catalog.has_active_variations(line.product_id)? {
                    return Err(DomainError::validation(format!(
                        "product '{}' has variations; a variation must be selected",
                        product.name()
                    )));
                }
                (StockTarget::Product(line.product_id), product.price())
            }
        };

        let item = OrderItem::new(
            OrderItemId::new(),
            order_id,
            line.product_id,
            line.variation_id,
            line.quantity,
            unit_price,
        )?;

        self.ledger.reserve(&target, line.quantity)?;
        Ok((item, target))
    }

    /// Void earlier reservations of a failed order, newest first. Best-effort
    /// and synchronous; a release failure is logged and the rest proceed.
    fn release_reserved(&self, reserved: &[(StockTarget, i64)]) {
        for (target, quantity) in reserved.iter().rev() {
            if let Err(err) = self.ledger.release(target, *quantity) {
                warn!(stock_target = %target, quantity, error = %err, "failed to release reservation");
            }
        }
    }
}

/// Order total calculator: sum line subtotals into the order's total, persist
/// only that field, and return the value. Idempotent for unchanged items.
pub fn recalculate_total<O>(orders: &O, order: &mut Order) -> DomainResult<Decimal>
where
    O: OrderStore + ?Sized,
{
    let total = order.recalculate_total();
    orders.update_total(order.id_typed(), total)?;
    Ok(total)
}
