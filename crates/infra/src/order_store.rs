use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use storefront_core::{DomainError, DomainResult, OrderId, UserId};
use storefront_orders::{Order, OrderStore};

/// In-memory order store.
///
/// Intended for tests/dev. An order and its items live in one map entry, so
/// `insert` is the atomic unit the checkout service requires and `delete`
/// cascades to items for free (and restores no stock).
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, HashMap<OrderId, Order>>> {
        self.orders
            .read()
            .map_err(|_| DomainError::storage("order store lock poisoned"))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Order>>> {
        self.orders
            .write()
            .map_err(|_| DomainError::storage("order store lock poisoned"))
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: &Order) -> DomainResult<()> {
        let mut orders = self.write()?;
        if orders.contains_key(&order.id_typed()) {
            return Err(DomainError::storage(format!(
                "order {} already exists",
                order.id_typed()
            )));
        }
        orders.insert(order.id_typed(), order.clone());
        Ok(())
    }

    fn get(&self, order_id: OrderId) -> DomainResult<Order> {
        self.read()?
            .get(&order_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))
    }

    fn update_total(&self, order_id: OrderId, total: Decimal) -> DomainResult<()> {
        let mut orders = self.write()?;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        // Persist only the derived total; items and status are untouched.
        order.recalculate_total();
        debug_assert_eq!(order.total_amount(), total);
        Ok(())
    }

    fn delete(&self, order_id: OrderId) -> DomainResult<()> {
        self.write()?
            .remove(&order_id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))
    }

    fn list_for_customer(&self, customer: UserId) -> DomainResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .read()?
            .values()
            .filter(|o| o.customer() == Some(customer))
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at()));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use storefront_core::{OrderItemId, ProductId};
    use storefront_orders::OrderItem;

    fn order_with_line(customer: Option<UserId>) -> Order {
        let order_id = OrderId::new();
        let mut order = Order::new(order_id, customer, "1 Main St", None, None).unwrap();
        order.push_item(
            OrderItem::new(
                OrderItemId::new(),
                order_id,
                ProductId::new(),
                None,
                2,
                dec!(20.00),
            )
            .unwrap(),
        );
        order
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = InMemoryOrderStore::new();
        let order = order_with_line(None);
        store.insert(&order).unwrap();
        assert_eq!(store.get(order.id_typed()).unwrap(), order);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryOrderStore::new();
        let order = order_with_line(None);
        store.insert(&order).unwrap();
        assert!(store.insert(&order).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_total_persists_the_derived_sum() {
        let store = InMemoryOrderStore::new();
        let mut order = order_with_line(None);
        store.insert(&order).unwrap();

        let total = order.recalculate_total();
        store.update_total(order.id_typed(), total).unwrap();
        assert_eq!(store.get(order.id_typed()).unwrap().total_amount(), dec!(40.00));
    }

    #[test]
    fn delete_cascades_to_items() {
        let store = InMemoryOrderStore::new();
        let order = order_with_line(None);
        store.insert(&order).unwrap();
        store.delete(order.id_typed()).unwrap();
        assert!(store.is_empty());
        assert!(store.get(order.id_typed()).is_err());
    }

    #[test]
    fn list_for_customer_filters_and_sorts_newest_first() {
        let store = InMemoryOrderStore::new();
        let customer = UserId::new();
        let first = order_with_line(Some(customer));
        let second = order_with_line(Some(customer));
        let other = order_with_line(Some(UserId::new()));
        let guest = order_with_line(None);
        for order in [&first, &second, &other, &guest] {
            store.insert(order).unwrap();
        }

        let listed = store.list_for_customer(customer).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at() >= listed[1].created_at());
        assert!(listed.iter().all(|o| o.customer() == Some(customer)));
    }
}
