//! End-to-end tests for the checkout pipeline.
//!
//! Wire the checkout service to the in-memory adapters and exercise the full
//! flow: catalog validation, stock reservation, price snapshotting, atomic
//! persistence, total calculation, and rollback on every failure path.

use std::sync::Arc;

use rust_decimal_macros::dec;

use storefront_auth::Identity;
use storefront_catalog::{Attributes, Product, ProductVariation};
use storefront_core::{CategoryId, DomainError, ProductId, UserId, VariationId};
use storefront_orders::{
    CatalogReader, CheckoutService, ItemRequest, OrderRequest, OrderStore, recalculate_total,
};

use crate::catalog_store::InMemoryCatalog;
use crate::order_store::InMemoryOrderStore;

type Service = CheckoutService<Arc<InMemoryCatalog>, Arc<InMemoryCatalog>, Arc<InMemoryOrderStore>>;

fn setup() -> (Arc<InMemoryCatalog>, Arc<InMemoryOrderStore>, Service) {
    storefront_observability::init();
    let catalog = Arc::new(InMemoryCatalog::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let service = CheckoutService::new(catalog.clone(), catalog.clone(), orders.clone());
    (catalog, orders, service)
}

/// Product "Shirt": no variations, stock 10, price 20.00.
fn seed_shirt(catalog: &InMemoryCatalog) -> ProductId {
    let product_id = ProductId::new();
    catalog
        .upsert_product(
            Product::new(product_id, CategoryId::new(), "Shirt", dec!(20.00), 10).unwrap(),
        )
        .unwrap();
    product_id
}

/// Active variation "Red/M" on the given product: +2.00, stock 5.
fn seed_red_medium(catalog: &InMemoryCatalog, product_id: ProductId) -> VariationId {
    let variation_id = VariationId::new();
    catalog
        .upsert_variation(
            ProductVariation::new(
                variation_id,
                product_id,
                "Red/M",
                Attributes::new().with("Color", "Red").with("Size", "M"),
                dec!(2.00),
                5,
            )
            .unwrap(),
        )
        .unwrap();
    variation_id
}

fn one_line(product_id: ProductId, variation_id: Option<VariationId>, quantity: i64) -> OrderRequest {
    OrderRequest::new(
        "1 Main St",
        vec![ItemRequest {
            product_id,
            variation_id,
            quantity,
        }],
    )
}

#[test]
fn simple_product_order_decrements_base_stock_and_totals() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);

    let order = service
        .place_order(&Identity::Guest, one_line(shirt, None, 2))
        .unwrap();

    assert_eq!(order.total_amount(), dec!(40.00));
    assert_eq!(order.items().len(), 1);
    assert_eq!(order.items()[0].price_at_purchase(), dec!(20.00));
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 8);

    // The persisted order carries the derived total.
    let stored = orders.get(order.id_typed()).unwrap();
    assert_eq!(stored.total_amount(), dec!(40.00));
}

#[test]
fn variation_order_snapshots_adjusted_price_and_its_own_stock() {
    let (catalog, _orders, service) = setup();
    let shirt = seed_shirt(&catalog);
    let red_medium = seed_red_medium(&catalog, shirt);

    let order = service
        .place_order(&Identity::Guest, one_line(shirt, Some(red_medium), 3))
        .unwrap();

    let item = &order.items()[0];
    assert_eq!(item.price_at_purchase(), dec!(22.00));
    assert_eq!(item.subtotal(), dec!(66.00));
    assert_eq!(order.total_amount(), dec!(66.00));
    assert_eq!(catalog.variation(red_medium).unwrap().stock_quantity(), 2);
    // Base stock untouched: the variation owns its counter.
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 10);
}

#[test]
fn product_with_active_variations_requires_a_selection() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);
    let red_medium = seed_red_medium(&catalog, shirt);

    let err = service
        .place_order(&Identity::Guest, one_line(shirt, None, 1))
        .unwrap_err();

    match err {
        DomainError::Validation(msg) => assert!(msg.contains("Shirt")),
        _ => panic!("Expected Validation error naming the product"),
    }
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 10);
    assert_eq!(catalog.variation(red_medium).unwrap().stock_quantity(), 5);
    assert!(orders.is_empty());
}

#[test]
fn inactive_variations_do_not_force_a_selection() {
    let (catalog, _orders, service) = setup();
    let shirt = seed_shirt(&catalog);
    let red_medium = seed_red_medium(&catalog, shirt);

    let mut variation = catalog.variation(red_medium).unwrap();
    variation.set_active(false);
    catalog.upsert_variation(variation).unwrap();

    // With no active variations left, base stock sells directly.
    let order = service
        .place_order(&Identity::Guest, one_line(shirt, None, 1))
        .unwrap();
    assert_eq!(order.total_amount(), dec!(20.00));
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 9);
}

#[test]
fn variation_of_another_product_is_a_mismatch() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);
    let other = seed_shirt(&catalog);
    let other_variation = seed_red_medium(&catalog, other);

    let err = service
        .place_order(&Identity::Guest, one_line(shirt, Some(other_variation), 1))
        .unwrap_err();

    match err {
        DomainError::Validation(msg) => assert!(msg.contains("does not belong")),
        _ => panic!("Expected Validation error for mismatch"),
    }
    // No stock anywhere is touched.
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 10);
    assert_eq!(catalog.product(other).unwrap().stock_quantity(), 10);
    assert_eq!(
        catalog.variation(other_variation).unwrap().stock_quantity(),
        5
    );
    assert!(orders.is_empty());
}

#[test]
fn failed_second_line_rolls_back_the_first_reservation() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);
    let scarce = seed_shirt(&catalog);

    let request = OrderRequest::new(
        "1 Main St",
        vec![
            ItemRequest {
                product_id: shirt,
                variation_id: None,
                quantity: 2,
            },
            ItemRequest {
                product_id: scarce,
                variation_id: None,
                quantity: 99,
            },
        ],
    );

    let err = service.place_order(&Identity::Guest, request).unwrap_err();
    match err {
        DomainError::InsufficientStock {
            target,
            requested,
            available,
        } => {
            assert!(target.contains(&scarce.to_string()));
            assert_eq!(requested, 99);
            assert_eq!(available, 10);
        }
        _ => panic!("Expected InsufficientStock error"),
    }

    // Item 1's reservation is rolled back; no order persisted.
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 10);
    assert_eq!(catalog.product(scarce).unwrap().stock_quantity(), 10);
    assert!(orders.is_empty());
}

#[test]
fn empty_item_list_is_rejected_up_front() {
    let (_catalog, orders, service) = setup();
    let err = service
        .place_order(&Identity::Guest, OrderRequest::new("1 Main St", vec![]))
        .unwrap_err();
    match err {
        DomainError::Validation(msg) => assert!(msg.contains("at least one item")),
        _ => panic!("Expected Validation error"),
    }
    assert!(orders.is_empty());
}

#[test]
fn missing_product_and_variation_are_not_found() {
    let (catalog, _orders, service) = setup();
    let shirt = seed_shirt(&catalog);

    let missing_product = ProductId::new();
    let err = service
        .place_order(&Identity::Guest, one_line(missing_product, None, 1))
        .unwrap_err();
    match err {
        DomainError::NotFound(msg) => assert!(msg.contains(&missing_product.to_string())),
        _ => panic!("Expected NotFound error"),
    }

    let missing_variation = VariationId::new();
    let err = service
        .place_order(&Identity::Guest, one_line(shirt, Some(missing_variation), 1))
        .unwrap_err();
    match err {
        DomainError::NotFound(msg) => assert!(msg.contains(&missing_variation.to_string())),
        _ => panic!("Expected NotFound error"),
    }
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 10);
}

#[test]
fn non_positive_quantity_is_rejected_before_any_reservation() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);

    for quantity in [0, -2] {
        let err = service
            .place_order(&Identity::Guest, one_line(shirt, None, quantity))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("positive")),
            _ => panic!("Expected Validation error"),
        }
    }
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 10);
    assert!(orders.is_empty());
}

#[test]
fn customer_identity_is_attached_and_guest_orders_have_none() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);
    let user_id = UserId::new();

    let placed = service
        .place_order(&Identity::customer(user_id), one_line(shirt, None, 1))
        .unwrap();
    assert_eq!(placed.customer(), Some(user_id));

    let guest = service
        .place_order(
            &Identity::Guest,
            one_line(shirt, None, 1).with_contact("Ada", "ada@example.com"),
        )
        .unwrap();
    assert!(guest.is_guest());
    let stored_guest = orders.get(guest.id_typed()).unwrap();
    assert_eq!(stored_guest.customer_name(), Some("Ada"));
    assert_eq!(stored_guest.customer_email(), Some("ada@example.com"));

    let history = orders.list_for_customer(user_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id_typed(), placed.id_typed());
}

#[test]
fn snapshot_survives_later_catalog_reprice() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);

    let order = service
        .place_order(&Identity::Guest, one_line(shirt, None, 2))
        .unwrap();

    // Admin reprices the product afterwards.
    let mut product = catalog.product(shirt).unwrap();
    product.set_price(dec!(99.00)).unwrap();
    catalog.upsert_product(product).unwrap();

    let stored = orders.get(order.id_typed()).unwrap();
    assert_eq!(stored.items()[0].price_at_purchase(), dec!(20.00));
    assert_eq!(stored.total_amount(), dec!(40.00));
}

#[test]
fn recalculating_a_stored_order_twice_is_idempotent() {
    let (catalog, orders, service) = setup();
    let shirt = seed_shirt(&catalog);

    let mut order = service
        .place_order(&Identity::Guest, one_line(shirt, None, 3))
        .unwrap();

    let first = recalculate_total(orders.as_ref(), &mut order).unwrap();
    let second = recalculate_total(orders.as_ref(), &mut order).unwrap();
    assert_eq!(first, dec!(60.00));
    assert_eq!(first, second);
    assert_eq!(orders.get(order.id_typed()).unwrap().total_amount(), first);
}

#[test]
fn concurrent_reservations_against_one_variation_never_oversell() {
    let (catalog, orders, _service) = setup();
    let shirt = seed_shirt(&catalog);
    let red_medium = seed_red_medium(&catalog, shirt);

    let service = Arc::new(CheckoutService::new(
        catalog.clone(),
        catalog.clone(),
        orders.clone(),
    ));

    // Stock 5, two concurrent requests for 3 each: exactly one can win.
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = service.clone();
            std::thread::spawn(move || {
                service.place_order(&Identity::Guest, one_line(shirt, Some(red_medium), 3))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let failed: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

    assert_eq!(succeeded, 1);
    assert_eq!(failed.len(), 1);
    match failed[0] {
        DomainError::InsufficientStock { available, .. } => assert_eq!(*available, 2),
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(catalog.variation(red_medium).unwrap().stock_quantity(), 2);
    assert_eq!(orders.len(), 1);
}

#[test]
fn burst_of_concurrent_single_unit_orders_stops_at_zero() {
    let (catalog, orders, _service) = setup();
    let shirt = seed_shirt(&catalog);

    let service = Arc::new(CheckoutService::new(
        catalog.clone(),
        catalog.clone(),
        orders.clone(),
    ));

    // Stock 10, sixteen concurrent requests for 1 each.
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            std::thread::spawn(move || {
                service.place_order(&Identity::Guest, one_line(shirt, None, 1))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(succeeded, 10);
    assert_eq!(catalog.product(shirt).unwrap().stock_quantity(), 0);
    assert_eq!(orders.len(), 10);
}
