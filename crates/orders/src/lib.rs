//! Orders domain module.
//!
//! Order placement with inventory reservation and price snapshotting: the
//! [`Order`]/[`OrderItem`] aggregate, the checkout service that builds orders
//! against the catalog and the stock ledger, and the total calculator.

pub mod checkout;
pub mod order;

pub use checkout::{
    CatalogReader, CheckoutService, ItemRequest, OrderRequest, OrderStore, StockLedger,
    StockTarget, recalculate_total,
};
pub use order::{Order, OrderItem, OrderStatus};
