//! Catalog domain module.
//!
//! This crate contains the product catalog as the order core reads it:
//! products, their variations (dynamic attributes, price adjustments,
//! per-variation stock), categories, and the color reference table. Pure
//! domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod color;
pub mod product;
pub mod sku;
pub mod variation;

pub use category::Category;
pub use color::{Color, ColorSet};
pub use product::Product;
pub use sku::generate_sku;
pub use variation::{Attributes, ProductVariation};
