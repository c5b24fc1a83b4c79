//! SKU generation for variations.
//!
//! SKUs are `<product-prefix>-<name-part>-<suffix>`: the first eight hex
//! digits of the owning product id, up to ten characters of the variation
//! name, and a four-character random suffix. Uniqueness is owned by the
//! persistence layer; this module only retries with a fresh suffix a bounded
//! number of times and surfaces exhaustion as a validation error.

use uuid::Uuid;

use storefront_core::{DomainError, ProductId};

/// Attempts before giving up on a unique SKU.
pub const MAX_SKU_ATTEMPTS: usize = 5;

/// Generate a SKU for a variation, retrying on collision.
///
/// `is_taken` is the persistence layer's uniqueness check. Each attempt draws
/// a fresh random suffix; after [`MAX_SKU_ATTEMPTS`] collisions the call fails
/// rather than looping blindly.
pub fn generate_sku(
    product_id: ProductId,
    variation_name: &str,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String, DomainError> {
    let prefix = product_prefix(product_id);
    let name_part = name_part(variation_name);

    for _ in 0..MAX_SKU_ATTEMPTS {
        let sku = format!("{prefix}-{name_part}-{}", random_suffix());
        if !is_taken(&sku) {
            return Ok(sku);
        }
    }

    Err(DomainError::validation(format!(
        "could not generate a unique SKU for '{variation_name}' after {MAX_SKU_ATTEMPTS} attempts"
    )))
}

fn product_prefix(product_id: ProductId) -> String {
    product_id.as_uuid().simple().to_string()[..8].to_uppercase()
}

fn name_part(name: &str) -> String {
    name.chars()
        .take(10)
        .map(|c| if c == ' ' { '-' } else { c.to_ascii_uppercase() })
        .collect()
}

fn random_suffix() -> String {
    // The tail bytes of a v7 UUID are random; four hex digits are enough
    // entropy for a per-product suffix.
    let hex = Uuid::now_v7().simple().to_string();
    hex[hex.len() - 4..].to_uppercase()
}
