//! Conversions between REST numeric IDs and GraphQL global IDs.

/// GraphQL global ID of a product variant.
#[must_use]
pub fn variant_gid(id: i64) -> String {
    format!("gid://shopify/ProductVariant/{id}")
}

/// Numeric tail of a global ID (`"gid://shopify/ProductVariant/42"` → `42`).
/// Plain numeric strings pass through.
#[must_use]
pub fn numeric_id(id: &str) -> Option<i64> {
    id.rsplit('/').next()?.trim().parse().ok()
}
