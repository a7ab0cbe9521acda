//! Admin API record shapes.
//!
//! REST payloads use numeric IDs (`"id": 6789012345678`); GraphQL uses global
//! IDs (`"gid://shopify/ProductVariant/6789012345678"`). See [`crate::gid`]
//! for conversions.
//!
//! ### Auto-created variants
//! Creating a product through REST always yields one variant with a blank or
//! `null` SKU and the title `"Default Title"`. It has to be deleted before the
//! real variants are added, otherwise it lingers in the catalog.

use serde::Deserialize;

/// Title Shopify gives the variant it creates alongside a new product.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsEnvelope {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductEnvelope {
    pub product: Option<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantsEnvelope {
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantEnvelope {
    pub variant: Option<Variant>,
}

/// A product (the parent record of a series).
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub handle: String,

    /// Filled by a separate `variants.json` fetch when looked up by handle.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A product variant (the child record of one source row).
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    /// `null` or `""` on auto-created variants.
    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub price: Option<String>,

    #[serde(default)]
    pub inventory_item_id: Option<i64>,
}

impl Variant {
    /// Trimmed SKU, empty when unset.
    #[must_use]
    pub fn sku(&self) -> &str {
        self.sku.as_deref().map_or("", str::trim)
    }

    /// Whether this is the placeholder Shopify creates with a new product.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.sku().is_empty() || self.title == DEFAULT_VARIANT_TITLE
    }
}

/// Input for creating a product with a single placeholder option.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub handle: String,
    pub option_name: String,
    pub option_placeholder: String,
}

/// Input for creating a variant; the SKU doubles as its option value.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub sku: String,
    pub price: String,
}

/// One metafield to write on a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldEntry {
    pub key: String,
    pub value: String,
}

/// A metafield as read back from GraphQL.
#[derive(Debug, Clone, Deserialize)]
pub struct Metafield {
    #[serde(default)]
    pub namespace: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
}

/// A GraphQL `userErrors` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Result of a `metafieldsSet` call. Entries that were rejected show up in
/// `user_errors`; the rest were written.
#[derive(Debug, Clone, Default)]
pub struct MetafieldsSetOutcome {
    pub written: Vec<Metafield>,
    pub user_errors: Vec<UserError>,
}

/// Input for `metafieldDefinitionCreate` on product variants.
#[derive(Debug, Clone)]
pub struct DefinitionInput {
    pub name: String,
    pub namespace: String,
    pub key: String,
    pub description: String,
    pub value_type: String,
}

#[derive(Debug, Clone)]
pub enum DefinitionOutcome {
    Created { namespace: String, key: String },
    AlreadyExists,
    Rejected(Vec<UserError>),
}

/// A variant together with the metafields of one namespace.
#[derive(Debug, Clone)]
pub struct VariantMetafields {
    pub id: String,
    pub sku: Option<String>,
    pub metafields: Vec<Metafield>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(sku: Option<&str>, title: &str) -> Variant {
        Variant {
            id: 1,
            title: title.to_owned(),
            sku: sku.map(str::to_owned),
            price: None,
            inventory_item_id: None,
        }
    }

    #[test]
    fn blank_or_missing_sku_is_placeholder() {
        assert!(variant(None, "AB-1").is_placeholder());
        assert!(variant(Some("  "), "AB-1").is_placeholder());
    }

    #[test]
    fn default_title_is_placeholder_even_with_sku() {
        assert!(variant(Some("AB-1"), "Default Title").is_placeholder());
    }

    #[test]
    fn real_variant_is_not_placeholder() {
        assert!(!variant(Some("AB-1"), "AB-1").is_placeholder());
    }

    #[test]
    fn user_error_display_includes_field_path() {
        let err = UserError {
            field: Some(vec!["metafields".to_owned(), "0".to_owned(), "value".to_owned()]),
            message: "is invalid".to_owned(),
        };
        assert_eq!(err.to_string(), "metafields.0.value: is invalid");
    }

    #[test]
    fn variant_deserializes_null_sku() {
        let v: Variant = serde_json::from_str(
            r#"{"id": 5, "title": "Default Title", "sku": null, "inventory_item_id": 9}"#,
        )
        .unwrap();
        assert_eq!(v.sku(), "");
        assert_eq!(v.inventory_item_id, Some(9));
    }
}
