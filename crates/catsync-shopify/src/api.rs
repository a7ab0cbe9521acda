//! The catalog operations the sync engine needs from the remote store.
//!
//! [`crate::AdminClient`] implements this against the Shopify admin API;
//! tests substitute an in-memory catalog.

use async_trait::async_trait;

use crate::error::AdminError;
use crate::types::{
    DefinitionInput, DefinitionOutcome, MetafieldEntry, MetafieldsSetOutcome, NewProduct,
    NewVariant, Product, Variant,
};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Product with the given handle, with its variants populated.
    async fn find_product_by_handle(&self, handle: &str) -> Result<Option<Product>, AdminError>;

    /// Creates a product. The returned product may include the variant the
    /// store generates automatically.
    async fn create_product(&self, product: &NewProduct) -> Result<Product, AdminError>;

    async fn list_variants(&self, product_id: i64) -> Result<Vec<Variant>, AdminError>;

    async fn delete_variant(&self, variant_id: i64) -> Result<(), AdminError>;

    /// Replaces the product's option schema with one option holding a single
    /// placeholder value.
    async fn reset_product_options(
        &self,
        product_id: i64,
        option_name: &str,
        placeholder: &str,
    ) -> Result<(), AdminError>;

    async fn create_variant(
        &self,
        product_id: i64,
        variant: &NewVariant,
    ) -> Result<Variant, AdminError>;

    async fn update_variant_price(&self, variant_id: i64, price: &str)
        -> Result<Variant, AdminError>;

    async fn update_inventory_cost(
        &self,
        inventory_item_id: i64,
        cost: &str,
    ) -> Result<(), AdminError>;

    /// Writes metafields on a variant. Rejected entries, and batches that
    /// failed after an earlier batch was stored, are reported in the outcome
    /// rather than as an error.
    async fn set_variant_metafields(
        &self,
        variant_id: i64,
        namespace: &str,
        entries: &[MetafieldEntry],
    ) -> Result<MetafieldsSetOutcome, AdminError>;

    async fn create_metafield_definition(
        &self,
        definition: &DefinitionInput,
    ) -> Result<DefinitionOutcome, AdminError>;
}
