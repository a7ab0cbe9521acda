pub mod api;
pub mod client;
pub mod error;
pub mod gid;
pub(crate) mod rate_limit;
pub mod retry;
pub mod types;

pub use api::CatalogApi;
pub use client::{AdminClient, ClientSettings};
pub use error::AdminError;
pub use retry::RetryPolicy;
pub use types::{
    DefinitionInput, DefinitionOutcome, Metafield, MetafieldEntry, MetafieldsSetOutcome,
    NewProduct, NewVariant, Product, UserError, Variant, VariantMetafields,
};
