//! Read-only GraphQL lookups used to verify what a sync wrote.

use serde_json::{json, Value};

use super::queries;
use super::AdminClient;
use crate::error::AdminError;
use crate::types::{Metafield, VariantMetafields};

impl AdminClient {
    /// Metafields of `namespace` on one variant, addressed by global ID.
    ///
    /// Returns `Ok(None)` when the store has no variant with that ID.
    ///
    /// # Errors
    ///
    /// Propagates transport and GraphQL errors from [`AdminClient::graphql`].
    pub async fn variant_metafields(
        &self,
        variant_gid: &str,
        namespace: &str,
        first: u32,
    ) -> Result<Option<VariantMetafields>, AdminError> {
        let data = self
            .graphql(
                queries::VARIANT_METAFIELDS_BY_ID,
                Some(json!({
                    "id": variant_gid,
                    "namespace": namespace,
                    "first": first,
                })),
            )
            .await?;

        let node = &data["productVariant"];
        if node.is_null() {
            return Ok(None);
        }
        parse_variant_node(node).map(Some)
    }

    /// The first `first` variants, optionally filtered by a SKU search, each
    /// with up to `metafields_first` metafields of `namespace`.
    ///
    /// # Errors
    ///
    /// Propagates transport and GraphQL errors from [`AdminClient::graphql`].
    pub async fn variants_with_metafields(
        &self,
        first: u32,
        sku_query: Option<&str>,
        namespace: &str,
        metafields_first: u32,
    ) -> Result<Vec<VariantMetafields>, AdminError> {
        let query = sku_query.map(sku_search);
        let data = self
            .graphql(
                queries::VARIANTS_WITH_METAFIELDS,
                Some(json!({
                    "first": first,
                    "query": query,
                    "namespace": namespace,
                    "metafieldsFirst": metafields_first,
                })),
            )
            .await?;

        edge_nodes(&data["productVariants"])
            .map(parse_variant_node)
            .collect()
    }
}

/// Search syntax for an exact SKU match. The value is quoted so search
/// operators inside it are taken literally.
fn sku_search(sku: &str) -> String {
    let escaped = sku.replace('\\', "\\\\").replace('"', "\\\"");
    format!("sku:\"{escaped}\"")
}

fn edge_nodes(connection: &Value) -> impl Iterator<Item = &Value> {
    connection["edges"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|edge| &edge["node"])
        .filter(|node| !node.is_null())
}

fn parse_variant_node(node: &Value) -> Result<VariantMetafields, AdminError> {
    let id = node["id"]
        .as_str()
        .ok_or_else(|| AdminError::MissingData {
            context: "productVariant.id".to_owned(),
        })?
        .to_owned();

    let metafields = edge_nodes(&node["metafields"])
        .map(|m| {
            serde_json::from_value::<Metafield>(m.clone()).map_err(|e| AdminError::Deserialize {
                context: format!("metafields of {id}"),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VariantMetafields {
        sku: node["sku"].as_str().map(str::to_owned),
        id,
        metafields,
    })
}
